pub mod demo;
pub mod doc;
pub mod graph;
pub mod viewbox;
pub mod visual;
