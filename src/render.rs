//! Frame traversal and the backends it drives.

pub mod backend;
pub mod compositor;
pub mod cpu;
pub mod record;
pub(crate) mod resolve;
pub mod surface_pool;
