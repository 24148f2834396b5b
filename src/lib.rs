//! Nested viewbox clipping and camera transforms for 2D scene graphs.
//!
//! A [`SceneGraph`] holds a root scene with a [`Camera`]. [`ViewBox`] nodes place a nested
//! scene, with its own camera, into a rectangle of their parent's units and clip it with a
//! [`ClipMethod`]. The [`Renderer`] walks the graph, resolves each viewbox's transforms and
//! device-space clip region, and drives a [`RenderBackend`]:
//!
//! - [`CpuBackend`] rasterizes with `vello_cpu` into a premultiplied [`FrameRGBA`]
//! - [`RecordingBackend`] records the command stream
//!
//! Scenes can also be loaded from JSON through [`SceneDoc`].
#![forbid(unsafe_code)]

pub mod camera;
pub mod clip;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod transform;

pub use crate::camera::{Camera, PixelCamera, PixelOrigin, TwoDCamera};
pub use crate::clip::{ClipMethod, ClipRegion, FboFilter, FboSizing};
pub use crate::foundation::core::{
    Affine, PixelRect, Point, Rect, Rgba8Premul, Size, Vec2, ViewportSize,
};
pub use crate::foundation::error::{ViewError, ViewResult};
pub use crate::render::backend::{DrawCall, FrameRGBA, PixelFormat, RenderBackend, SurfaceDesc};
pub use crate::render::compositor::{FrameReport, Renderer, ResolvedView};
pub use crate::render::cpu::{CpuBackend, CpuBackendOpts};
pub use crate::render::record::{BackendCmd, RecordingBackend};
pub use crate::render::surface_pool::{SurfacePoolOpts, SurfacePoolStats};
pub use crate::scene::demo::{DEMO_CANVAS, DemoOpts, DemoScene};
pub use crate::scene::doc::SceneDoc;
pub use crate::scene::graph::{NodeId, NodeKind, SceneGraph};
pub use crate::scene::viewbox::ViewBox;
pub use crate::scene::visual::{LineVisual, RectVisual, Visual};
pub use crate::transform::Transform;
