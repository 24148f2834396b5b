//! The stacked-viewbox demo scene.
//!
//! An NDC root holds two halves: `vb1` (NDC camera) on the left and `vb2` (pixel camera) on
//! the right. Each half holds two quarters, one with a pan/zoom camera and one with a pixel
//! camera. A jittery gradient line exists once in NDC units and once in pixel units; each is
//! shared by one quarter on either side. `vb11` also carries a red unit box and a green box
//! around `[-1, 1]²`.

use crate::camera::Camera;
use crate::clip::{ClipMethod, FboSizing};
use crate::foundation::core::{Point, Rgba8Premul};
use crate::foundation::error::{ViewError, ViewResult};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::viewbox::ViewBox;
use crate::scene::visual::Visual;

/// Canvas size the demo is laid out for.
pub const DEMO_CANVAS: (u32, u32) = (800, 600);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DemoOpts {
    /// Clip method of the two halves.
    pub outer: ClipMethod,
    /// Clip method of the four quarters.
    pub inner: ClipMethod,
    /// Offscreen sizing for every FBO-clipped viewbox. A factor below one makes the
    /// texture resampling visible.
    pub fbo_sizing: FboSizing,
    /// Vertices per line.
    pub points: usize,
}

impl Default for DemoOpts {
    fn default() -> Self {
        Self {
            outer: ClipMethod::Fbo,
            inner: ClipMethod::Viewport,
            fbo_sizing: FboSizing::MatchDevice,
            points: 1000,
        }
    }
}

impl DemoOpts {
    pub fn with_methods(mut self, outer: ClipMethod, inner: ClipMethod) -> Self {
        self.outer = outer;
        self.inner = inner;
        self
    }

    pub fn with_fbo_sizing(mut self, sizing: FboSizing) -> ViewResult<Self> {
        self.fbo_sizing = sizing.validate()?;
        Ok(self)
    }
}

pub struct DemoScene {
    pub graph: SceneGraph,
    /// `vb1, vb11, vb12, vb2, vb21, vb22`.
    pub viewboxes: [NodeId; 6],
    pub line_ndc: NodeId,
    pub line_pixels: NodeId,
}

impl DemoScene {
    pub fn build(opts: DemoOpts) -> ViewResult<Self> {
        if opts.points < 20 {
            return Err(ViewError::invalid_geometry(format!(
                "demo lines need at least 20 points, got {}",
                opts.points
            )));
        }
        let mut g = SceneGraph::new(Camera::ndc());
        let root = g.root();
        let outer = |name: &str, x: f64, camera: Camera| -> ViewResult<ViewBox> {
            ViewBox::new(name)
                .with_rect((x, -1.0), (1.0, 2.0))
                .map(|vb| vb.with_camera(camera).with_clip_method(opts.outer))
        };
        let inner = |name: &str, pos: (f64, f64), size: (f64, f64), camera: Camera| {
            ViewBox::new(name)
                .with_rect(pos, size)
                .map(|vb| vb.with_camera(camera).with_clip_method(opts.inner))
        };

        let vb1 = g.add_viewbox(root, outer("vb1", -1.0, Camera::ndc())?)?;
        let vb11 = g.add_viewbox(vb1, inner("vb11", (-1.0, -1.0), (2.0, 1.0), Camera::twod())?)?;
        let vb12 = g.add_viewbox(vb1, inner("vb12", (-1.0, 0.0), (2.0, 1.0), Camera::pixel())?)?;

        let vb2 = g.add_viewbox(root, outer("vb2", 0.0, Camera::pixel())?)?;
        let vb21 = g.add_viewbox(vb2, inner("vb21", (0.0, 0.0), (400.0, 300.0), Camera::twod())?)?;
        let vb22 =
            g.add_viewbox(vb2, inner("vb22", (0.0, 300.0), (400.0, 300.0), Camera::pixel())?)?;

        let viewboxes = [vb1, vb11, vb12, vb2, vb21, vb22];
        for &vb in &viewboxes {
            g.viewbox_mut(vb)?.set_fbo_sizing(opts.fbo_sizing)?;
        }

        let (ndc, pixels) = demo_lines(opts.points)?;
        let line_ndc = g.add_visual(ndc)?;
        let line_pixels = g.add_visual(pixels)?;
        g.add(vb11, line_ndc)?;
        g.add(vb12, line_pixels)?;
        g.add(vb21, line_ndc)?;
        g.add(vb22, line_pixels)?;

        let unit_box = g.add_visual(box_line(0.0, 1.0, Rgba8Premul::opaque(255, 0, 0))?)?;
        let nd_box = g.add_visual(box_line(-1.0, 2.0, Rgba8Premul::opaque(0, 255, 0))?)?;
        g.add(vb11, unit_box)?;
        g.add(vb11, nd_box)?;
        g.release(unit_box)?;
        g.release(nd_box)?;

        // Drop construction handles; the tree owns everything now.
        for &id in viewboxes.iter().chain([&line_ndc, &line_pixels]) {
            g.release(id)?;
        }

        tracing::debug!(
            outer = %opts.outer,
            inner = %opts.inner,
            nodes = g.len(),
            "built demo scene"
        );
        Ok(Self {
            graph: g,
            viewboxes,
            line_ndc,
            line_pixels,
        })
    }
}

/// Closed square outline from `origin` with side `side` (both axes).
fn box_line(origin: f64, side: f64, color: Rgba8Premul) -> ViewResult<Visual> {
    let corners = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)];
    let points = corners
        .iter()
        .map(|&(x, y)| Point::new(origin + x * side, origin + y * side))
        .collect();
    Visual::line(points, color)
}

/// Deterministic stand-in for a noisy series: roughly zero mean, roughly within `[-1, 1]`.
fn jitter(i: usize) -> f64 {
    let t = i as f64;
    0.45 * (t * 0.731).sin() + 0.3 * (t * 0.117 + 1.3).sin() + 0.15 * (t * 2.39).cos()
}

/// The NDC line spans `x ∈ [-1, 1]`; the pixel copy spans `x ∈ [50, 350]` around `y = 150`.
/// The first 20 points are flattened so the "down" side is recognisable.
fn demo_lines(n: usize) -> ViewResult<(Visual, Visual)> {
    let denom = (n - 1) as f64;
    let colors: Vec<Rgba8Premul> = (0..n)
        .map(|i| {
            let r = i as f32 / denom as f32;
            Rgba8Premul::from_straight_f32([r, 1.0 - r, 1.0, 1.0])
        })
        .collect();

    let ys: Vec<f64> = (0..n).map(|i| 0.5 * jitter(i)).collect();
    let ndc = (0..n)
        .map(|i| {
            let x = -1.0 + 2.0 * i as f64 / denom;
            let y = if i < 20 { -0.5 } else { ys[i] };
            Point::new(x, y)
        })
        .collect();
    let pixels = (0..n)
        .map(|i| {
            let x = 50.0 + 300.0 * i as f64 / denom;
            let y = if i < 20 { 100.0 } else { 150.0 + ys[i] * 50.0 };
            Point::new(x, y)
        })
        .collect();

    Ok((
        Visual::line_with_colors(ndc, colors.clone(), 1.0)?,
        Visual::line_with_colors(pixels, colors, 1.0)?,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/demo.rs"]
mod tests;
