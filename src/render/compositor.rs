use crate::clip::{ClipMethod, ClipRegion};
use crate::foundation::core::{PixelRect, Rect, ViewportSize};
use crate::foundation::error::{ViewError, ViewResult};
use crate::render::backend::{DrawCall, RenderBackend, SurfaceDesc};
use crate::render::resolve::resolve_viewbox;
use crate::scene::graph::{NodeId, NodeKind, SceneGraph};
use crate::scene::viewbox::ViewBox;
use crate::transform::Transform;

/// Everything the compositor worked out for one viewbox in one frame.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ResolvedView {
    pub node: NodeId,
    pub name: String,
    /// Nesting depth; viewboxes directly under the root are at depth 1.
    pub depth: usize,
    pub camera: &'static str,
    /// Footprint in device pixels (exact) with the clip method applied to it.
    pub clip: ClipRegion,
    /// Viewport size handed to the camera.
    pub pixel_size: ViewportSize,
    /// Snapped scissor in the enclosing target's pixels (`Viewport` only).
    pub scissor: Option<PixelRect>,
    /// Offscreen buffer descriptor (`Fbo` only).
    pub fbo: Option<SurfaceDesc>,
    /// Device rect the offscreen buffer covers: the part of the footprint visible in the
    /// enclosing target.
    pub fbo_rect: Option<Rect>,
    /// Nested scene units to parent scene units.
    pub local: Transform,
    /// Nested scene units to device pixels.
    pub effective: Transform,
}

/// Per-frame summary returned by [`Renderer::render`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub target: SurfaceDesc,
    /// Viewboxes in traversal order.
    pub views: Vec<ResolvedView>,
    /// Visual draw calls dispatched to the backend.
    pub draws: usize,
    pub offscreen_passes: usize,
    /// Viewboxes skipped because nothing of them was visible in the enclosing target.
    pub culled: usize,
}

impl FrameReport {
    pub fn view(&self, name: &str) -> Option<&ResolvedView> {
        self.views.iter().find(|v| v.name == name)
    }

    pub fn view_for(&self, node: NodeId) -> Option<&ResolvedView> {
        self.views.iter().find(|v| v.node == node)
    }
}

/// Coordinate context a scene's contents are rendered in.
#[derive(Clone, Copy, Debug)]
struct Frame {
    /// Scene units to device pixels.
    scene_to_device: Transform,
    /// Device pixels to current render target pixels.
    device_to_target: Transform,
    /// Region of the current target that can still receive pixels, in target pixels.
    visible: Rect,
    depth: usize,
}

/// Walks a [`SceneGraph`] and drives a [`RenderBackend`].
///
/// The graph is borrowed immutably for the whole pass, so it cannot change mid-frame.
#[derive(Debug, Default)]
pub struct Renderer {
    frames: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    #[tracing::instrument(skip_all, fields(frame = self.frames, width = size.0, height = size.1))]
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        graph: &SceneGraph,
        size: (u32, u32),
        backend: &mut B,
    ) -> ViewResult<FrameReport> {
        let target = SurfaceDesc::rgba8(size.0, size.1)?;
        let viewport = ViewportSize::from(size);
        let root_tf = graph.root_camera().to_device_transform(viewport);
        if !root_tf.is_invertible() {
            return Err(ViewError::singular(format!(
                "root camera is singular at {}x{} px",
                size.0, size.1
            )));
        }

        let mut report = FrameReport {
            frame: self.frames,
            target,
            views: Vec::new(),
            draws: 0,
            offscreen_passes: 0,
            culled: 0,
        };

        backend.begin_frame(target)?;
        let root = Frame {
            scene_to_device: root_tf,
            device_to_target: Transform::IDENTITY,
            visible: Rect::new(0.0, 0.0, f64::from(size.0), f64::from(size.1)),
            depth: 0,
        };
        let pass = render_scene(graph, graph.root(), root, backend, &mut report)
            .and_then(|()| backend.end_frame());
        if let Err(err) = pass {
            tracing::debug!(error = %err, "frame failed, resetting backend");
            backend.abort_frame();
            return Err(err);
        }

        tracing::debug!(
            views = report.views.len(),
            draws = report.draws,
            offscreen = report.offscreen_passes,
            "frame rendered"
        );
        self.frames += 1;
        Ok(report)
    }
}

fn render_scene<B: RenderBackend + ?Sized>(
    graph: &SceneGraph,
    scene: NodeId,
    frame: Frame,
    backend: &mut B,
    report: &mut FrameReport,
) -> ViewResult<()> {
    for &child in graph.children(scene)? {
        match graph.kind(child)? {
            NodeKind::Visual(visual) => {
                let call = DrawCall {
                    node: child,
                    visual,
                    to_target: Transform::compose(frame.device_to_target, frame.scene_to_device),
                    depth: frame.depth + 1,
                };
                tracing::trace!(node = ?child, kind = visual.kind_name(), "draw");
                backend.draw(&call)?;
                report.draws += 1;
            }
            NodeKind::ViewBox(vb) => render_viewbox(graph, child, vb, frame, backend, report)?,
            NodeKind::Root => {
                return Err(ViewError::invalid_attachment(
                    "root scene found below the root",
                ));
            }
        }
    }
    Ok(())
}

fn render_viewbox<B: RenderBackend + ?Sized>(
    graph: &SceneGraph,
    id: NodeId,
    vb: &ViewBox,
    parent: Frame,
    backend: &mut B,
    report: &mut FrameReport,
) -> ViewResult<()> {
    let res = resolve_viewbox(vb, parent.scene_to_device)?;
    let method = vb.clip_method();
    let target_rect = parent.device_to_target.apply_rect_bbox(res.device_rect);
    let depth = parent.depth + 1;

    let mut view = ResolvedView {
        node: id,
        name: vb.name().to_string(),
        depth,
        camera: vb.camera().kind_name(),
        clip: ClipRegion::new(res.device_rect, method),
        pixel_size: res.pixel_size,
        scissor: None,
        fbo: None,
        fbo_rect: None,
        local: res.local,
        effective: res.effective,
    };

    tracing::debug!(
        name = %vb.name(),
        depth,
        clip = %method,
        x = res.device_rect.x0,
        y = res.device_rect.y0,
        w = res.pixel_size.width,
        h = res.pixel_size.height,
        "resolved viewbox"
    );

    let inner = Frame {
        scene_to_device: res.effective,
        depth,
        ..parent
    };

    match method {
        ClipMethod::None => {
            report.views.push(view);
            render_scene(graph, id, inner, backend, report)
        }
        ClipMethod::Viewport => {
            let scissor = PixelRect::snap(target_rect);
            view.scissor = Some(scissor);
            report.views.push(view);
            if scissor.is_empty() {
                tracing::debug!(name = %vb.name(), "empty scissor, skipping contents");
                report.culled += 1;
                return Ok(());
            }
            backend.push_scissor(scissor)?;
            let clipped = Frame {
                visible: parent.visible.intersect(scissor.to_rect()),
                ..inner
            };
            render_scene(graph, id, clipped, backend, report)?;
            backend.pop_scissor()
        }
        ClipMethod::Fbo => {
            // Only the visible part of the footprint gets a buffer, so zoomed-in parents
            // never ask for more pixels than the enclosing target has.
            let dest = target_rect.intersect(parent.visible);
            if !(dest.width() > 0.0 && dest.height() > 0.0) {
                report.views.push(view);
                tracing::debug!(name = %vb.name(), "offscreen footprint not visible, skipping");
                report.culled += 1;
                return Ok(());
            }
            let covered = if dest == target_rect {
                res.device_rect
            } else {
                parent.device_to_target.invert()?.apply_rect_bbox(dest)
            };
            let covered_size = ViewportSize::new(covered.width(), covered.height());
            let (bw, bh) = vb.fbo_sizing().buffer_size_for(res.pixel_size, covered_size);
            let desc = SurfaceDesc::rgba8(bw, bh)?;
            view.fbo = Some(desc);
            view.fbo_rect = Some(covered);
            report.views.push(view);

            let to_buffer = Transform::compose(
                Transform::scale(
                    f64::from(bw) / covered_size.width,
                    f64::from(bh) / covered_size.height,
                ),
                Transform::translate(-covered.origin().to_vec2()),
            );
            let offscreen = Frame {
                device_to_target: to_buffer,
                visible: Rect::new(0.0, 0.0, f64::from(bw), f64::from(bh)),
                ..inner
            };

            backend.begin_offscreen(id, desc)?;
            render_scene(graph, id, offscreen, backend, report)?;
            backend.end_offscreen(id, dest, vb.fbo_filter())?;
            report.offscreen_passes += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
