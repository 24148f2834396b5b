use crate::clip::FboFilter;
use crate::foundation::core::{Affine, PixelRect, Point, Rect};
use crate::foundation::error::{ViewError, ViewResult};
use crate::render::backend::{DrawCall, FrameRGBA, RenderBackend, SurfaceDesc};
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::scene::graph::NodeId;
use crate::scene::visual::{LineVisual, RectVisual, Visual};
use crate::transform::Transform;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Options for the CPU backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackendOpts {
    pub(crate) pool: SurfacePoolOpts,
    pub(crate) clear_rgba: Option<[u8; 4]>,
}

impl CpuBackendOpts {
    /// Defaults with pool limits taken from the environment.
    pub fn from_env() -> Self {
        Self {
            pool: SurfacePoolOpts::from_env(),
            clear_rgba: None,
        }
    }

    /// Return options with a configured clear color (straight RGBA8) for the frame target.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    pub fn with_pool(mut self, pool: SurfacePoolOpts) -> Self {
        self.pool = pool;
        self
    }
}

/// A render target in flight: the frame itself or one viewbox's offscreen buffer.
struct Target {
    owner: Option<NodeId>,
    desc: SurfaceDesc,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    clip_depth: usize,
    /// Offscreen buffers composited into this target; reclaimed once it is rasterized.
    composited: Vec<(NodeId, SurfaceDesc, Arc<vello_cpu::Pixmap>)>,
}

/// CPU backend powered by `vello_cpu`.
///
/// Viewport clipping becomes a clip layer on the snapped integer rectangle, which `vello_cpu`
/// covers exactly on pixel boundaries. FBO clipping renders into a pixmap owned by the
/// viewbox and composites it as an image paint over the exact destination rectangle.
pub struct CpuBackend {
    opts: CpuBackendOpts,
    pool: SurfacePool,
    targets: Vec<Target>,
    owned: HashMap<NodeId, (SurfaceDesc, vello_cpu::Pixmap)>,
    used: HashSet<NodeId>,
    frame: Option<FrameRGBA>,
}

impl CpuBackend {
    pub fn new(opts: CpuBackendOpts) -> Self {
        Self {
            pool: SurfacePool::new(opts.pool),
            opts,
            targets: Vec::new(),
            owned: HashMap::new(),
            used: HashSet::new(),
            frame: None,
        }
    }

    /// Last completed frame.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    pub fn take_frame(&mut self) -> Option<FrameRGBA> {
        self.frame.take()
    }

    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    /// Number of viewboxes currently holding an offscreen buffer.
    pub fn owned_offscreen(&self) -> usize {
        self.owned.len()
    }

    pub fn owns_offscreen(&self, owner: NodeId) -> bool {
        self.owned.contains_key(&owner)
    }

    fn top(&mut self) -> ViewResult<&mut Target> {
        self.targets
            .last_mut()
            .ok_or_else(|| ViewError::render("no render target; call begin_frame first"))
    }

    fn new_target(&mut self, owner: Option<NodeId>, desc: SurfaceDesc) -> ViewResult<Target> {
        let pixmap = match owner.and_then(|o| self.owned.remove(&o)) {
            Some((d, mut p)) if d == desc => {
                p.data_as_u8_slice_mut().fill(0);
                p
            }
            Some((d, p)) => {
                self.pool.release(d, p);
                self.pool.borrow(desc)?
            }
            None => self.pool.borrow(desc)?,
        };
        let (w, h) = (pixmap.width(), pixmap.height());
        Ok(Target {
            owner,
            desc,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap,
            clip_depth: 0,
            composited: Vec::new(),
        })
    }

    /// Rasterize a target's recorded commands and hand back the buffers it sampled from.
    fn finish(&mut self, target: Target) -> ViewResult<(SurfaceDesc, vello_cpu::Pixmap)> {
        let Target {
            owner,
            desc,
            mut ctx,
            mut pixmap,
            clip_depth,
            composited,
        } = target;
        if clip_depth != 0 {
            return Err(ViewError::render(format!(
                "{clip_depth} scissor(s) still pushed when finishing {owner:?}"
            )));
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        drop(ctx);

        for (node, d, arc) in composited {
            match Arc::try_unwrap(arc) {
                Ok(p) => {
                    self.owned.insert(node, (d, p));
                }
                Err(_) => tracing::warn!(?node, "offscreen buffer still shared, dropping"),
            }
        }
        Ok((desc, pixmap))
    }

    /// Return every in-flight buffer. Offscreen buffers go back to their owners.
    fn discard_targets(&mut self) {
        for t in std::mem::take(&mut self.targets).into_iter().rev() {
            let Target {
                owner,
                desc,
                ctx,
                pixmap,
                composited,
                ..
            } = t;
            // The context holds image paints referencing the composited buffers.
            drop(ctx);
            for (node, d, arc) in composited {
                if let Ok(p) = Arc::try_unwrap(arc) {
                    self.owned.insert(node, (d, p));
                }
            }
            match owner {
                Some(o) => {
                    self.owned.insert(o, (desc, pixmap));
                }
                None => self.pool.release(desc, pixmap),
            }
        }
        self.used.clear();
    }
}

impl RenderBackend for CpuBackend {
    fn begin_frame(&mut self, target: SurfaceDesc) -> ViewResult<()> {
        if !self.targets.is_empty() {
            tracing::warn!(
                pending = self.targets.len(),
                "previous frame was not finished, discarding"
            );
            self.discard_targets();
        }
        let mut t = self.new_target(None, target)?;
        if let Some([r, g, b, a]) = self.opts.clear_rgba {
            t.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            t.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            t.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(target.width),
                f64::from(target.height),
            ));
        }
        self.targets.push(t);
        Ok(())
    }

    fn push_scissor(&mut self, rect: PixelRect) -> ViewResult<()> {
        let t = self.top()?;
        let path = rect_path(rect.to_rect());
        t.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        t.ctx.push_clip_layer(&path);
        t.clip_depth += 1;
        Ok(())
    }

    fn pop_scissor(&mut self) -> ViewResult<()> {
        let t = self.top()?;
        if t.clip_depth == 0 {
            return Err(ViewError::render("pop_scissor without matching push"));
        }
        t.ctx.pop_layer();
        t.clip_depth -= 1;
        Ok(())
    }

    fn begin_offscreen(&mut self, owner: NodeId, desc: SurfaceDesc) -> ViewResult<()> {
        if self.targets.is_empty() {
            return Err(ViewError::render("begin_offscreen outside of a frame"));
        }
        if !self.used.insert(owner) {
            return Err(ViewError::render(format!(
                "offscreen buffer of {owner:?} is already in use this frame"
            )));
        }
        let t = self.new_target(Some(owner), desc)?;
        self.targets.push(t);
        Ok(())
    }

    fn end_offscreen(&mut self, owner: NodeId, dest: Rect, filter: FboFilter) -> ViewResult<()> {
        if self.targets.len() < 2 {
            return Err(ViewError::render("end_offscreen without begin_offscreen"));
        }
        let Some(t) = self.targets.pop() else {
            return Err(ViewError::render("end_offscreen without begin_offscreen"));
        };
        if t.owner != Some(owner) {
            let open = t.owner;
            self.targets.push(t);
            return Err(ViewError::render(format!(
                "end_offscreen for {owner:?} but {open:?} is open"
            )));
        }

        let (desc, pixmap) = self.finish(t)?;
        let image = Arc::new(pixmap);
        let quality = match filter {
            FboFilter::Nearest => vello_cpu::peniko::ImageQuality::Low,
            FboFilter::Linear => vello_cpu::peniko::ImageQuality::Medium,
        };
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(image.clone()),
            sampler: vello_cpu::peniko::ImageSampler {
                quality,
                ..Default::default()
            },
        };

        let (bw, bh) = (f64::from(desc.width), f64::from(desc.height));
        let place = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / bw, dest.height() / bh);

        let parent = self.top()?;
        parent
            .ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        parent.ctx.set_transform(affine_to_cpu(place));
        parent.ctx.set_paint(paint);
        parent
            .ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
        parent.composited.push((owner, desc, image));
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> ViewResult<()> {
        let t = self.top()?;
        match call.visual {
            Visual::Rect(r) => draw_rect(&mut t.ctx, r, call.to_target),
            Visual::Line(l) => draw_line(&mut t.ctx, l, call.to_target),
        }
        Ok(())
    }

    fn end_frame(&mut self) -> ViewResult<()> {
        if self.targets.len() != 1 {
            let open = self.targets.len();
            self.discard_targets();
            return Err(ViewError::render(format!(
                "end_frame with {} offscreen target(s) still open",
                open.saturating_sub(1)
            )));
        }
        let Some(root) = self.targets.pop() else {
            return Err(ViewError::render("end_frame without begin_frame"));
        };
        let (desc, pixmap) = self.finish(root)?;
        self.frame = Some(FrameRGBA {
            width: desc.width,
            height: desc.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        });
        self.pool.release(desc, pixmap);

        let stale: Vec<NodeId> = self
            .owned
            .keys()
            .filter(|k| !self.used.contains(k))
            .copied()
            .collect();
        for owner in stale {
            tracing::debug!(?owner, "releasing unused offscreen buffer");
            self.release_offscreen(owner);
        }
        self.used.clear();
        Ok(())
    }

    fn abort_frame(&mut self) {
        if !self.targets.is_empty() {
            tracing::debug!(pending = self.targets.len(), "aborting frame");
        }
        self.discard_targets();
    }

    fn release_offscreen(&mut self, owner: NodeId) {
        if let Some((desc, pixmap)) = self.owned.remove(&owner) {
            self.pool.release(desc, pixmap);
        }
    }
}

fn draw_rect(ctx: &mut vello_cpu::RenderContext, r: &RectVisual, to_target: Transform) {
    let [cr, cg, cb, ca] = r.color.to_straight_rgba();
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(to_target.affine()));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(cr, cg, cb, ca));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        r.rect.x0, r.rect.y0, r.rect.x1, r.rect.y1,
    ));
}

/// Lines keep a constant on-screen width: points are mapped first, then stroked untransformed.
fn draw_line(ctx: &mut vello_cpu::RenderContext, l: &LineVisual, to_target: Transform) {
    let pts: Vec<Point> = l.points.iter().map(|p| to_target.apply(*p)).collect();
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(l.width_px));

    // Consecutive segments sharing a color are stroked as one path.
    let mut i = 0;
    while i + 1 < pts.len() {
        let color = l.color_for_segment(i);
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(pts[i]));
        let mut j = i;
        while j + 1 < pts.len() && l.color_for_segment(j) == color {
            path.line_to(point_to_cpu(pts[j + 1]));
            j += 1;
        }
        let [cr, cg, cb, ca] = color.to_straight_rgba();
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(cr, cg, cb, ca));
        ctx.stroke_path(&path);
        i = j;
    }
}

fn rect_path(r: Rect) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    p.move_to((r.x0, r.y0));
    p.line_to((r.x1, r.y0));
    p.line_to((r.x1, r.y1));
    p.line_to((r.x0, r.y1));
    p.close_path();
    p
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
