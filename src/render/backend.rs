use crate::clip::FboFilter;
use crate::foundation::core::{PixelRect, Rect};
use crate::foundation::error::{ViewError, ViewResult};
use crate::scene::graph::NodeId;
use crate::scene::visual::Visual;
use crate::transform::Transform;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert to straight alpha in place (for PNG export).
    pub fn unpremultiply(&mut self) {
        if !self.premultiplied {
            return;
        }
        for px in self.data.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        self.premultiplied = false;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    Rgba8Premul,
}

/// Size and format of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl SurfaceDesc {
    pub fn rgba8(width: u32, height: u32) -> ViewResult<Self> {
        if width == 0 || height == 0 {
            return Err(ViewError::invalid_geometry(format!(
                "surface must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            format: PixelFormat::Rgba8Premul,
        })
    }

    pub fn byte_len(self) -> usize {
        let px = (self.width as usize).saturating_mul(self.height as usize);
        match self.format {
            PixelFormat::Rgba8Premul => px.saturating_mul(4),
        }
    }
}

/// One visual dispatched in one coordinate context.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    pub node: NodeId,
    pub visual: &'a Visual,
    /// Visual's scene units to the current target's pixels.
    pub to_target: Transform,
    pub depth: usize,
}

/// Command seam between the compositor and a rasterizer.
///
/// The compositor issues commands in painter's order. Scissors nest and intersect; offscreen
/// targets nest, and every command between `begin_offscreen` and the matching `end_offscreen`
/// lands in that offscreen target.
pub trait RenderBackend {
    fn begin_frame(&mut self, target: SurfaceDesc) -> ViewResult<()>;

    /// Restrict subsequent draws in the current target to `rect` (target pixels).
    fn push_scissor(&mut self, rect: PixelRect) -> ViewResult<()>;

    fn pop_scissor(&mut self) -> ViewResult<()>;

    /// Start rendering into the offscreen buffer owned by `owner`.
    fn begin_offscreen(&mut self, owner: NodeId, desc: SurfaceDesc) -> ViewResult<()>;

    /// Finish `owner`'s buffer and composite it over `dest` in the enclosing target.
    fn end_offscreen(&mut self, owner: NodeId, dest: Rect, filter: FboFilter) -> ViewResult<()>;

    fn draw(&mut self, call: &DrawCall<'_>) -> ViewResult<()>;

    /// Finish the frame. Offscreen buffers not used during this frame are released.
    fn end_frame(&mut self) -> ViewResult<()>;

    /// Drop a frame that failed part way through. Afterwards `begin_frame` starts clean, and
    /// offscreen buffers already owned by viewboxes are kept for the next frame.
    fn abort_frame(&mut self);

    /// Release `owner`'s offscreen buffer immediately.
    fn release_offscreen(&mut self, _owner: NodeId) {}
}
