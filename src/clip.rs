use crate::foundation::core::{PixelRect, Point, Rect, ViewportSize};
use crate::foundation::error::{ViewError, ViewResult};
use crate::foundation::math::ceil_px;

/// How a viewbox suppresses content outside its rectangle.
///
/// `fragment` (per-fragment discard) is a reserved name: it parses as
/// [`ViewError::UnknownClipMethod`] until a backend implements it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMethod {
    /// Draw everything; overflow stays visible.
    None,
    /// Scissor to the rectangle snapped onto the target's pixel grid.
    #[default]
    Viewport,
    /// Render into an offscreen buffer, then composite over the exact rectangle.
    Fbo,
}

impl ClipMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Viewport => "viewport",
            Self::Fbo => "fbo",
        }
    }
}

impl std::fmt::Display for ClipMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClipMethod {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "viewport" => Ok(Self::Viewport),
            "fbo" => Ok(Self::Fbo),
            "fragment" => Err(ViewError::unknown_clip_method(
                "fragment (reserved, not implemented)",
            )),
            _ => Err(ViewError::unknown_clip_method(s.to_string())),
        }
    }
}

/// Offscreen buffer sizing relative to the viewbox's device footprint.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FboSizing {
    /// Device extent rounded up to whole pixels.
    #[default]
    MatchDevice,
    /// Device extent times `factor`, rounded up. `factor < 1` trades sharpness for memory.
    Scale { factor: f64 },
    /// A fixed logical resolution, independent of the device footprint.
    Fixed { width: u32, height: u32 },
}

impl FboSizing {
    pub fn validate(self) -> ViewResult<Self> {
        match self {
            Self::MatchDevice => Ok(self),
            Self::Scale { factor } if factor.is_finite() && factor > 0.0 => Ok(self),
            Self::Scale { factor } => Err(ViewError::invalid_geometry(format!(
                "fbo scale factor must be positive and finite, got {factor}"
            ))),
            Self::Fixed { width, height } if width > 0 && height > 0 => Ok(self),
            Self::Fixed { width, height } => Err(ViewError::invalid_geometry(format!(
                "fbo resolution must be non-zero, got {width}x{height}"
            ))),
        }
    }

    /// Buffer resolution for a footprint of `device` pixels. Never zero.
    pub fn buffer_size(self, device: ViewportSize) -> (u32, u32) {
        match self {
            Self::MatchDevice => (ceil_px(device.width), ceil_px(device.height)),
            Self::Scale { factor } => (
                ceil_px(device.width * factor),
                ceil_px(device.height * factor),
            ),
            Self::Fixed { width, height } => (width.max(1), height.max(1)),
        }
    }

    /// Buffer resolution when only `covered` pixels of a `device`-sized footprint are
    /// rendered. Keeps the buffer-to-device density of [`FboSizing::buffer_size`].
    pub fn buffer_size_for(self, device: ViewportSize, covered: ViewportSize) -> (u32, u32) {
        if covered == device {
            return self.buffer_size(device);
        }
        match self {
            Self::MatchDevice => (ceil_px(covered.width), ceil_px(covered.height)),
            Self::Scale { factor } => (
                ceil_px(covered.width * factor),
                ceil_px(covered.height * factor),
            ),
            Self::Fixed { width, height } => (
                ceil_px(covered.width * f64::from(width) / device.width).min(width.max(1)),
                ceil_px(covered.height * f64::from(height) / device.height).min(height.max(1)),
            ),
        }
    }
}

/// Resampling filter used when an offscreen buffer is composited into its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FboFilter {
    Nearest,
    /// Bilinear. Softens the seam between buffer and device resolution.
    #[default]
    Linear,
}

/// Axis-aligned clip rectangle in device pixels, with its enforcement method.
///
/// Membership is inclusive on the left/top edge and exclusive on the right/bottom edge, so two
/// regions sharing an edge never both contain a point on it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipRegion {
    /// Exact (unsnapped) device rectangle.
    pub rect: Rect,
    pub method: ClipMethod,
}

impl ClipRegion {
    pub fn new(rect: Rect, method: ClipMethod) -> Self {
        Self {
            rect: rect.abs(),
            method,
        }
    }

    /// Pixel-grid rectangle a scissor would use.
    pub fn scissor(&self) -> PixelRect {
        PixelRect::snap(self.rect)
    }

    /// Whether a device point survives this region's clipping.
    ///
    /// `None` keeps everything; `Viewport` tests against the snapped scissor; `Fbo` tests
    /// against the exact rectangle.
    pub fn contains(&self, p: Point) -> bool {
        match self.method {
            ClipMethod::None => true,
            ClipMethod::Viewport => {
                let s = self.scissor().to_rect();
                half_open_contains(s, p)
            }
            ClipMethod::Fbo => half_open_contains(self.rect, p),
        }
    }
}

fn half_open_contains(r: Rect, p: Point) -> bool {
    r.x0 <= p.x && p.x < r.x1 && r.y0 <= p.y && p.y < r.y1
}

#[cfg(test)]
#[path = "../tests/unit/clip.rs"]
mod tests;
