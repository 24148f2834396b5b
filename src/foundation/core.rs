use crate::foundation::error::{ViewError, ViewResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Pixel dimensions of a viewport or render target.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportSize {
    /// Width in (possibly fractional) pixels.
    pub width: f64,
    /// Height in (possibly fractional) pixels.
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Create a size that must be finite and strictly positive on both axes.
    pub fn validated(width: f64, height: f64) -> ViewResult<Self> {
        let out = Self { width, height };
        if !out.is_valid() {
            return Err(ViewError::invalid_geometry(format!(
                "viewport size must be positive and finite, got {width}x{height}"
            )));
        }
        Ok(out)
    }

    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl From<(u32, u32)> for ViewportSize {
    fn from((w, h): (u32, u32)) -> Self {
        Self::new(f64::from(w), f64::from(h))
    }
}

/// Integer rectangle on a pixel grid, half-open `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Snap a fractional rectangle onto the pixel grid by rounding every edge.
    ///
    /// Adjacent rectangles that share an edge snap to the same integer column, so the snapped
    /// results never overlap and never leave a gap.
    pub fn snap(rect: Rect) -> Self {
        let r = rect.abs();
        Self {
            x0: round_i32(r.x0),
            y0: round_i32(r.y0),
            x1: round_i32(r.x1),
            y1: round_i32(r.y1),
        }
    }

    pub fn width(self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    pub fn height(self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }

    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Inclusive left/top, exclusive right/bottom.
    pub fn contains_pixel(self, x: i32, y: i32) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }

    pub fn intersect(self, other: Self) -> Self {
        let out = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if out.x1 <= out.x0 || out.y1 <= out.y0 {
            return Self::EMPTY;
        }
        out
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}

fn round_i32(v: f64) -> i32 {
    let r = v.round();
    if r >= f64::from(i32::MAX) {
        i32::MAX
    } else if r <= f64::from(i32::MIN) {
        i32::MIN
    } else {
        r as i32
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let a16 = u16::from(a);
        Self {
            r: crate::foundation::math::mul_div255_u8(u16::from(r), a16),
            g: crate::foundation::math::mul_div255_u8(u16::from(g), a16),
            b: crate::foundation::math::mul_div255_u8(u16::from(b), a16),
            a,
        }
    }

    /// Convert straight-alpha float channels in `[0, 1]`.
    pub fn from_straight_f32(rgba: [f32; 4]) -> Self {
        fn q(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::from_straight_rgba(q(rgba[0]), q(rgba[1]), q(rgba[2]), q(rgba[3]))
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Straight-alpha channels, as consumed by `peniko::Color::from_rgba8`.
    pub fn to_straight_rgba(self) -> [u8; 4] {
        if self.a == 0 {
            return [0, 0, 0, 0];
        }
        let un = |c: u8| -> u8 {
            let v = (u32::from(c) * 255 + u32::from(self.a) / 2) / u32::from(self.a);
            v.min(255) as u8
        };
        [un(self.r), un(self.g), un(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
