//! Affine mappings between coordinate spaces.
//!
//! A [`Transform`] is the homogeneous 3x3 matrix
//!
//! ```text
//! | a c e |
//! | b d f |
//! | 0 0 1 |
//! ```
//!
//! backed by [`kurbo::Affine`]. Composition follows matrix multiplication order:
//! [`Transform::compose`] applies `inner` first.

use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{ViewError, ViewResult};
use crate::foundation::math::{SINGULAR_EPS, approx_eq};

/// Affine mapping from one coordinate space into another.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Transform(Affine);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self(Affine::IDENTITY);

    pub fn from_affine(a: Affine) -> Self {
        Self(a)
    }

    pub fn from_coeffs(c: [f64; 6]) -> Self {
        Self(Affine::new(c))
    }

    pub fn translate(v: impl Into<Vec2>) -> Self {
        Self(Affine::translate(v.into()))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self(Affine::scale_non_uniform(sx, sy))
    }

    pub fn affine(self) -> Affine {
        self.0
    }

    pub fn coeffs(self) -> [f64; 6] {
        self.0.as_coeffs()
    }

    /// `outer ∘ inner`: points are mapped by `inner` first, then by `outer`.
    pub fn compose(outer: Self, inner: Self) -> Self {
        Self(outer.0 * inner.0)
    }

    pub fn apply(self, p: Point) -> Point {
        self.0 * p
    }

    /// Axis-aligned bounding box of the four mapped corners.
    pub fn apply_rect_bbox(self, r: Rect) -> Rect {
        self.0.transform_rect_bbox(r)
    }

    pub fn determinant(self) -> f64 {
        self.0.determinant()
    }

    pub fn is_invertible(self) -> bool {
        let [a, b, c, d, e, f] = self.coeffs();
        if ![a, b, c, d, e, f].iter().all(|v| v.is_finite()) {
            return false;
        }
        // Column magnitudes bound the determinant, which makes the threshold scale-free.
        let bound = (a.abs() + b.abs()) * (c.abs() + d.abs());
        let det = self.determinant();
        det.is_finite() && bound > 0.0 && det.abs() > SINGULAR_EPS * bound
    }

    pub fn invert(self) -> ViewResult<Self> {
        if !self.is_invertible() {
            return Err(ViewError::singular(format!(
                "transform {:?} has determinant {}",
                self.coeffs(),
                self.determinant()
            )));
        }
        Ok(Self(self.0.inverse()))
    }

    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        self.coeffs()
            .iter()
            .zip(other.coeffs().iter())
            .all(|(a, b)| approx_eq(*a, *b, eps))
    }
}

impl std::ops::Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform::compose(self, rhs)
    }
}

#[cfg(test)]
#[path = "../tests/unit/transform.rs"]
mod tests;
