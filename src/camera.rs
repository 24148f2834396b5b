//! Cameras map a scene's own units onto the pixels of the viewport that shows it.
//!
//! Every camera produces its transform from the viewport's pixel size alone, so the same camera
//! gives consistent results whether its scene is the canvas root, a viewbox drawn straight to
//! the canvas, or a viewbox rendered into an offscreen buffer.
//!
//! Viewport pixel space has its origin at the top-left corner with `+y` pointing down.

use crate::foundation::core::{Point, Vec2, ViewportSize};
use crate::foundation::error::{ViewError, ViewResult};
use crate::transform::Transform;

/// Where a [`PixelCamera`] puts scene coordinate `(0, 0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelOrigin {
    /// `(0, 0)` at the top-left corner, `+y` down.
    #[default]
    TopLeft,
    /// `(0, 0)` at the bottom-left corner, `+y` up.
    BottomLeft,
}

/// One scene unit per pixel (optionally scaled).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PixelCamera {
    #[serde(default)]
    pub origin: PixelOrigin,
    /// Pixels per scene unit on each axis.
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
}

fn unit_scale() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

impl Default for PixelCamera {
    fn default() -> Self {
        Self {
            origin: PixelOrigin::TopLeft,
            scale: unit_scale(),
        }
    }
}

impl PixelCamera {
    pub fn with_origin(mut self, origin: PixelOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> ViewResult<Self> {
        if !(sx.is_finite() && sy.is_finite()) || sx == 0.0 || sy == 0.0 {
            return Err(ViewError::invalid_camera(format!(
                "pixel camera scale must be finite and non-zero, got ({sx}, {sy})"
            )));
        }
        self.scale = Vec2::new(sx, sy);
        Ok(self)
    }

    fn transform(&self, vp: ViewportSize) -> Transform {
        let Vec2 { x: sx, y: sy } = self.scale;
        match self.origin {
            PixelOrigin::TopLeft => Transform::scale(sx, sy),
            PixelOrigin::BottomLeft => {
                Transform::from_coeffs([sx, 0.0, 0.0, -sy, 0.0, vp.height])
            }
        }
    }
}

/// Pannable, zoomable 2D view.
///
/// At zoom `1.0` the square `[-1, 1]²` around `center` fills the viewport, `+y` up. State only
/// changes through the explicit mutators below.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TwoDCamera {
    #[serde(default = "origin_point")]
    center: Point,
    #[serde(default = "unit_zoom")]
    zoom: f64,
}

fn origin_point() -> Point {
    Point::ORIGIN
}

fn unit_zoom() -> f64 {
    1.0
}

impl Default for TwoDCamera {
    fn default() -> Self {
        Self {
            center: Point::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl TwoDCamera {
    pub fn new(center: Point, zoom: f64) -> ViewResult<Self> {
        let mut cam = Self::default();
        cam.set_center(center)?;
        cam.set_zoom(zoom)?;
        Ok(cam)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_center(&mut self, center: Point) -> ViewResult<()> {
        if !(center.x.is_finite() && center.y.is_finite()) {
            return Err(ViewError::invalid_camera("camera center must be finite"));
        }
        self.center = center;
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) -> ViewResult<()> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(ViewError::invalid_camera(format!(
                "zoom must be positive and finite, got {zoom}"
            )));
        }
        self.zoom = zoom;
        Ok(())
    }

    /// Move the view centre by `delta` scene units.
    pub fn pan(&mut self, delta: Vec2) -> ViewResult<()> {
        self.set_center(self.center + delta)
    }

    /// Multiply the zoom by `factor`, keeping `anchor` (scene units) fixed on screen.
    ///
    /// Without an anchor the view zooms about its centre.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Point>) -> ViewResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ViewError::invalid_camera(format!(
                "zoom factor must be positive and finite, got {factor}"
            )));
        }
        let zoom = self.zoom * factor;
        let anchor = anchor.unwrap_or(self.center);
        let center = anchor - (anchor - self.center) / factor;
        self.set_zoom(zoom)?;
        self.set_center(center)
    }

    fn transform(&self, vp: ViewportSize) -> Transform {
        let hx = vp.width * 0.5;
        let hy = vp.height * 0.5;
        let z = self.zoom;
        Transform::from_coeffs([
            hx * z,
            0.0,
            0.0,
            -hy * z,
            hx - hx * z * self.center.x,
            hy + hy * z * self.center.y,
        ])
    }
}

/// Closed set of camera kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Camera {
    /// `[-1, 1]²` fills the viewport, `+y` up. Stateless.
    #[default]
    Ndc,
    Pixel(PixelCamera),
    #[serde(rename = "twod")]
    TwoD(TwoDCamera),
}

impl Camera {
    pub fn ndc() -> Self {
        Self::Ndc
    }

    pub fn pixel() -> Self {
        Self::Pixel(PixelCamera::default())
    }

    pub fn twod() -> Self {
        Self::TwoD(TwoDCamera::default())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ndc => "ndc",
            Self::Pixel(_) => "pixel",
            Self::TwoD(_) => "twod",
        }
    }

    /// Map scene units onto a viewport of `viewport` pixels.
    ///
    /// A zero-extent viewport yields a singular transform; callers that need the inverse get
    /// [`ViewError::SingularTransform`] from [`Transform::invert`].
    pub fn to_device_transform(&self, viewport: ViewportSize) -> Transform {
        match self {
            Self::Ndc => {
                let hx = viewport.width * 0.5;
                let hy = viewport.height * 0.5;
                Transform::from_coeffs([hx, 0.0, 0.0, -hy, hx, hy])
            }
            Self::Pixel(p) => p.transform(viewport),
            Self::TwoD(c) => c.transform(viewport),
        }
    }

    /// Re-check parameters that bypassed the validating constructors (e.g. deserialized).
    pub fn validate(&self) -> ViewResult<()> {
        match self {
            Self::Ndc => Ok(()),
            Self::Pixel(p) => p.with_scale(p.scale.x, p.scale.y).map(|_| ()),
            Self::TwoD(c) => TwoDCamera::new(c.center, c.zoom).map(|_| ()),
        }
    }

    pub fn as_twod_mut(&mut self) -> Option<&mut TwoDCamera> {
        match self {
            Self::TwoD(c) => Some(c),
            _ => None,
        }
    }
}

impl std::str::FromStr for Camera {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndc" => Ok(Self::ndc()),
            "pixel" | "pixels" => Ok(Self::pixel()),
            "twod" | "2d" | "panzoom" => Ok(Self::twod()),
            other => Err(ViewError::invalid_camera(format!(
                "unknown camera kind '{other}' (expected ndc, pixel or twod)"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/camera.rs"]
mod tests;
