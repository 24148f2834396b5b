use crate::camera::Camera;
use crate::clip::{ClipMethod, FboFilter, FboSizing};
use crate::foundation::core::{Point, Rect, Size};
use crate::foundation::error::{ViewError, ViewResult};

/// A rectangle in its parent's coordinate space that hosts a nested scene.
///
/// `position` and `size` are in parent units: NDC units under an NDC parent, pixels under a
/// pixel parent. The viewbox never converts them; its own camera defines what one unit means
/// inside the nested scene. Setters only record state, resolution happens at render time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBox {
    name: String,
    position: Point,
    size: Size,
    camera: Camera,
    clip_method: ClipMethod,
    fbo_sizing: FboSizing,
    fbo_filter: FboFilter,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Point::new(-1.0, -1.0),
            size: Size::new(2.0, 2.0),
            camera: Camera::default(),
            clip_method: ClipMethod::default(),
            fbo_sizing: FboSizing::default(),
            fbo_filter: FboFilter::default(),
        }
    }
}

impl ViewBox {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_rect(mut self, position: impl Into<Point>, size: impl Into<Size>) -> ViewResult<Self> {
        self.set_rect(position, size)?;
        Ok(self)
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_clip_method(mut self, method: ClipMethod) -> Self {
        self.clip_method = method;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Footprint in parent units.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Replace the footprint. Sizes must be finite and strictly positive; on failure the
    /// previous rectangle is kept.
    pub fn set_rect(&mut self, position: impl Into<Point>, size: impl Into<Size>) -> ViewResult<()> {
        let position = position.into();
        let size = size.into();
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(ViewError::invalid_geometry(format!(
                "viewbox '{}' position must be finite, got {position:?}",
                self.name
            )));
        }
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(ViewError::invalid_geometry(format!(
                "viewbox '{}' size must be positive, got {}x{}",
                self.name, size.width, size.height
            )));
        }
        self.position = position;
        self.size = size;
        Ok(())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn clip_method(&self) -> ClipMethod {
        self.clip_method
    }

    pub fn set_clip_method(&mut self, method: ClipMethod) {
        self.clip_method = method;
    }

    /// String form used by configuration files: `none`, `viewport` or `fbo`.
    pub fn set_clip_method_str(&mut self, method: &str) -> ViewResult<()> {
        self.clip_method = method.parse()?;
        Ok(())
    }

    pub fn fbo_sizing(&self) -> FboSizing {
        self.fbo_sizing
    }

    pub fn set_fbo_sizing(&mut self, sizing: FboSizing) -> ViewResult<()> {
        self.fbo_sizing = sizing.validate()?;
        Ok(())
    }

    pub fn fbo_filter(&self) -> FboFilter {
        self.fbo_filter
    }

    pub fn set_fbo_filter(&mut self, filter: FboFilter) {
        self.fbo_filter = filter;
    }
}

impl std::fmt::Display for ViewBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<ViewBox '{}' pos=({}, {}) size=({}, {}) camera={} clip={}>",
            self.name,
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
            self.camera.kind_name(),
            self.clip_method
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/viewbox.rs"]
mod tests;
