//! Parent-to-local transform resolution for viewboxes.
//!
//! Given the parent scene's effective transform `P` (parent units to device pixels):
//!
//! 1. `device_rect` is the bounding box of the viewbox rectangle's corners under `P`.
//! 2. The camera sees a viewport of `device_rect.size()` pixels.
//! 3. `effective = translate(device_rect.origin) ∘ camera(device_rect.size())`.
//! 4. `local = P⁻¹ ∘ effective`, hence `effective == P ∘ local`.
//!
//! Chaining `local` transforms top-down therefore reproduces every effective transform.

use crate::foundation::core::{Rect, ViewportSize};
use crate::foundation::error::{ViewError, ViewResult};
use crate::foundation::math::MIN_EXTENT_PX;
use crate::scene::viewbox::ViewBox;
use crate::transform::Transform;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Resolution {
    pub(crate) device_rect: Rect,
    pub(crate) pixel_size: ViewportSize,
    /// Nested scene units to device pixels.
    pub(crate) effective: Transform,
    /// Nested scene units to parent scene units.
    pub(crate) local: Transform,
}

pub(crate) fn resolve_viewbox(vb: &ViewBox, parent_effective: Transform) -> ViewResult<Resolution> {
    let parent_inv = parent_effective.invert().map_err(|e| {
        ViewError::singular(format!("parent of viewbox '{}' is not invertible: {e}", vb.name()))
    })?;

    let device_rect = parent_effective.apply_rect_bbox(vb.rect());
    let pixel_size = ViewportSize::new(device_rect.width(), device_rect.height());
    if !(pixel_size.width > MIN_EXTENT_PX && pixel_size.height > MIN_EXTENT_PX) {
        return Err(ViewError::singular(format!(
            "viewbox '{}' collapses to {}x{} device pixels",
            vb.name(),
            pixel_size.width,
            pixel_size.height
        )));
    }

    let camera_tf = vb.camera().to_device_transform(pixel_size);
    if !camera_tf.is_invertible() {
        return Err(ViewError::singular(format!(
            "camera of viewbox '{}' is singular at {}x{} px",
            vb.name(),
            pixel_size.width,
            pixel_size.height
        )));
    }

    let effective = Transform::compose(Transform::translate(device_rect.origin().to_vec2()), camera_tf);
    let local = Transform::compose(parent_inv, effective);
    Ok(Resolution {
        device_rect,
        pixel_size,
        effective,
        local,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/resolve.rs"]
mod tests;
