/// Relative determinant magnitude at or below which a transform is treated as singular.
///
/// Compared against `|det| / ((|a| + |b|) * (|c| + |d|))`, so uniform scaling of a matrix
/// does not change whether it counts as singular.
pub(crate) const SINGULAR_EPS: f64 = 1e-12;

/// Extent (in pixels) below which a viewbox footprint has collapsed.
pub(crate) const MIN_EXTENT_PX: f64 = 1e-9;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps * (1.0 + a.abs().max(b.abs()))
}

/// Buffer extent for a fractional pixel extent: rounded up, at least one pixel.
pub(crate) fn ceil_px(v: f64) -> u32 {
    if !v.is_finite() || v <= 1.0 {
        return 1;
    }
    let c = v.ceil();
    if c >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        c as u32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
