use crate::foundation::core::{Point, Rect, Rgba8Premul};
use crate::foundation::error::{ViewError, ViewResult};
use crate::transform::Transform;

/// A drawable leaf. Geometry is stored in the units of whichever scene it is attached to; the
/// renderer maps it per attachment and never writes back into it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Visual {
    /// Polyline with a constant on-screen width.
    Line(LineVisual),
    /// Filled axis-aligned rectangle.
    Rect(RectVisual),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineVisual {
    pub points: Vec<Point>,
    /// Either one color for the whole line or one per point (segment `i` uses `colors[i]`).
    pub colors: Vec<Rgba8Premul>,
    #[serde(default = "default_line_width")]
    pub width_px: f64,
}

fn default_line_width() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectVisual {
    pub rect: Rect,
    pub color: Rgba8Premul,
}

impl Visual {
    pub fn line(points: Vec<Point>, color: Rgba8Premul) -> ViewResult<Self> {
        Self::line_with_colors(points, vec![color], 1.0)
    }

    pub fn line_with_colors(
        points: Vec<Point>,
        colors: Vec<Rgba8Premul>,
        width_px: f64,
    ) -> ViewResult<Self> {
        let v = Self::Line(LineVisual {
            points,
            colors,
            width_px,
        });
        v.validate()?;
        Ok(v)
    }

    pub fn rect(rect: Rect, color: Rgba8Premul) -> ViewResult<Self> {
        let v = Self::Rect(RectVisual { rect, color });
        v.validate()?;
        Ok(v)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Rect(_) => "rect",
        }
    }

    pub fn validate(&self) -> ViewResult<()> {
        match self {
            Self::Line(l) => {
                if l.points.len() < 2 {
                    return Err(ViewError::invalid_geometry(
                        "line needs at least two points",
                    ));
                }
                if l.colors.is_empty() || (l.colors.len() != 1 && l.colors.len() != l.points.len())
                {
                    return Err(ViewError::invalid_geometry(format!(
                        "line needs 1 or {} colors, got {}",
                        l.points.len(),
                        l.colors.len()
                    )));
                }
                if !l.width_px.is_finite() || l.width_px <= 0.0 {
                    return Err(ViewError::invalid_geometry(format!(
                        "line width must be positive, got {}",
                        l.width_px
                    )));
                }
                if l.points.iter().any(|p| !p.is_finite()) {
                    return Err(ViewError::invalid_geometry("line points must be finite"));
                }
                Ok(())
            }
            Self::Rect(r) => {
                if !r.rect.is_finite() || r.rect.width() <= 0.0 || r.rect.height() <= 0.0 {
                    return Err(ViewError::invalid_geometry(format!(
                        "rect visual must have positive size, got {:?}",
                        r.rect
                    )));
                }
                Ok(())
            }
        }
    }

    /// Bounding box after mapping through `to_target`; used for diagnostics and culling.
    pub fn bounds(&self, to_target: Transform) -> Rect {
        match self {
            Self::Line(l) => {
                let mut it = l.points.iter().map(|p| to_target.apply(*p));
                let Some(first) = it.next() else {
                    return Rect::ZERO;
                };
                let r = it.fold(Rect::from_points(first, first), |acc, p| {
                    acc.union_pt(p)
                });
                r.inflate(l.width_px * 0.5, l.width_px * 0.5)
            }
            Self::Rect(r) => to_target.apply_rect_bbox(r.rect),
        }
    }
}

impl LineVisual {
    pub fn color_for_segment(&self, i: usize) -> Rgba8Premul {
        let last = self.colors.len().saturating_sub(1);
        self.colors
            .get(i.min(last))
            .copied()
            .unwrap_or_else(Rgba8Premul::transparent)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/visual.rs"]
mod tests;
