//! JSON scene document.
//!
//! A [`SceneDoc`] describes a canvas, its root camera and a nested node list. Visuals may be
//! given an `id` and attached again elsewhere with `{"type": "ref", "ref": "<id>"}`; all
//! references share one visual node.

use crate::camera::Camera;
use crate::clip::{ClipMethod, FboFilter, FboSizing};
use crate::foundation::core::{Point, Rect, Rgba8Premul};
use crate::foundation::error::{ViewError, ViewResult};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::viewbox::ViewBox;
use crate::scene::visual::Visual;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasDef {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasDef {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2Def {
    pub x: f64,
    pub y: f64,
}

impl<'de> Deserialize<'de> for Vec2Def {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj { x: f64, y: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y]) => Ok(Self { x, y }),
            Repr::Obj { x, y } => Ok(Self { x, y }),
        }
    }
}

/// Straight-alpha color with `0..=1` channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorDef {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorDef {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_f32([self.r as f32, self.g as f32, self.b as f32, self.a as f32])
    }
}

impl<'de> Deserialize<'de> for ColorDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgba(*r, *g, *b, 1.0)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(format!("expected #rrggbb or #rrggbbaa, got '{s}'"));
    }
    let channel = |i: usize| -> Result<f64, String> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|e| format!("bad hex color '{s}': {e}"))
    };
    let a = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Ok(ColorDef::rgba(channel(0)?, channel(2)?, channel(4)?, a))
}

/// Camera given as a kind name (`"pixel"`) or as a full object (`{"kind": "twod", ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraDef {
    Name(String),
    Full(Camera),
}

impl Default for CameraDef {
    fn default() -> Self {
        Self::Full(Camera::Ndc)
    }
}

impl CameraDef {
    fn build(&self) -> ViewResult<Camera> {
        let camera = match self {
            Self::Name(name) => name.parse()?,
            Self::Full(c) => *c,
        };
        camera.validate()?;
        Ok(camera)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualDef {
    Line {
        points: Vec<Vec2Def>,
        #[serde(default)]
        color: Option<ColorDef>,
        /// Per-point colors; takes precedence over `color`.
        #[serde(default)]
        colors: Option<Vec<ColorDef>>,
        #[serde(default = "default_width")]
        width: f64,
    },
    Rect {
        min: Vec2Def,
        max: Vec2Def,
        color: ColorDef,
    },
}

fn default_width() -> f64 {
    1.0
}

impl VisualDef {
    fn build(&self) -> ViewResult<Visual> {
        match self {
            Self::Line {
                points,
                color,
                colors,
                width,
            } => {
                let points = points.iter().map(|p| Point::new(p.x, p.y)).collect();
                let colors = match (colors, color) {
                    (Some(cs), _) => cs.iter().map(|c| c.to_rgba8_premul()).collect(),
                    (None, Some(c)) => vec![c.to_rgba8_premul()],
                    (None, None) => vec![Rgba8Premul::opaque(255, 255, 255)],
                };
                Visual::line_with_colors(points, colors, *width)
            }
            Self::Rect { min, max, color } => Visual::rect(
                Rect::new(min.x, min.y, max.x, max.y),
                color.to_rgba8_premul(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeDef {
    #[serde(rename = "viewbox")]
    ViewBox(ViewBoxDef),
    Visual {
        #[serde(default)]
        id: Option<String>,
        #[serde(flatten)]
        visual: VisualDef,
    },
    /// Another attachment of a visual declared earlier with an `id`.
    Ref {
        #[serde(rename = "ref")]
        target: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewBoxDef {
    pub name: String,
    pub pos: Vec2Def,
    pub size: Vec2Def,
    #[serde(default)]
    pub camera: CameraDef,
    /// Clip method name; `fragment` and unknown names are rejected.
    #[serde(default)]
    pub clip: Option<String>,
    #[serde(default)]
    pub fbo: Option<FboSizing>,
    #[serde(default)]
    pub filter: Option<FboFilter>,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    #[serde(default)]
    pub canvas: CanvasDef,
    #[serde(default)]
    pub camera: CameraDef,
    /// Frame clear color.
    #[serde(default)]
    pub background: Option<ColorDef>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

impl SceneDoc {
    pub fn from_json(s: &str) -> ViewResult<Self> {
        serde_json::from_str(s).map_err(|e| ViewError::serde(format!("scene document: {e}")))
    }

    pub fn from_reader(r: impl std::io::Read) -> ViewResult<Self> {
        serde_json::from_reader(r).map_err(|e| ViewError::serde(format!("scene document: {e}")))
    }

    pub fn to_json_pretty(&self) -> ViewResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ViewError::serde(e.to_string()))
    }

    /// Frame size as `(width, height)`.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    /// Straight RGBA8 clear color, if any.
    pub fn clear_rgba(&self) -> Option<[u8; 4]> {
        self.background.map(|c| c.to_rgba8_premul().to_straight_rgba())
    }

    /// Build a fresh graph. Shared visuals keep one node; viewbox names need not be unique.
    #[tracing::instrument(skip_all, fields(nodes = self.nodes.len()))]
    pub fn build(&self) -> ViewResult<SceneGraph> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ViewError::invalid_geometry(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        let mut graph = SceneGraph::new(self.camera.build()?);
        let mut ids = HashMap::new();
        let root = graph.root();
        attach_all(&mut graph, root, &self.nodes, &mut ids)?;
        for &shared in ids.values() {
            graph.release(shared)?;
        }
        tracing::debug!(live = graph.len(), shared = ids.len(), "scene document built");
        Ok(graph)
    }
}

fn attach_all(
    graph: &mut SceneGraph,
    parent: NodeId,
    nodes: &[NodeDef],
    ids: &mut HashMap<String, NodeId>,
) -> ViewResult<()> {
    for node in nodes {
        match node {
            NodeDef::ViewBox(def) => {
                let vb = def.build()?;
                let id = graph.add_viewbox(parent, vb)?;
                // The graph keeps the viewbox alive through its parent edge.
                graph.release(id)?;
                attach_all(graph, id, &def.children, ids)?;
            }
            NodeDef::Visual { id, visual } => {
                let node = graph.add_visual(visual.build()?)?;
                graph.add(parent, node)?;
                match id {
                    Some(name) => {
                        if ids.insert(name.clone(), node).is_some() {
                            return Err(ViewError::invalid_attachment(format!(
                                "duplicate visual id '{name}'"
                            )));
                        }
                    }
                    None => {
                        graph.release(node)?;
                    }
                }
            }
            NodeDef::Ref { target } => {
                let Some(&node) = ids.get(target) else {
                    return Err(ViewError::unknown_node(format!(
                        "visual ref '{target}' is not declared before use"
                    )));
                };
                graph.add(parent, node)?;
            }
        }
    }
    Ok(())
}

impl ViewBoxDef {
    fn build(&self) -> ViewResult<ViewBox> {
        let method: ClipMethod = match &self.clip {
            Some(s) => s.parse()?,
            None => ClipMethod::default(),
        };
        let mut vb = ViewBox::new(self.name.clone())
            .with_rect((self.pos.x, self.pos.y), (self.size.x, self.size.y))?
            .with_camera(self.camera.build()?)
            .with_clip_method(method);
        if let Some(sizing) = self.fbo {
            vb.set_fbo_sizing(sizing)?;
        }
        if let Some(filter) = self.filter {
            vb.set_fbo_filter(filter);
        }
        Ok(vb)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/doc.rs"]
mod tests;
