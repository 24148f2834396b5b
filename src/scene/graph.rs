//! Owning registry for the scene tree.
//!
//! Nodes live in a slot map and are addressed by [`NodeId`]. Children are owned edges in
//! insertion order; each node also keeps a list of parent back-references, which exists only
//! for detach bookkeeping and is never used to drive traversal.
//!
//! Lifetime is reference counted: a node stays alive while it has at least one parent or one
//! outstanding handle. Creating a node hands the caller one handle; [`SceneGraph::release`]
//! gives it back. Once both counts reach zero the node is destroyed, and its children lose that
//! parent edge (possibly destroying them in turn).

use smallvec::SmallVec;
use slotmap::SlotMap;

use crate::camera::Camera;
use crate::foundation::error::{ViewError, ViewResult};
use crate::scene::viewbox::ViewBox;
use crate::scene::visual::Visual;

slotmap::new_key_type! {
    /// Stable identifier of a node in a [`SceneGraph`]. Stale ids never alias new nodes.
    pub struct NodeId;
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// The canvas scene. Exactly one per graph, never a child.
    Root,
    ViewBox(ViewBox),
    Visual(Visual),
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::ViewBox(_) => "viewbox",
            Self::Visual(_) => "visual",
        }
    }

    fn can_have_children(&self) -> bool {
        !matches!(self, Self::Visual(_))
    }
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    children: Vec<NodeId>,
    parents: SmallVec<[NodeId; 2]>,
    handles: u32,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parents: SmallVec::new(),
            handles: 1,
        }
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    root: NodeId,
    root_camera: Camera,
    nodes: SlotMap<NodeId, Node>,
}

impl SceneGraph {
    pub fn new(root_camera: Camera) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeKind::Root));
        Self {
            root,
            root_camera,
            nodes,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn root_camera(&self) -> &Camera {
        &self.root_camera
    }

    pub fn root_camera_mut(&mut self) -> &mut Camera {
        &mut self.root_camera
    }

    pub fn set_root_camera(&mut self, camera: Camera) {
        self.root_camera = camera;
    }

    /// Create a detached visual. The caller holds one handle.
    pub fn add_visual(&mut self, visual: Visual) -> ViewResult<NodeId> {
        visual.validate()?;
        let id = self.nodes.insert(Node::new(NodeKind::Visual(visual)));
        tracing::trace!(node = ?id, "created visual");
        Ok(id)
    }

    /// Create a detached viewbox. The caller holds one handle.
    pub fn create_viewbox(&mut self, viewbox: ViewBox) -> NodeId {
        let name = viewbox.name().to_string();
        let id = self.nodes.insert(Node::new(NodeKind::ViewBox(viewbox)));
        tracing::trace!(node = ?id, name = %name, "created viewbox");
        id
    }

    /// Create a viewbox already attached under `parent`.
    pub fn add_viewbox(&mut self, parent: NodeId, viewbox: ViewBox) -> ViewResult<NodeId> {
        self.node(parent)?;
        let id = self.create_viewbox(viewbox);
        if let Err(e) = self.add(parent, id) {
            self.nodes.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Attach `child` under `parent` (appended after existing siblings).
    ///
    /// Visuals may be attached under any number of parents. A viewbox may only have one.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> ViewResult<()> {
        let parent_node = self.node(parent)?;
        if !parent_node.kind.can_have_children() {
            return Err(ViewError::invalid_attachment(format!(
                "{parent:?} is a visual and cannot have children"
            )));
        }
        if parent_node.children.contains(&child) {
            return Err(ViewError::invalid_attachment(format!(
                "{child:?} is already a child of {parent:?}"
            )));
        }

        let child_node = self.node(child)?;
        match &child_node.kind {
            NodeKind::Root => {
                return Err(ViewError::invalid_attachment(
                    "the root scene cannot be attached as a child",
                ));
            }
            NodeKind::ViewBox(vb) => {
                if !child_node.parents.is_empty() {
                    return Err(ViewError::multiple_parents(vb.name()));
                }
                if self.is_ancestor_or_self(child, parent) {
                    return Err(ViewError::invalid_attachment(format!(
                        "attaching viewbox '{}' under {parent:?} would create a cycle",
                        vb.name()
                    )));
                }
            }
            NodeKind::Visual(_) => {}
        }

        self.nodes[parent].children.push(child);
        self.nodes[child].parents.push(parent);
        tracing::trace!(?parent, ?child, "attached node");
        Ok(())
    }

    /// Remove the `parent -> child` edge. The child is destroyed if nothing else keeps it alive.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> ViewResult<()> {
        let parent_node = self.node(parent)?;
        let Some(pos) = parent_node.children.iter().position(|c| *c == child) else {
            return Err(ViewError::invalid_attachment(format!(
                "{child:?} is not a child of {parent:?}"
            )));
        };
        self.nodes[parent].children.remove(pos);
        if let Some(c) = self.nodes.get_mut(child) {
            if let Some(i) = c.parents.iter().position(|p| *p == parent) {
                c.parents.remove(i);
            }
        }
        tracing::trace!(?parent, ?child, "detached node");
        self.collect_if_orphaned(child);
        Ok(())
    }

    /// Take an extra handle on a node.
    pub fn retain(&mut self, id: NodeId) -> ViewResult<()> {
        let node = self.node_mut(id)?;
        node.handles = node.handles.saturating_add(1);
        Ok(())
    }

    /// Give back one handle. Returns `true` if the node was destroyed as a result.
    pub fn release(&mut self, id: NodeId) -> ViewResult<bool> {
        if id == self.root {
            return Err(ViewError::invalid_attachment(
                "the root scene is owned by the graph",
            ));
        }
        let node = self.node_mut(id)?;
        if node.handles == 0 {
            return Err(ViewError::invalid_attachment(format!(
                "{id:?} has no outstanding handles"
            )));
        }
        node.handles -= 1;
        Ok(self.collect_if_orphaned(id))
    }

    fn collect_if_orphaned(&mut self, id: NodeId) -> bool {
        let orphaned = self
            .nodes
            .get(id)
            .is_some_and(|n| id != self.root && n.parents.is_empty() && n.handles == 0);
        if !orphaned {
            return false;
        }

        let mut stack = vec![id];
        while let Some(dead) = stack.pop() {
            let Some(node) = self.nodes.remove(dead) else {
                continue;
            };
            tracing::trace!(node = ?dead, kind = node.kind.kind_name(), "destroyed node");
            for child in node.children {
                let Some(c) = self.nodes.get_mut(child) else {
                    continue;
                };
                if let Some(i) = c.parents.iter().position(|p| *p == dead) {
                    c.parents.remove(i);
                }
                if c.parents.is_empty() && c.handles == 0 {
                    stack.push(child);
                }
            }
        }
        true
    }

    pub fn kind(&self, id: NodeId) -> ViewResult<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    pub fn children(&self, id: NodeId) -> ViewResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn parents(&self, id: NodeId) -> ViewResult<&[NodeId]> {
        Ok(&self.node(id)?.parents)
    }

    pub fn viewbox(&self, id: NodeId) -> ViewResult<&ViewBox> {
        match &self.node(id)?.kind {
            NodeKind::ViewBox(vb) => Ok(vb),
            other => Err(ViewError::invalid_attachment(format!(
                "{id:?} is a {}, not a viewbox",
                other.kind_name()
            ))),
        }
    }

    pub fn viewbox_mut(&mut self, id: NodeId) -> ViewResult<&mut ViewBox> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::ViewBox(vb) => Ok(vb),
            other => Err(ViewError::invalid_attachment(format!(
                "{id:?} is a {}, not a viewbox",
                other.kind_name()
            ))),
        }
    }

    pub fn visual(&self, id: NodeId) -> ViewResult<&Visual> {
        match &self.node(id)?.kind {
            NodeKind::Visual(v) => Ok(v),
            other => Err(ViewError::invalid_attachment(format!(
                "{id:?} is a {}, not a visual",
                other.kind_name()
            ))),
        }
    }

    /// The camera that defines units inside `id`'s scene (root or viewbox).
    pub fn scene_camera(&self, id: NodeId) -> ViewResult<&Camera> {
        match &self.node(id)?.kind {
            NodeKind::Root => Ok(&self.root_camera),
            NodeKind::ViewBox(vb) => Ok(vb.camera()),
            NodeKind::Visual(_) => Err(ViewError::invalid_attachment(format!(
                "{id:?} is a visual and has no scene"
            ))),
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.walk()
            .into_iter()
            .map(|(_, id)| id)
            .find(|id| {
                self.nodes
                    .get(*id)
                    .is_some_and(|n| matches!(&n.kind, NodeKind::ViewBox(vb) if vb.name() == name))
            })
    }

    /// Pre-order `(depth, id)` listing from the root, siblings in insertion order.
    ///
    /// A visual with several parents appears once per attachment.
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0usize, self.root)];
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            if let Some(n) = self.nodes.get(id) {
                for child in n.children.iter().rev() {
                    stack.push((depth + 1, *child));
                }
            }
        }
        out
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut id: NodeId) -> bool {
        // Only roots and viewboxes have children, and those have at most one parent.
        loop {
            if id == candidate {
                return true;
            }
            match self.nodes.get(id).and_then(|n| n.parents.first().copied()) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn node(&self, id: NodeId) -> ViewResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| ViewError::unknown_node(format!("{id:?}")))
    }

    fn node_mut(&mut self, id: NodeId) -> ViewResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| ViewError::unknown_node(format!("{id:?}")))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(Camera::Ndc)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
