use crate::clip::FboFilter;
use crate::foundation::core::{PixelRect, Rect};
use crate::foundation::error::{ViewError, ViewResult};
use crate::render::backend::{DrawCall, RenderBackend, SurfaceDesc};
use crate::scene::graph::NodeId;
use crate::transform::Transform;

/// One command as seen by a [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BackendCmd {
    BeginFrame {
        target: SurfaceDesc,
    },
    PushScissor {
        rect: PixelRect,
        /// Intersection with every scissor already pushed in the same target.
        effective: PixelRect,
    },
    PopScissor,
    BeginOffscreen {
        owner: NodeId,
        desc: SurfaceDesc,
    },
    EndOffscreen {
        owner: NodeId,
        dest: Rect,
        filter: FboFilter,
    },
    Draw {
        node: NodeId,
        kind: &'static str,
        to_target: Transform,
        /// Visual bounds in target pixels.
        bounds: Rect,
        /// Offscreen owner the draw landed in, `None` for the frame target.
        target: Option<NodeId>,
        /// Active clip in that target, if any.
        scissor: Option<PixelRect>,
    },
    EndFrame,
    /// The frame was dropped after a failure; open targets and scissors were discarded.
    AbortFrame,
}

#[derive(Debug)]
struct Level {
    owner: Option<NodeId>,
    scissors: Vec<PixelRect>,
}

/// Backend that rasterizes nothing and records the command stream.
///
/// It enforces the same nesting rules as a real backend, so it doubles as a validator for
/// compositor output. The log is kept across frames until [`RecordingBackend::clear`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    cmds: Vec<BackendCmd>,
    levels: Vec<Level>,
    frames: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[BackendCmd] {
        &self.cmds
    }

    pub fn frames_finished(&self) -> u64 {
        self.frames
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn draws(&self) -> impl Iterator<Item = &BackendCmd> {
        self.cmds
            .iter()
            .filter(|c| matches!(c, BackendCmd::Draw { .. }))
    }

    /// Every draw of `node`, in the order issued.
    pub fn draws_for(&self, node: NodeId) -> Vec<&BackendCmd> {
        self.draws()
            .filter(|c| matches!(c, BackendCmd::Draw { node: n, .. } if *n == node))
            .collect()
    }

    fn level(&mut self) -> ViewResult<&mut Level> {
        self.levels
            .last_mut()
            .ok_or_else(|| ViewError::render("no render target; call begin_frame first"))
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, target: SurfaceDesc) -> ViewResult<()> {
        if !self.levels.is_empty() {
            return Err(ViewError::render("begin_frame while a frame is open"));
        }
        self.levels.push(Level {
            owner: None,
            scissors: Vec::new(),
        });
        self.cmds.push(BackendCmd::BeginFrame { target });
        Ok(())
    }

    fn push_scissor(&mut self, rect: PixelRect) -> ViewResult<()> {
        let level = self.level()?;
        let effective = level
            .scissors
            .last()
            .map_or(rect, |outer| outer.intersect(rect));
        level.scissors.push(effective);
        self.cmds.push(BackendCmd::PushScissor { rect, effective });
        Ok(())
    }

    fn pop_scissor(&mut self) -> ViewResult<()> {
        if self.level()?.scissors.pop().is_none() {
            return Err(ViewError::render("pop_scissor without matching push"));
        }
        self.cmds.push(BackendCmd::PopScissor);
        Ok(())
    }

    fn begin_offscreen(&mut self, owner: NodeId, desc: SurfaceDesc) -> ViewResult<()> {
        self.level()?;
        self.levels.push(Level {
            owner: Some(owner),
            scissors: Vec::new(),
        });
        self.cmds.push(BackendCmd::BeginOffscreen { owner, desc });
        Ok(())
    }

    fn end_offscreen(&mut self, owner: NodeId, dest: Rect, filter: FboFilter) -> ViewResult<()> {
        let level = self.level()?;
        if level.owner != Some(owner) {
            return Err(ViewError::render(format!(
                "end_offscreen for {owner:?} but {:?} is open",
                level.owner
            )));
        }
        if !level.scissors.is_empty() {
            return Err(ViewError::render("scissor still pushed at end_offscreen"));
        }
        self.levels.pop();
        self.cmds.push(BackendCmd::EndOffscreen {
            owner,
            dest,
            filter,
        });
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> ViewResult<()> {
        let level = self.level()?;
        let cmd = BackendCmd::Draw {
            node: call.node,
            kind: call.visual.kind_name(),
            to_target: call.to_target,
            bounds: call.visual.bounds(call.to_target),
            target: level.owner,
            scissor: level.scissors.last().copied(),
        };
        self.cmds.push(cmd);
        Ok(())
    }

    fn end_frame(&mut self) -> ViewResult<()> {
        match self.levels.as_slice() {
            [root] if root.owner.is_none() && root.scissors.is_empty() => {}
            [] => return Err(ViewError::render("end_frame without begin_frame")),
            _ => {
                self.levels.clear();
                return Err(ViewError::render("end_frame with unbalanced stacks"));
            }
        }
        self.levels.clear();
        self.cmds.push(BackendCmd::EndFrame);
        self.frames += 1;
        Ok(())
    }

    fn abort_frame(&mut self) {
        if !self.levels.is_empty() {
            self.levels.clear();
            self.cmds.push(BackendCmd::AbortFrame);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/record.rs"]
mod tests;
