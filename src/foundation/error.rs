/// Convenience result type used across the crate.
pub type ViewResult<T> = Result<T, ViewError>;

/// Error taxonomy for scene construction, transform resolution, and rendering.
///
/// Everything except [`ViewError::SingularTransform`] is raised by the call that violates the
/// contract. Singular transforms depend on composed ancestor state and surface during render.
#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    /// A rectangle or buffer size was zero, negative, or non-finite.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A transform in the resolved chain cannot be inverted.
    #[error("singular transform: {0}")]
    SingularTransform(String),

    /// A viewbox was attached under a second parent.
    #[error("viewbox '{0}' already has a parent")]
    MultipleViewBoxParents(String),

    /// A clip method string did not name a supported method.
    #[error("unknown clip method: {0}")]
    UnknownClipMethod(String),

    /// Camera parameters were rejected.
    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    /// A structural edit would break the graph's shape rules.
    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),

    /// A node id no longer refers to a live node.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// A backend failed to execute a command.
    #[error("render error: {0}")]
    Render(String),

    /// Scene document (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ViewError {
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    pub fn singular(msg: impl Into<String>) -> Self {
        Self::SingularTransform(msg.into())
    }

    pub fn multiple_parents(name: impl Into<String>) -> Self {
        Self::MultipleViewBoxParents(name.into())
    }

    pub fn unknown_clip_method(msg: impl Into<String>) -> Self {
        Self::UnknownClipMethod(msg.into())
    }

    pub fn invalid_camera(msg: impl Into<String>) -> Self {
        Self::InvalidCamera(msg.into())
    }

    pub fn invalid_attachment(msg: impl Into<String>) -> Self {
        Self::InvalidAttachment(msg.into())
    }

    pub fn unknown_node(msg: impl Into<String>) -> Self {
        Self::UnknownNode(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
