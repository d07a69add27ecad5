//! Error types for the collision pipeline.
//!
//! [`BodyError`] covers per-body data that is not initialised yet and is
//! recoverable: the pipeline logs it and skips the body or pair. Everything in
//! [`CollisionError`] aborts the current pass.

use thiserror::Error;

/// Missing per-body state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BodyError {
    /// A field the pipeline needs has never been set on the body.
    #[error("{field} of {id} is not set")]
    NotSet { id: String, field: BodyField },
}

impl BodyError {
    pub fn not_set(id: &str, field: BodyField) -> Self {
        Self::NotSet {
            id: id.to_owned(),
            field,
        }
    }
}

/// Name of a body field, used in [`BodyError`] messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyField {
    BoundingBox,
    Position,
    Velocity,
    Angle,
    Rotation,
}

impl std::fmt::Display for BodyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BoundingBox => "bounding box",
            Self::Position => "position",
            Self::Velocity => "velocity",
            Self::Angle => "angle",
            Self::Rotation => "rotation",
        };
        f.write_str(name)
    }
}

/// Fatal pipeline errors. A pass that returns one of these stopped early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollisionError {
    /// A selector string did not name any known algorithm or mode.
    #[error("unknown {kind} selector: {value:?}")]
    UnknownSelector { kind: &'static str, value: String },

    /// A recognised mode that has no implementation reached dispatch.
    #[error("{stage} stage does not support execution mode {mode}")]
    UnsupportedMode { stage: &'static str, mode: String },

    /// A candidate pair referenced the same body twice.
    #[error("body {index} ({id}) cannot collide with itself")]
    SelfPair { index: usize, id: String },

    /// The sorter left two adjacent bodies out of min-X order.
    #[error("bodies not sorted by min x at index {index}: {previous} > {current}")]
    NotSorted {
        index: usize,
        previous: f64,
        current: f64,
    },
}

/// Convenient Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, CollisionError>;
