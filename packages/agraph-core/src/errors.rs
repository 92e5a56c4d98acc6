//! Error types for agraph-core
//!
//! Every structural violation the model detects has its own variant, so callers
//! can match on the failure instead of parsing messages. `ErrorKind` gives each
//! variant a stable string code for logs and CLI output.
//!
//! An operation that returns an error has not touched the graph.

use std::fmt;
use thiserror::Error;

/// The kind of object an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Layer,
    Anchor,
    Annotation,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Layer => "layer",
            ReferenceKind::Anchor => "anchor",
            ReferenceKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error kind categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnresolvedReference,
    DuplicateLayer,
    DuplicateAnnotationId,
    UnknownParent,
    IncompatibleLayer,
    AnchorMismatch,
    InvalidInterval,
    InvalidOffset,
    ReservedName,
    Malformed,
    Json,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnresolvedReference => "unresolved_reference",
            ErrorKind::DuplicateLayer => "duplicate_layer",
            ErrorKind::DuplicateAnnotationId => "duplicate_annotation_id",
            ErrorKind::UnknownParent => "unknown_parent",
            ErrorKind::IncompatibleLayer => "incompatible_layer",
            ErrorKind::AnchorMismatch => "anchor_mismatch",
            ErrorKind::InvalidInterval => "invalid_interval",
            ErrorKind::InvalidOffset => "invalid_offset",
            ErrorKind::ReservedName => "reserved_name",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Json => "json",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for annotation graph operations
#[derive(Debug, Error)]
pub enum GraphError {
    /// A layer, anchor or annotation id that is not in the graph
    #[error("Unresolved {kind} reference '{id}' ({context})")]
    UnresolvedReference {
        kind: ReferenceKind,
        id: String,
        context: String,
    },

    /// Layer id already defined in the schema
    #[error("Duplicate layer id '{0}'")]
    DuplicateLayer(String),

    /// Annotation id already indexed in the graph
    #[error("Duplicate annotation id '{0}'")]
    DuplicateAnnotationId(String),

    /// Parent layer or parent annotation does not exist
    #[error("Unknown parent {kind} '{id}'")]
    UnknownParent { kind: ReferenceKind, id: String },

    /// The requested layer relationship is not supported
    #[error("Incompatible layer '{layer}' for {target}: {reason}")]
    IncompatibleLayer {
        layer: String,
        target: String,
        reason: String,
    },

    /// Tag-layer annotation whose anchors differ from its parent's
    #[error("Annotation '{annotation}' on tag layer '{layer}' must share both anchors with its parent")]
    AnchorMismatch { layer: String, annotation: String },

    /// Start anchor is later than end anchor
    #[error("Invalid interval: start offset {start} is after end offset {end}")]
    InvalidInterval { start: f64, end: f64 },

    /// NaN or infinite offset
    #[error("Invalid anchor offset: {0}")]
    InvalidOffset(f64),

    /// Layer id or attribute key that the serialized format uses for itself
    #[error("Reserved name '{name}' cannot be used as {usage}")]
    ReservedName { name: String, usage: String },

    /// Document shape does not match the serialized graph format
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// JSON parse/encode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Stable error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            GraphError::DuplicateLayer(_) => ErrorKind::DuplicateLayer,
            GraphError::DuplicateAnnotationId(_) => ErrorKind::DuplicateAnnotationId,
            GraphError::UnknownParent { .. } => ErrorKind::UnknownParent,
            GraphError::IncompatibleLayer { .. } => ErrorKind::IncompatibleLayer,
            GraphError::AnchorMismatch { .. } => ErrorKind::AnchorMismatch,
            GraphError::InvalidInterval { .. } => ErrorKind::InvalidInterval,
            GraphError::InvalidOffset(_) => ErrorKind::InvalidOffset,
            GraphError::ReservedName { .. } => ErrorKind::ReservedName,
            GraphError::Malformed(_) => ErrorKind::Malformed,
            GraphError::Json(_) => ErrorKind::Json,
        }
    }

    /// Create an unresolved layer reference error
    pub fn unresolved_layer(id: impl Into<String>, context: impl Into<String>) -> Self {
        GraphError::UnresolvedReference {
            kind: ReferenceKind::Layer,
            id: id.into(),
            context: context.into(),
        }
    }

    /// Create an unresolved anchor reference error
    pub fn unresolved_anchor(id: impl Into<String>, context: impl Into<String>) -> Self {
        GraphError::UnresolvedReference {
            kind: ReferenceKind::Anchor,
            id: id.into(),
            context: context.into(),
        }
    }

    /// Create an unresolved annotation reference error
    pub fn unresolved_annotation(id: impl Into<String>, context: impl Into<String>) -> Self {
        GraphError::UnresolvedReference {
            kind: ReferenceKind::Annotation,
            id: id.into(),
            context: context.into(),
        }
    }

    /// Create an incompatible layer error
    pub fn incompatible(
        layer: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GraphError::IncompatibleLayer {
            layer: layer.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a reserved name error
    pub fn reserved(name: impl Into<String>, usage: impl Into<String>) -> Self {
        GraphError::ReservedName {
            name: name.into(),
            usage: usage.into(),
        }
    }

    /// Create a malformed document error
    pub fn malformed(msg: impl Into<String>) -> Self {
        GraphError::Malformed(msg.into())
    }
}

/// Result type alias for annotation graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
