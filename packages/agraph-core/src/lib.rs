/*
 * agraph-core - Annotation Graph model
 *
 * Layout:
 * - shared/   : plain models (Anchor, Annotation, Layer) and typed handles
 * - features/ : anchor store, layer schema, annotation graph, JSON codec
 * - config/   : GraphConfig and its versioned YAML form
 * - errors    : GraphError / ErrorKind
 *
 * Storage is arena-based: anchors, layers and annotations live in vectors
 * owned by the graph and refer to each other through copyable handles.
 * Navigation goes through borrowed views (`AnnotationRef`, `AnchorRef`).
 */

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Anchor store, schema, graph, codec
pub mod features;

/// Configuration (GraphConfig, YAML export)
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, GraphConfig};
pub use errors::{ErrorKind, GraphError, ReferenceKind, Result};
pub use features::anchor_store::AnchorStore;
pub use features::codec::{
    AnchorDocument, AnnotationRecord, Entries, GraphDocument, LayerDocument, SchemaDocument,
};
pub use features::graph::{
    AnchorRef, AnnotationRef, Graph, IssueKind, SharedGraph, ValidationIssue,
};
pub use features::schema::Schema;
pub use shared::models::{
    Alignment, Anchor, AnchorHandle, Annotation, AnnotationHandle, Attributes, ChildLists,
    Layer, LayerDefinition, LayerHandle, LayerMetadata, NewAnnotation,
};
