//! Serialized form of a graph
//!
//! - `document` - serde types for the JSON exchange format
//! - decode     - document -> live graph (schema, anchors, then a
//!                schema-driven walk of the annotation arrays)
//! - encode     - live graph -> acyclic document

pub mod document;
mod decode;
mod encode;

pub use document::{
    AnchorDocument, AnnotationRecord, Entries, GraphDocument, LayerDocument, SchemaDocument,
};
