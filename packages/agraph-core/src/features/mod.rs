//! Feature modules
//!
//! Leaf-first:
//! - anchor_store/ - anchors and offset ordering
//! - schema/       - the layer tree
//! - graph/        - annotation arena, indexes, navigation, validation
//! - codec/        - serialized document <-> live graph

pub mod anchor_store;
pub mod codec;
pub mod graph;
pub mod schema;
