//! Shared models

mod anchor;
mod annotation;
mod handle;
mod layer;

pub use anchor::Anchor;
pub(crate) use anchor::check_offset;
pub use annotation::{Annotation, ChildLists, NewAnnotation};
pub use handle::{AnchorHandle, AnnotationHandle, LayerHandle};
pub use layer::{Alignment, Layer, LayerDefinition, LayerMetadata};

// Re-export serde_json types used for preserved attributes
pub use serde_json::{Map, Value};

/// Free-form attributes carried through decode/encode verbatim
pub type Attributes = Map<String, Value>;
