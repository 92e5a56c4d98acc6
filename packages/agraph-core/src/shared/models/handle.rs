//! Typed arena handles
//!
//! Every cross reference in the model is one of these. A struct never holds a
//! reference to another struct, so the graph has no ownership cycles.

define_handle!(
    /// Index of a layer in a graph's schema
    LayerHandle,
    "layer"
);

define_handle!(
    /// Index of an anchor in a graph's anchor store
    AnchorHandle,
    "anchor"
);

define_handle!(
    /// Index of an annotation in a graph's annotation arena
    AnnotationHandle,
    "annotation"
);
