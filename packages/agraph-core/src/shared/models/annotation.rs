//! Annotation records and the insertion request type

use super::{AnchorHandle, AnnotationHandle, Attributes, LayerHandle};
use serde_json::Value;

/// A labelled interval (or point) on a layer
///
/// Ordinal, previous/next and duration are derived on demand through
/// `AnnotationRef`; nothing here is recomputed on insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub(crate) id: String,
    pub(crate) layer: LayerHandle,
    pub(crate) label: String,
    pub(crate) start: Option<AnchorHandle>,
    pub(crate) end: Option<AnchorHandle>,
    pub(crate) parent: Option<AnnotationHandle>,
    /// Child lists per child layer. An entry may exist with no children.
    pub(crate) children: ChildLists,
    pub(crate) extra: Attributes,
}

impl Annotation {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layer(&self) -> LayerHandle {
        self.layer
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> Option<AnchorHandle> {
        self.start
    }

    pub fn end(&self) -> Option<AnchorHandle> {
        self.end
    }

    /// Parent annotation; `None` for graph-scope annotations
    pub fn parent(&self) -> Option<AnnotationHandle> {
        self.parent
    }

    /// Registered child list on `layer`, if any
    pub fn child_list(&self, layer: LayerHandle) -> Option<&[AnnotationHandle]> {
        self.children.get(layer)
    }

    /// Layers with a registered child list, in registration order
    pub fn child_layers(&self) -> impl Iterator<Item = LayerHandle> + '_ {
        self.children.layers()
    }

    pub fn extra(&self) -> &Attributes {
        &self.extra
    }
}

/// Annotation lists keyed by layer, in the order the lists were first registered
///
/// Decoding registers lists in document key order, so encoding can write the
/// arrays back in the order they were read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildLists(Vec<(LayerHandle, Vec<AnnotationHandle>)>);

impl ChildLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, layer: LayerHandle) -> Option<&[AnnotationHandle]> {
        self.0
            .iter()
            .find(|(l, _)| *l == layer)
            .map(|(_, list)| list.as_slice())
    }

    /// The list for `layer`, registered empty at the end if missing
    pub(crate) fn list_mut(&mut self, layer: LayerHandle) -> &mut Vec<AnnotationHandle> {
        let index = match self.0.iter().position(|(l, _)| *l == layer) {
            Some(index) => index,
            None => {
                self.0.push((layer, Vec::new()));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }

    pub fn layers(&self) -> impl Iterator<Item = LayerHandle> + '_ {
        self.0.iter().map(|(l, _)| *l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerHandle, &[AnnotationHandle])> + '_ {
        self.0.iter().map(|(l, list)| (*l, list.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request to add an annotation to a graph
///
/// ```rust,ignore
/// let word = graph.add_annotation(
///     NewAnnotation::new("word", "hello")
///         .anchored(a0, a1)
///         .parent(turn),
/// )?;
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewAnnotation {
    pub layer_id: String,
    pub label: String,
    /// Explicit id; one is allocated when `None`
    pub id: Option<String>,
    pub start: Option<AnchorHandle>,
    pub end: Option<AnchorHandle>,
    pub parent: Option<AnnotationHandle>,
    pub extra: Attributes,
}

impl NewAnnotation {
    pub fn new(layer_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            layer_id: layer_id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn anchored(mut self, start: AnchorHandle, end: AnchorHandle) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn start(mut self, start: AnchorHandle) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: AnchorHandle) -> Self {
        self.end = Some(end);
        self
    }

    pub fn parent(mut self, parent: AnnotationHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attach a free-form attribute
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
