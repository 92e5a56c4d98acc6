//! Layer definitions

use super::{AnnotationHandle, Attributes, LayerHandle};
use serde_json::Value;
use std::fmt;

/// How annotations on a layer relate to the offset axis
///
/// Wire codes: 0 = none (tag), 1 = instant, 2 = interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// Tag layer: annotations share both anchors with their parent
    None,
    /// Instants: start and end are the same point
    Instant,
    /// Intervals with independent start and end
    #[default]
    Interval,
}

impl Alignment {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Alignment::None),
            1 => Some(Alignment::Instant),
            2 => Some(Alignment::Interval),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Alignment::None => 0,
            Alignment::Instant => 1,
            Alignment::Interval => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::None => "none",
            Alignment::Instant => "instant",
            Alignment::Interval => "interval",
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Alignment::None)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptive layer attributes
///
/// None of these change how the graph indexes annotations. `valid_labels`
/// feeds `Graph::validate`; the rest is carried for consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerMetadata {
    pub description: Option<String>,
    /// Whether siblings on this layer may exist under one parent
    pub peers: Option<bool>,
    /// Whether sibling annotations may overlap
    pub peers_overlap: Option<bool>,
    /// Whether children lie within their parent's bounds
    pub parent_includes: Option<bool>,
    /// Whether children fill the parent with no gaps
    pub saturated: Option<bool>,
    /// Label type, e.g. "string", "number", "ipa"
    pub layer_type: Option<String>,
    /// Allowed labels, label -> description, in declaration order
    pub valid_labels: Option<Attributes>,
    pub category: Option<String>,
    /// Unknown keys, preserved verbatim
    pub extra: Attributes,
}

/// A node of the layer tree
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub(crate) id: String,
    pub(crate) parent: Option<LayerHandle>,
    pub(crate) children: Vec<LayerHandle>,
    pub(crate) alignment: Alignment,
    pub(crate) metadata: LayerMetadata,
    pub(crate) annotations: Vec<AnnotationHandle>,
}

impl Layer {
    pub(crate) fn new(
        id: String,
        parent: Option<LayerHandle>,
        alignment: Alignment,
        metadata: LayerMetadata,
    ) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            alignment,
            metadata,
            annotations: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parent layer; `None` only for the root
    pub fn parent(&self) -> Option<LayerHandle> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child layers in definition order
    pub fn children(&self) -> &[LayerHandle] {
        &self.children
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn metadata(&self) -> &LayerMetadata {
        &self.metadata
    }

    /// All annotations on this layer, in insertion order
    pub fn annotations(&self) -> &[AnnotationHandle] {
        &self.annotations
    }

    /// Whether `label` is allowed; layers without `valid_labels` allow anything
    pub fn allows_label(&self, label: &str) -> bool {
        match &self.metadata.valid_labels {
            Some(labels) => labels.contains_key(label),
            None => true,
        }
    }
}

/// Everything needed to add a layer to a schema
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDefinition {
    pub id: String,
    pub parent_id: String,
    pub alignment: Alignment,
    pub metadata: LayerMetadata,
}

impl LayerDefinition {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            alignment: Alignment::default(),
            metadata: LayerMetadata::default(),
        }
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn peers(mut self, peers: bool) -> Self {
        self.metadata.peers = Some(peers);
        self
    }

    pub fn peers_overlap(mut self, peers_overlap: bool) -> Self {
        self.metadata.peers_overlap = Some(peers_overlap);
        self
    }

    pub fn parent_includes(mut self, parent_includes: bool) -> Self {
        self.metadata.parent_includes = Some(parent_includes);
        self
    }

    pub fn saturated(mut self, saturated: bool) -> Self {
        self.metadata.saturated = Some(saturated);
        self
    }

    pub fn layer_type(mut self, layer_type: impl Into<String>) -> Self {
        self.metadata.layer_type = Some(layer_type.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.metadata.category = Some(category.into());
        self
    }

    /// Add one allowed label
    pub fn valid_label(mut self, label: impl Into<String>, description: impl Into<String>) -> Self {
        self.metadata
            .valid_labels
            .get_or_insert_with(Attributes::new)
            .insert(label.into(), Value::String(description.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_codes() {
        for alignment in [Alignment::None, Alignment::Instant, Alignment::Interval] {
            assert_eq!(Alignment::from_code(alignment.code() as u64), Some(alignment));
        }
        assert_eq!(Alignment::from_code(3), None);
        assert_eq!(Alignment::default(), Alignment::Interval);
        assert!(Alignment::None.is_tag());
    }

    #[test]
    fn test_definition_builder() {
        let def = LayerDefinition::new("pos", "word")
            .alignment(Alignment::None)
            .description("Part of speech")
            .valid_label("NN", "noun")
            .valid_label("VB", "verb");

        assert_eq!(def.parent_id, "word");
        assert_eq!(def.alignment, Alignment::None);
        let labels: Vec<_> = def
            .metadata
            .valid_labels
            .as_ref()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(labels, vec!["NN", "VB"]);
    }

    #[test]
    fn test_allows_label() {
        let open = Layer::new("word".into(), None, Alignment::Interval, LayerMetadata::default());
        assert!(open.allows_label("anything"));

        let def = LayerDefinition::new("pos", "word").valid_label("NN", "noun");
        let closed = Layer::new("pos".into(), None, Alignment::None, def.metadata);
        assert!(closed.allows_label("NN"));
        assert!(!closed.allows_label("XX"));
    }
}
