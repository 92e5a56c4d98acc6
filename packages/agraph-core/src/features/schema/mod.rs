//! Layer schema
//!
//! The layer tree of one graph. The root layer is always handle 0; every other
//! layer has exactly one parent and is only ever appended, so handles stay
//! valid for the life of the schema and parents always precede children.

use crate::config::ConventionConfig;
use crate::errors::{GraphError, ReferenceKind, Result};
use crate::features::codec::document::{
    is_reserved_layer_id, Entries, LayerDocument, SchemaDocument, DERIVED_LAYER_KEYS,
};
use crate::shared::models::{
    Alignment, Attributes, Layer, LayerDefinition, LayerHandle, LayerMetadata,
};
use ahash::AHashMap;
use serde_json::Value;
use tracing::debug;

/// Schema keys naming the convention layers
const PARTICIPANT_KEY: &str = "participantLayerId";
const TURN_KEY: &str = "turnLayerId";
const UTTERANCE_KEY: &str = "utteranceLayerId";
const WORD_KEY: &str = "wordLayerId";

#[derive(Debug, Clone)]
pub struct Schema {
    layers: Vec<Layer>,
    by_id: AHashMap<String, LayerHandle>,
    /// Non-root schema entries, preserved verbatim
    conventions: Attributes,
    defaults: ConventionConfig,
}

impl Schema {
    /// Schema holding only a root layer
    pub fn new(root_id: impl Into<String>) -> Self {
        let defaults = ConventionConfig {
            root: root_id.into(),
            ..ConventionConfig::default()
        };
        Self::from_conventions(&defaults)
    }

    /// Schema holding only the configured root layer
    pub fn from_conventions(conventions: &ConventionConfig) -> Self {
        let mut schema = Self::empty(conventions.clone());
        schema.push(Layer::new(
            conventions.root.clone(),
            None,
            Alignment::Interval,
            LayerMetadata::default(),
        ));
        schema
    }

    fn empty(defaults: ConventionConfig) -> Self {
        Self {
            layers: Vec::new(),
            by_id: AHashMap::new(),
            conventions: Attributes::new(),
            defaults,
        }
    }

    /// Build a schema from its serialized fragment
    ///
    /// The root is the object entry named `conventions.root`, or the only
    /// object entry when there is no such key. Other entries are kept as-is.
    pub fn from_document(doc: &SchemaDocument, conventions: &ConventionConfig) -> Result<Self> {
        let root_key = match doc.entries.get(&conventions.root) {
            Some(value) if value.is_object() => conventions.root.clone(),
            _ => {
                let mut objects = doc.entries.iter().filter(|(_, v)| v.is_object());
                match (objects.next(), objects.next()) {
                    (Some((key, _)), None) => key.clone(),
                    (None, _) => {
                        return Err(GraphError::malformed(format!(
                            "schema has no root layer definition (expected '{}')",
                            conventions.root
                        )))
                    }
                    (Some(_), Some(_)) => {
                        return Err(GraphError::malformed(format!(
                            "schema has no '{}' entry and more than one candidate root layer",
                            conventions.root
                        )))
                    }
                }
            }
        };

        let mut schema = Self::empty(conventions.clone());
        for (key, value) in &doc.entries {
            if *key == root_key {
                let root: LayerDocument = serde_json::from_value(value.clone())?;
                schema.load_layer(key.clone(), None, root)?;
            } else {
                schema.conventions.insert(key.clone(), value.clone());
            }
        }

        debug!(
            root = %root_key,
            layers = schema.len(),
            "Loaded layer schema"
        );
        Ok(schema)
    }

    fn load_layer(
        &mut self,
        id: String,
        parent: Option<LayerHandle>,
        doc: LayerDocument,
    ) -> Result<LayerHandle> {
        if is_reserved_layer_id(&id) {
            return Err(GraphError::reserved(id, "a layer id"));
        }
        if self.by_id.contains_key(&id) {
            return Err(GraphError::DuplicateLayer(id));
        }
        let alignment = match doc.alignment {
            None => Alignment::Interval,
            Some(code) => Alignment::from_code(code).ok_or_else(|| {
                GraphError::malformed(format!(
                    "layer '{}' has unknown alignment code {}",
                    id, code
                ))
            })?,
        };

        let mut extra = doc.rest;
        for key in DERIVED_LAYER_KEYS {
            extra.shift_remove(*key);
        }
        let metadata = LayerMetadata {
            description: doc.description,
            peers: doc.peers,
            peers_overlap: doc.peers_overlap,
            parent_includes: doc.parent_includes,
            saturated: doc.saturated,
            layer_type: doc.layer_type,
            valid_labels: doc.valid_labels,
            category: doc.category,
            extra,
        };

        let handle = self.push(Layer::new(id, parent, alignment, metadata));
        for (child_id, child) in doc.children {
            self.load_layer(child_id, Some(handle), child)?;
        }
        Ok(handle)
    }

    fn push(&mut self, layer: Layer) -> LayerHandle {
        let handle = LayerHandle::new(self.layers.len());
        if let Some(parent) = layer.parent {
            self.layers[parent.index()].children.push(handle);
        }
        self.by_id.insert(layer.id.clone(), handle);
        self.layers.push(layer);
        handle
    }

    /// Serialize the schema back into its fragment form
    pub fn to_document(&self) -> SchemaDocument {
        let mut entries = Attributes::new();
        let root = self.layer_document(self.root_handle());
        // LayerDocument always serializes to an object
        entries.insert(
            self.root().id.clone(),
            serde_json::to_value(root).unwrap_or(Value::Null),
        );
        for (key, value) in &self.conventions {
            entries.insert(key.clone(), value.clone());
        }
        SchemaDocument { entries }
    }

    fn layer_document(&self, handle: LayerHandle) -> LayerDocument {
        let layer = &self.layers[handle.index()];
        let meta = &layer.metadata;
        let mut children = Entries::new();
        for child in &layer.children {
            children.push(self.layers[child.index()].id.clone(), self.layer_document(*child));
        }
        LayerDocument {
            description: meta.description.clone(),
            alignment: Some(layer.alignment.code() as u64),
            peers: meta.peers,
            peers_overlap: meta.peers_overlap,
            parent_includes: meta.parent_includes,
            saturated: meta.saturated,
            layer_type: meta.layer_type.clone(),
            valid_labels: meta.valid_labels.clone(),
            category: meta.category.clone(),
            children,
            rest: meta.extra.clone(),
        }
    }

    /// Add a leaf layer under `parent_id`
    pub fn add_layer(
        &mut self,
        id: impl Into<String>,
        parent_id: impl Into<String>,
        alignment: Alignment,
    ) -> Result<LayerHandle> {
        self.add_layer_with(LayerDefinition::new(id, parent_id).alignment(alignment))
    }

    /// Add a leaf layer with full metadata
    pub fn add_layer_with(&mut self, definition: LayerDefinition) -> Result<LayerHandle> {
        if is_reserved_layer_id(&definition.id) {
            return Err(GraphError::reserved(definition.id, "a layer id"));
        }
        if self.by_id.contains_key(&definition.id) {
            return Err(GraphError::DuplicateLayer(definition.id));
        }
        let parent = self
            .handle_of(&definition.parent_id)
            .ok_or_else(|| GraphError::UnknownParent {
                kind: ReferenceKind::Layer,
                id: definition.parent_id.clone(),
            })?;

        debug!(
            layer = %definition.id,
            parent = %definition.parent_id,
            alignment = %definition.alignment,
            "Adding layer"
        );
        Ok(self.push(Layer::new(
            definition.id,
            Some(parent),
            definition.alignment,
            definition.metadata,
        )))
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.handle_of(id).and_then(|h| self.get(h))
    }

    pub fn handle_of(&self, id: &str) -> Option<LayerHandle> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, handle: LayerHandle) -> Option<&Layer> {
        self.layers.get(handle.index())
    }

    pub(crate) fn get_mut(&mut self, handle: LayerHandle) -> Option<&mut Layer> {
        self.layers.get_mut(handle.index())
    }

    pub fn root(&self) -> &Layer {
        &self.layers[0]
    }

    pub fn root_handle(&self) -> LayerHandle {
        LayerHandle::new(0)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in definition order
    pub fn iter(&self) -> impl Iterator<Item = (LayerHandle, &Layer)> + '_ {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, l)| (LayerHandle::new(i), l))
    }

    /// Preserved non-root schema entries
    pub fn conventions(&self) -> &Attributes {
        &self.conventions
    }

    /// Whether `layer_id` lies strictly below `ancestor_id`; unknown ids give false
    pub fn is_descendant_of(&self, layer_id: &str, ancestor_id: &str) -> bool {
        match (self.handle_of(layer_id), self.handle_of(ancestor_id)) {
            (Some(layer), Some(ancestor)) => self.is_below(layer, ancestor),
            _ => false,
        }
    }

    pub(crate) fn is_below(&self, layer: LayerHandle, ancestor: LayerHandle) -> bool {
        self.ancestors(layer).contains(&ancestor)
    }

    /// Ancestors of `handle`, parent first, root last
    pub fn ancestors(&self, handle: LayerHandle) -> Vec<LayerHandle> {
        let mut ancestors = Vec::new();
        let mut current = self.get(handle).and_then(|l| l.parent);
        while let Some(h) = current {
            ancestors.push(h);
            current = self.layers[h.index()].parent;
        }
        ancestors
    }

    /// Nearest layer that is `a` or `b` or an ancestor of both
    pub fn first_common_ancestor(&self, a: LayerHandle, b: LayerHandle) -> Option<LayerHandle> {
        self.get(a)?;
        self.get(b)?;
        let mut ours = vec![a];
        ours.extend(self.ancestors(a));
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|h| ours.contains(h))
    }

    /// Longest path from `handle` down to a leaf (0 for a leaf)
    pub fn descendant_depth(&self, handle: LayerHandle) -> usize {
        self.get(handle)
            .map(|layer| {
                layer
                    .children
                    .iter()
                    .map(|c| self.descendant_depth(*c) + 1)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// All layers, pre-order from the root, siblings in definition order
    pub fn layers_top_down(&self) -> Vec<LayerHandle> {
        let mut order = Vec::with_capacity(self.layers.len());
        let mut stack = vec![self.root_handle()];
        while let Some(handle) = stack.pop() {
            order.push(handle);
            stack.extend(self.layers[handle.index()].children.iter().rev().copied());
        }
        order
    }

    pub fn participant_layer(&self) -> Option<&Layer> {
        self.convention_layer(PARTICIPANT_KEY, &self.defaults.participant)
    }

    pub fn turn_layer(&self) -> Option<&Layer> {
        self.convention_layer(TURN_KEY, &self.defaults.turn)
    }

    pub fn utterance_layer(&self) -> Option<&Layer> {
        self.convention_layer(UTTERANCE_KEY, &self.defaults.utterance)
    }

    pub fn word_layer(&self) -> Option<&Layer> {
        self.convention_layer(WORD_KEY, &self.defaults.word)
    }

    fn convention_layer(&self, key: &str, default_id: &str) -> Option<&Layer> {
        self.conventions
            .get(key)
            .and_then(Value::as_str)
            .and_then(|id| self.layer(id))
            .or_else(|| self.layer(default_id))
    }
}
