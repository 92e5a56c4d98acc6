//! Document -> live graph
//!
//! Two passes. The first builds the schema and every anchor. The second walks
//! the annotation arrays the schema says can exist: at the top level, the
//! arrays keyed by the root layer and its children; inside a record, the
//! arrays keyed by the child layers of that record's layer. Every record is
//! collected and checked before the first one is indexed, so a failing
//! document never yields a graph.

use super::document::{
    AnnotationRecord, GraphDocument, DERIVED_ANCHOR_KEYS, DERIVED_RECORD_KEYS,
};
use crate::config::GraphConfig;
use crate::errors::{GraphError, Result};
use crate::features::graph::Graph;
use crate::features::schema::Schema;
use crate::shared::models::{AnchorHandle, AnnotationHandle, Attributes, LayerHandle};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// A record that passed reference resolution but is not indexed yet
struct PendingRecord {
    id: Option<String>,
    label: String,
    layer: LayerHandle,
    start: Option<AnchorHandle>,
    end: Option<AnchorHandle>,
    /// Index of the parent in the pending list (parents precede children)
    parent: Option<usize>,
    extra: Attributes,
    /// Child arrays present in the record, even empty ones
    child_layers: Vec<LayerHandle>,
}

/// Result of the collection walk
#[derive(Default)]
struct Collected {
    records: Vec<PendingRecord>,
    top_level_layers: Vec<LayerHandle>,
    extra: Attributes,
}

struct Collector<'g> {
    graph: &'g Graph,
    max_depth: usize,
    out: Collected,
}

impl<'g> Collector<'g> {
    fn schema(&self) -> &'g Schema {
        self.graph.schema()
    }

    fn layer_id(&self, layer: LayerHandle) -> &'g str {
        self.schema().get(layer).map(|l| l.id()).unwrap_or_default()
    }

    fn collect_top_level(&mut self, rest: serde_json::Map<String, Value>) -> Result<()> {
        let schema = self.schema();
        let root = schema.root_handle();
        let mut top_layers = vec![root];
        top_layers.extend_from_slice(schema.root().children());

        for (key, value) in rest {
            let layer = schema.handle_of(&key).filter(|l| top_layers.contains(l));
            match layer {
                Some(layer) => {
                    let records = into_array(value, || format!("top-level layer '{}'", key))?;
                    self.out.top_level_layers.push(layer);
                    self.collect_records(records, layer, None, 1)?;
                }
                None => {
                    if value.is_array() {
                        warn!(
                            "Top-level array '{}' is not a root-level layer; keeping it as extra data",
                            key
                        );
                    }
                    self.out.extra.insert(key, value);
                }
            }
        }
        Ok(())
    }

    fn collect_records(
        &mut self,
        records: Vec<Value>,
        layer: LayerHandle,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<()> {
        if depth > self.max_depth {
            return Err(GraphError::malformed(format!(
                "annotation nesting exceeds the limit of {} levels at layer '{}'",
                self.max_depth,
                self.layer_id(layer)
            )));
        }
        for value in records {
            self.collect_record(value, layer, parent, depth)?;
        }
        Ok(())
    }

    fn collect_record(
        &mut self,
        value: Value,
        layer: LayerHandle,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<()> {
        let layer_id = self.layer_id(layer);
        if !value.is_object() {
            return Err(GraphError::malformed(format!(
                "annotation record on layer '{}' is not an object",
                layer_id
            )));
        }
        let mut record: AnnotationRecord = serde_json::from_value(value)?;
        let name = record.id.clone().unwrap_or_else(|| "(unnamed)".to_string());

        if let Some(declared) = record.rest.get("layerId").and_then(Value::as_str) {
            if declared != layer_id {
                return Err(match self.schema().handle_of(declared) {
                    None => GraphError::unresolved_layer(
                        declared,
                        format!("layerId of annotation '{}'", name),
                    ),
                    Some(_) => GraphError::malformed(format!(
                        "annotation '{}' declares layer '{}' but sits in a '{}' array",
                        name, declared, layer_id
                    )),
                });
            }
        }

        let start = self.resolve_anchor(record.start_id.as_deref(), "startId", &name, layer_id)?;
        let end = self.resolve_anchor(record.end_id.as_deref(), "endId", &name, layer_id)?;

        // child arrays in document key order
        let child_layers = self.schema().get(layer).map(|l| l.children()).unwrap_or(&[]);
        let child_keys: Vec<(String, LayerHandle)> = record
            .rest
            .keys()
            .filter_map(|key| {
                self.schema()
                    .handle_of(key)
                    .filter(|h| child_layers.contains(h))
                    .map(|h| (key.clone(), h))
            })
            .collect();
        let mut children = Vec::with_capacity(child_keys.len());
        for (child_id, child) in child_keys {
            if let Some(value) = record.rest.shift_remove(&child_id) {
                let nested = into_array(value, || {
                    format!("'{}' children of annotation '{}'", child_id, name)
                })?;
                children.push((child, nested));
            }
        }
        for key in DERIVED_RECORD_KEYS {
            record.rest.shift_remove(*key);
        }

        let index = self.out.records.len();
        self.out.records.push(PendingRecord {
            id: record.id,
            label: record.label,
            layer,
            start,
            end,
            parent,
            extra: record.rest,
            child_layers: children.iter().map(|(l, _)| *l).collect(),
        });

        for (child, nested) in children {
            self.collect_records(nested, child, Some(index), depth + 1)?;
        }
        Ok(())
    }

    fn resolve_anchor(
        &self,
        id: Option<&str>,
        field: &str,
        name: &str,
        layer_id: &str,
    ) -> Result<Option<AnchorHandle>> {
        match id {
            None => Ok(None),
            Some(id) => self.graph.anchors().handle_of(id).map(Some).ok_or_else(|| {
                GraphError::unresolved_anchor(
                    id,
                    format!("{} of annotation '{}' on layer '{}'", field, name, layer_id),
                )
            }),
        }
    }
}

fn into_array(value: Value, what: impl FnOnce() -> String) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(GraphError::malformed(format!("{} must be an array", what()))),
    }
}

impl Graph {
    /// Decode a serialized graph with the default configuration
    pub fn from_serialized(value: &Value) -> Result<Self> {
        Self::from_serialized_with(value, GraphConfig::default())
    }

    pub fn from_serialized_with(value: &Value, config: GraphConfig) -> Result<Self> {
        if !value.is_object() {
            return Err(GraphError::malformed("graph document must be a JSON object"));
        }
        let doc: GraphDocument = serde_json::from_value(value.clone())?;
        Self::from_document_with(doc, config)
    }

    /// Parse and decode JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_serialized(&value)
    }

    pub fn from_document(doc: GraphDocument) -> Result<Self> {
        Self::from_document_with(doc, GraphConfig::default())
    }

    pub fn from_document_with(doc: GraphDocument, config: GraphConfig) -> Result<Self> {
        // Pass 1: schema and anchors
        let schema = Schema::from_document(&doc.schema, &config.conventions)?;
        let max_depth = config.decode.max_depth;
        let mut graph = Graph::assemble(doc.id, schema, config);
        for (id, anchor) in doc.anchors {
            let mut extra = anchor.rest;
            for key in DERIVED_ANCHOR_KEYS {
                extra.shift_remove(*key);
            }
            graph.anchors_mut().insert(id, anchor.offset, extra)?;
        }

        // Pass 2: collect and resolve every record
        let collected = {
            let mut collector = Collector {
                graph: &graph,
                max_depth,
                out: Collected::default(),
            };
            collector.collect_top_level(doc.rest)?;
            collector.out
        };

        let mut explicit = HashSet::new();
        for record in &collected.records {
            if let Some(id) = &record.id {
                if !explicit.insert(id.as_str()) {
                    return Err(GraphError::DuplicateAnnotationId(id.clone()));
                }
            }
        }

        // Every record must validate before anything is indexed
        let mut ids = Vec::with_capacity(collected.records.len());
        for record in &collected.records {
            let id = match &record.id {
                Some(id) => id.clone(),
                None => graph.allocate_id_where(|id| explicit.contains(id)),
            };
            ids.push(id);
        }

        // Pass 2b: index in pre-order, so parents are live before children.
        // Lists are registered before they are filled to keep document order.
        for layer in collected.top_level_layers {
            graph.register_child_list(None, layer);
        }
        let mut handles: Vec<AnnotationHandle> = Vec::with_capacity(ids.len());
        for (record, id) in collected.records.into_iter().zip(ids) {
            let parent = record.parent.and_then(|i| handles.get(i).copied());
            let placement = graph.place(record.layer, parent, record.start, record.end, false, &id)?;
            let handle = graph.commit(Some(id), record.label, record.extra, placement)?;
            for layer in record.child_layers {
                graph.register_child_list(Some(handle), layer);
            }
            handles.push(handle);
        }
        *graph.extra_mut() = collected.extra;

        graph.log_summary("Decoded");
        Ok(graph)
    }
}
