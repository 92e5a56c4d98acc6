//! Live graph -> document
//!
//! The document is a tree: records nest under their parent's record, keyed by
//! child layer id, and only ids point across it (`startId`, `endId`). Parent,
//! layer and ordinal are implied by position and never written.

use super::document::{AnchorDocument, Entries, GraphDocument, DOCUMENT_KEYS};
use crate::errors::Result;
use crate::features::graph::Graph;
use crate::shared::models::{AnchorHandle, AnnotationHandle, Attributes};
use serde_json::Value;
use tracing::warn;

impl Graph {
    /// Build the serialized form of this graph
    ///
    /// Anchors come out in insertion order. Graph-scope lists and child
    /// lists come out in the order they were registered (document order for
    /// decoded graphs), each list in sibling order.
    pub fn to_serialized(&self) -> GraphDocument {
        let mut anchors = Entries::new();
        for (_, anchor) in self.anchors().iter() {
            anchors.push(
                anchor.id(),
                AnchorDocument {
                    offset: anchor.offset(),
                    rest: anchor.extra().clone(),
                },
            );
        }

        let mut rest = Attributes::new();
        for (layer, list) in self.top_level_lists() {
            if let Some(def) = self.schema().get(layer) {
                rest.insert(def.id().to_string(), self.encode_list(list));
            }
        }
        for (key, value) in self.extra() {
            if DOCUMENT_KEYS.contains(&key.as_str()) {
                warn!("Dropping graph attribute '{}': the key is reserved", key);
                continue;
            }
            // annotation arrays win over extras that reuse a layer id
            rest.entry(key.clone()).or_insert_with(|| value.clone());
        }

        GraphDocument {
            id: self.id().map(str::to_string),
            schema: self.schema().to_document(),
            anchors,
            rest,
        }
    }

    pub fn to_json_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_serialized())?)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let doc = self.to_serialized();
        let json = if pretty {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_json::to_string(&doc)?
        };
        Ok(json)
    }

    fn encode_list(&self, list: &[AnnotationHandle]) -> Value {
        Value::Array(list.iter().filter_map(|h| self.encode_record(*h)).collect())
    }

    fn encode_record(&self, handle: AnnotationHandle) -> Option<Value> {
        let annotation = self.annotation(handle)?.data();
        let mut record = Attributes::new();
        record.insert("id".into(), annotation.id().into());
        record.insert("label".into(), annotation.label().into());
        if let Some(id) = self.anchor_id(annotation.start()) {
            record.insert("startId".into(), id.into());
        }
        if let Some(id) = self.anchor_id(annotation.end()) {
            record.insert("endId".into(), id.into());
        }
        for (key, value) in annotation.extra() {
            record.entry(key.clone()).or_insert_with(|| value.clone());
        }
        for layer in annotation.child_layers() {
            let (Some(def), Some(list)) = (self.schema().get(layer), annotation.child_list(layer))
            else {
                continue;
            };
            record.insert(def.id().to_string(), self.encode_list(list));
        }
        Some(Value::Object(record))
    }

    fn anchor_id(&self, handle: Option<AnchorHandle>) -> Option<&str> {
        handle
            .and_then(|h| self.anchors().get(h))
            .map(|a| a.id())
    }
}
