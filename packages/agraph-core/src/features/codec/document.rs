//! Serialized document types
//!
//! Plain serde structs for the JSON exchange format. They hold no handles and
//! no back references; `decode` turns them into a live `Graph` and `encode`
//! builds them back from one.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

/// Keys that are recomputed on decode and never stored on annotation records
pub const DERIVED_RECORD_KEYS: &[&str] = &["layerId", "parentId", "ordinal", "graphId"];

/// Keys every annotation record carries for itself
pub const RECORD_KEYS: &[&str] = &["id", "label", "startId", "endId"];

/// Keys of the top-level graph object
pub const DOCUMENT_KEYS: &[&str] = &["id", "schema", "anchors"];

/// True when `key` is claimed by the record format itself
///
/// Such a key can be neither an annotation attribute nor a layer id, since
/// child annotation arrays live next to attributes on the parent record.
pub fn is_reserved_record_key(key: &str) -> bool {
    RECORD_KEYS.contains(&key) || DERIVED_RECORD_KEYS.contains(&key)
}

/// True when `id` cannot name a layer
///
/// Root annotations sit next to `schema` and `anchors` at the top level, and
/// every other layer shares its parent record with the record keys.
pub fn is_reserved_layer_id(id: &str) -> bool {
    is_reserved_record_key(id) || DOCUMENT_KEYS.contains(&id)
}

/// Keys that are recomputed on decode and never stored on anchors
pub const DERIVED_ANCHOR_KEYS: &[&str] = &["id", "startOf", "endOf"];

/// Keys that are recomputed on decode and never stored on layer definitions
pub const DERIVED_LAYER_KEYS: &[&str] = &["id", "parentId"];

/// A JSON object read as an ordered list of typed entries
///
/// Keeps document key order, and keeps repeated keys so they can be reported
/// instead of silently overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<T>(pub Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Entries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: T) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<T> IntoIterator for Entries<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T: Serialize> Serialize for Entries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// A whole serialized graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub schema: SchemaDocument,

    #[serde(default)]
    pub anchors: Entries<AnchorDocument>,

    /// Top-level annotation arrays (keyed by layer id) and preserved extras
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// The `schema` fragment: the root layer definition plus convention keys
/// such as `"turnLayerId": "turn"`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    pub entries: Map<String, Value>,
}

/// One layer definition with its nested child layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 0 = none, 1 = instant, 2 = interval; absent means interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers_overlap: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_includes: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated: Option<bool>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_labels: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Entries::is_empty")]
    pub children: Entries<LayerDocument>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One anchor, keyed by its id in `GraphDocument::anchors`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One annotation record inside a layer array
///
/// Nested child arrays stay in `rest` under their layer ids; which keys are
/// child arrays is decided by the schema, not by the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_id: Option<String>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_entries_keep_key_order() {
        let entries: Entries<u32> = serde_json::from_str(r#"{"b": 1, "a": 2, "c": 3}"#).unwrap();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(entries.get("a"), Some(&2));

        let back = serde_json::to_string(&entries).unwrap();
        assert_eq!(back, r#"{"b":1,"a":2,"c":3}"#);
    }

    #[test]
    fn test_entries_keep_repeated_keys() {
        let entries: Entries<u32> = serde_json::from_str(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_record_field_names() {
        let record: AnnotationRecord = serde_json::from_value(json!({
            "id": "w1",
            "label": "hello",
            "startId": "a0",
            "endId": "a1",
            "confidence": 50,
            "pos": []
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("w1"));
        assert_eq!(record.start_id.as_deref(), Some("a0"));
        assert_eq!(record.end_id.as_deref(), Some("a1"));
        assert_eq!(record.rest.len(), 2);
        assert!(record.rest["pos"].is_array());
    }

    #[test]
    fn test_reserved_names() {
        for key in ["id", "label", "startId", "endId", "layerId", "parentId", "ordinal", "graphId"] {
            assert!(is_reserved_record_key(key), "{key}");
            assert!(is_reserved_layer_id(key), "{key}");
        }
        assert!(is_reserved_layer_id("schema"));
        assert!(is_reserved_layer_id("anchors"));
        assert!(!is_reserved_record_key("anchors"));
        assert!(!is_reserved_record_key("confidence"));
        assert!(!is_reserved_layer_id("word"));
    }

    #[test]
    fn test_layer_document_metadata() {
        let layer: LayerDocument = serde_json::from_value(json!({
            "alignment": 0,
            "peersOverlap": false,
            "type": "string",
            "validLabels": { "NN": "noun" },
            "colour": "red"
        }))
        .unwrap();

        assert_eq!(layer.alignment, Some(0));
        assert_eq!(layer.peers_overlap, Some(false));
        assert_eq!(layer.layer_type.as_deref(), Some("string"));
        assert_eq!(layer.rest["colour"], "red");
        assert!(layer.children.is_empty());

        let value = serde_json::to_value(&layer).unwrap();
        assert!(value.get("children").is_none());
        assert_eq!(value["type"], "string");
    }

    #[test]
    fn test_anchor_document_null_offset() {
        let anchor: AnchorDocument =
            serde_json::from_value(json!({ "offset": null, "confidence": 10 })).unwrap();
        assert_eq!(anchor.offset, None);
        assert_eq!(anchor.rest["confidence"], 10);

        let value = serde_json::to_value(&anchor).unwrap();
        assert_eq!(value, json!({ "confidence": 10 }));
    }

    #[test]
    fn test_graph_document_splits_rest() {
        let doc: GraphDocument = serde_json::from_value(json!({
            "id": "g",
            "schema": { "transcript": {} },
            "anchors": { "a0": { "offset": 0.0 } },
            "turn": [],
            "corpus": "demo"
        }))
        .unwrap();

        assert_eq!(doc.id.as_deref(), Some("g"));
        assert_eq!(doc.anchors.len(), 1);
        assert_eq!(doc.rest.len(), 2);
        assert_eq!(doc.rest["corpus"], "demo");
    }
}
