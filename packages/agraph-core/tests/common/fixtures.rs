//! Sample documents and graphs

use agraph_core::{AnnotationRef, Graph};
use serde_json::{json, Value};

/// transcript -> turn -> word -> pos (tag), two words over three anchors
pub fn sample_document() -> Value {
    json!({
        "id": "sample.trs",
        "schema": {
            "transcript": { "alignment": 2, "children": {
                "turn": { "alignment": 2, "children": {
                    "word": { "alignment": 2, "children": {
                        "pos": { "alignment": 0 }
                    } }
                } }
            } },
            "turnLayerId": "turn",
            "wordLayerId": "word"
        },
        "anchors": {
            "a0": { "offset": 0.0 },
            "a1": { "offset": 1.0 },
            "a2": { "offset": 2.0 }
        },
        "turn": [{
            "id": "T1", "label": "speaker-1", "startId": "a0", "endId": "a2",
            "word": [
                { "id": "W1", "label": "hello", "startId": "a0", "endId": "a1" },
                { "id": "W2", "label": "world", "startId": "a1", "endId": "a2" }
            ]
        }]
    })
}

pub fn sample_graph() -> Graph {
    Graph::from_serialized(&sample_document()).expect("sample document decodes")
}

pub fn ids(refs: &[AnnotationRef<'_>]) -> Vec<String> {
    refs.iter().map(|a| a.id().to_string()).collect()
}
