//! End-to-end scenarios over the transcript -> turn -> word -> pos sample

mod common;

use agraph_core::{Alignment, Graph, GraphConfig, NewAnnotation};
use common::{assert_consistent, ids, sample_document, sample_graph};
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════════
// Decode and query
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_words_at_offset() {
    let g = sample_graph();
    let found = g.annotations_at(0.5, Some("word")).unwrap();
    assert_eq!(ids(&found), vec!["W1"]);

    // half-open: the shared boundary belongs to the second word
    let found = g.annotations_at(1.0, Some("word")).unwrap();
    assert_eq!(ids(&found), vec!["W2"]);

    assert!(g.annotations_at(2.0, Some("word")).unwrap().is_empty());
}

#[test]
fn test_annotations_at_all_layers_in_schema_order() {
    let g = sample_graph();
    let found = g.annotations_at(1.5, None).unwrap();
    assert_eq!(ids(&found), vec!["T1", "W2"]);
}

#[test]
fn test_sibling_navigation() {
    let g = sample_graph();
    let w1 = g.annotation_by_id("W1").unwrap();
    let w2 = w1.next().unwrap();
    assert_eq!(w2.id(), "W2");
    assert_eq!(w2.previous(), Some(w1));
    assert!(w2.next().is_none());
    assert_eq!(w1.ordinal(), 1);
    assert_eq!(w2.ordinal(), 2);
}

#[test]
fn test_tag_a_word() {
    let mut g = sample_graph();
    let w1 = g.annotation_handle("W1").unwrap();
    let tag = g.create_tag(w1, "pos", "NN").unwrap();

    let tag = g.annotation(tag).unwrap();
    assert_eq!(tag.start().map(|a| a.id()), Some("a0"));
    assert_eq!(tag.end().map(|a| a.id()), Some("a1"));
    assert_eq!(tag.parent().map(|p| p.id()), Some("W1"));
    assert_eq!(tag.label(), "NN");

    let w1 = g.annotation_by_id("W1").unwrap();
    assert_eq!(w1.first("pos").map(|t| t.label()), Some("NN"));
    assert_eq!(ids(&w1.tags_on("pos")), vec![tag.id().to_string()]);
    assert_consistent(&g);
}

#[test]
fn test_first_and_all_walk_up_and_down() {
    let g = sample_graph();
    let w2 = g.annotation_by_id("W2").unwrap();
    assert_eq!(w2.first("turn").map(|t| t.id()), Some("T1"));
    assert_eq!(w2.first("word"), Some(w2));
    assert!(w2.first("pos").is_none());

    let t1 = g.annotation_by_id("T1").unwrap();
    assert_eq!(ids(&t1.all("word")), vec!["W1", "W2"]);
    assert_eq!(g.first("word").map(|w| w.id()), Some("W1"));
    assert_eq!(g.all("turn").len(), 1);
}

#[test]
fn test_labels_and_conventions() {
    let g = sample_graph();
    assert_eq!(g.labels("word").unwrap(), vec!["hello", "world"]);
    assert_eq!(g.schema().turn_layer().map(|l| l.id()), Some("turn"));
    assert_eq!(g.schema().word_layer().map(|l| l.id()), Some("word"));
    assert!(g.schema().is_descendant_of("pos", "turn"));
    assert!(!g.schema().is_descendant_of("turn", "turn"));
}

#[test]
fn test_interval_relations() {
    let g = sample_graph();
    let t1 = g.annotation_by_id("T1").unwrap();
    let w1 = g.annotation_by_id("W1").unwrap();
    let w2 = g.annotation_by_id("W2").unwrap();

    assert!(t1.includes(&w1));
    assert!(t1.includes(&w2));
    assert!(!w1.includes(&t1));
    assert!(w1.predecessor_of(&w2));
    assert!(w2.successor_of(&w1));
    assert!(!w1.overlaps(&w2));
    assert!(t1.overlaps(&w2));
    assert!(t1.starts_with(&w1));
    assert!(t1.ends_with(&w2));
    assert_eq!(t1.duration(), Some(2.0));
    assert_eq!(w2.midpoint(), Some(1.5));
    assert!(t1.includes_midpoint_of(&w1));
    assert_eq!(ids(&w1.shares_start("turn")), vec!["T1"]);
    assert_eq!(ids(&w2.shares_end("turn")), vec!["T1"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Building and editing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_build_transcript_from_scratch() {
    let mut g = Graph::new("built.trs");
    g.add_layer("turn", "transcript", Alignment::Interval).unwrap();
    g.add_layer("word", "turn", Alignment::Interval).unwrap();
    g.add_layer("pos", "word", Alignment::None).unwrap();
    g.add_layer("phone", "word", Alignment::Instant).unwrap();

    let a0 = g.create_anchor(Some(0.0)).unwrap();
    let a1 = g.create_anchor(Some(0.4)).unwrap();
    let a2 = g.create_anchor(Some(0.9)).unwrap();
    let turn = g
        .add_annotation(NewAnnotation::new("turn", "spk").anchored(a0, a2))
        .unwrap();
    let w1 = g
        .add_annotation(NewAnnotation::new("word", "good").anchored(a0, a1).parent(turn))
        .unwrap();
    let w2 = g
        .add_annotation(NewAnnotation::new("word", "day").anchored(a1, a2).parent(turn))
        .unwrap();
    g.create_tag(w1, "pos", "JJ").unwrap();
    g.create_tag(w2, "pos", "NN").unwrap();
    let beat = g
        .add_annotation(NewAnnotation::new("phone", "g").start(a0).parent(w1))
        .unwrap();

    assert!(g.annotation(beat).unwrap().instantaneous());
    assert_eq!(g.labels("pos").unwrap(), vec!["JJ", "NN"]);
    assert!(g.validate().is_empty());
    assert_consistent(&g);

    let back = Graph::from_serialized(&g.to_json_value().unwrap()).unwrap();
    assert_eq!(back.to_json_value().unwrap(), g.to_json_value().unwrap());
    assert_consistent(&back);
}

#[test]
fn test_span_over_words() {
    let mut g = sample_graph();
    g.add_layer("phrase", "turn", Alignment::Interval).unwrap();
    let w1 = g.annotation_handle("W1").unwrap();
    let w2 = g.annotation_handle("W2").unwrap();
    let phrase = g.create_span(w1, w2, "phrase", "greeting").unwrap();

    let phrase = g.annotation(phrase).unwrap();
    assert_eq!(phrase.parent().map(|p| p.id()), Some("T1"));
    assert_eq!(phrase.start().map(|a| a.id()), Some("a0"));
    assert_eq!(phrase.end().map(|a| a.id()), Some("a2"));
    assert_consistent(&g);
}

#[test]
fn test_move_anchor_keeps_order() {
    let mut g = sample_graph();
    let a1 = g.anchor_by_id("a1").unwrap().handle();
    g.set_anchor_offset(a1, Some(1.25)).unwrap();
    assert_eq!(ids(&g.annotations_at(1.1, Some("word")).unwrap()), vec!["W1"]);

    // past a2 would put W2 backwards
    assert!(g.set_anchor_offset(a1, Some(2.5)).is_err());
    assert_eq!(g.anchor(a1).unwrap().offset(), Some(1.25));
}

#[test]
fn test_custom_root_and_prefix() {
    let mut doc = sample_document();
    let schema = doc["schema"].as_object_mut().unwrap();
    let root = schema.shift_remove("transcript").unwrap();
    schema.insert("episode".to_string(), root);

    let config = GraphConfig::default()
        .with_root_layer("episode")
        .with_id_prefix("n");
    let mut g = Graph::from_serialized_with(&doc, config).unwrap();
    assert_eq!(g.schema().root().id(), "episode");

    let w2 = g.annotation_handle("W2").unwrap();
    let tag = g.create_tag(w2, "pos", "NN").unwrap();
    assert_eq!(g.annotation(tag).unwrap().id(), "n1");
}
