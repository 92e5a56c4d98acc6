//! Random edit sequences for property tests

use agraph_core::{Alignment, Graph, NewAnnotation, Result};
use proptest::prelude::*;

/// One edit against the layered test graph
///
/// Indexes pick among the annotations already on the relevant layer (modulo
/// its size); offsets are in quarter seconds.
#[derive(Debug, Clone)]
pub enum Op {
    Turn { start: u8, len: u8 },
    Word { turn: usize, start: u8, len: u8 },
    Tag { word: usize },
    Phone { word: usize },
    Span { from: usize, to: usize },
    Move { anchor: usize, offset: u8 },
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (0u8..16, 0u8..8).prop_map(|(start, len)| Op::Turn { start, len }),
        4 => (any::<usize>(), 0u8..16, 0u8..4)
            .prop_map(|(turn, start, len)| Op::Word { turn, start, len }),
        2 => any::<usize>().prop_map(|word| Op::Tag { word }),
        1 => any::<usize>().prop_map(|word| Op::Phone { word }),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(from, to)| Op::Span { from, to }),
        1 => (any::<usize>(), 0u8..24).prop_map(|(anchor, offset)| Op::Move { anchor, offset }),
    ]
}

pub fn ops_strategy(max: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..max)
}

/// transcript -> turn -> {word -> {pos (tag), phone (instant)}, phrase}
pub fn layered_graph() -> Graph {
    let mut g = Graph::new("generated");
    let layers = [
        ("turn", "transcript", Alignment::Interval),
        ("word", "turn", Alignment::Interval),
        ("pos", "word", Alignment::None),
        ("phone", "word", Alignment::Instant),
        ("phrase", "turn", Alignment::Interval),
    ];
    for (id, parent, alignment) in layers {
        g.add_layer(id, parent, alignment).expect("fresh layer");
    }
    g
}

fn pick(g: &Graph, layer: &str, index: usize) -> Option<agraph_core::AnnotationHandle> {
    let all = g.all(layer);
    if all.is_empty() {
        None
    } else {
        Some(all[index % all.len()].handle())
    }
}

fn at(offset: u8) -> f64 {
    offset as f64 / 4.0
}

/// Apply one edit; `Ok(false)` when the op had nothing to act on
pub fn apply(g: &mut Graph, op: &Op) -> Result<bool> {
    match *op {
        Op::Turn { start, len } => {
            let a = g.get_or_create_anchor_at(at(start))?;
            let b = g.get_or_create_anchor_at(at(start + len))?;
            g.add_annotation(NewAnnotation::new("turn", format!("turn{}", start)).anchored(a, b))?;
        }
        Op::Word { turn, start, len } => {
            let Some(turn) = pick(g, "turn", turn) else {
                return Ok(false);
            };
            let a = g.get_or_create_anchor_at(at(start))?;
            let b = g.get_or_create_anchor_at(at(start + len))?;
            g.add_annotation(
                NewAnnotation::new("word", format!("w{}", start))
                    .anchored(a, b)
                    .parent(turn)
                    .attribute("confidence", len as u64),
            )?;
        }
        Op::Tag { word } => {
            let Some(word) = pick(g, "word", word) else {
                return Ok(false);
            };
            g.create_tag(word, "pos", "NN")?;
        }
        Op::Phone { word } => {
            let Some(handle) = pick(g, "word", word) else {
                return Ok(false);
            };
            let start = g.annotation(handle).and_then(|w| w.data().start());
            let mut request = NewAnnotation::new("phone", "p").parent(handle);
            request.start = start;
            g.add_annotation(request)?;
        }
        Op::Span { from, to } => {
            let (Some(from), Some(to)) = (pick(g, "word", from), pick(g, "word", to)) else {
                return Ok(false);
            };
            g.create_span(from, to, "phrase", "np")?;
        }
        Op::Move { anchor, offset } => {
            if g.anchors().is_empty() {
                return Ok(false);
            }
            let handle = g
                .anchors()
                .iter()
                .nth(anchor % g.anchors().len())
                .map(|(h, _)| h)
                .expect("index in range");
            g.set_anchor_offset(handle, Some(at(offset)))?;
        }
    }
    Ok(true)
}

/// Build a graph from a sequence of edits, skipping the ones that fail
pub fn build(ops: &[Op]) -> Graph {
    let mut g = layered_graph();
    for op in ops {
        let _ = apply(&mut g, op);
    }
    g
}
