//! Decode and offset-query benchmarks
//!
//! Synthetic transcripts: N turns of 20 words each, every word tagged.

use agraph_core::{Alignment, Graph, NewAnnotation};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::Value;

const WORDS_PER_TURN: usize = 20;

fn transcript(turns: usize) -> Graph {
    let mut g = Graph::new("bench.trs");
    g.add_layer("turn", "transcript", Alignment::Interval).unwrap();
    g.add_layer("word", "turn", Alignment::Interval).unwrap();
    g.add_layer("pos", "word", Alignment::None).unwrap();

    let mut anchors = Vec::with_capacity(turns * WORDS_PER_TURN + 1);
    for i in 0..=turns * WORDS_PER_TURN {
        anchors.push(g.create_anchor(Some(i as f64 * 0.25)).unwrap());
    }
    for t in 0..turns {
        let first = t * WORDS_PER_TURN;
        let turn = g
            .add_annotation(
                NewAnnotation::new("turn", "spk")
                    .anchored(anchors[first], anchors[first + WORDS_PER_TURN]),
            )
            .unwrap();
        for w in first..first + WORDS_PER_TURN {
            let word = g
                .add_annotation(
                    NewAnnotation::new("word", format!("w{}", w))
                        .anchored(anchors[w], anchors[w + 1])
                        .parent(turn),
                )
                .unwrap();
            g.create_tag(word, "pos", "NN").unwrap();
        }
    }
    g
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for turns in [10, 100, 500] {
        let doc: Value = transcript(turns).to_json_value().unwrap();
        group.throughput(Throughput::Elements((turns * WORDS_PER_TURN * 2 + turns) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(turns), &doc, |b, doc| {
            b.iter(|| black_box(Graph::from_serialized(doc).unwrap()));
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let g = transcript(100);
    c.bench_function("encode_100_turns", |b| {
        b.iter(|| black_box(g.to_json_string(false).unwrap()));
    });
}

fn bench_annotations_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotations_at");

    for turns in [10, 100, 500] {
        let g = transcript(turns);
        let middle = (turns * WORDS_PER_TURN) as f64 * 0.125;
        group.bench_with_input(BenchmarkId::new("word", turns), &g, |b, g| {
            b.iter(|| black_box(g.annotations_at(black_box(middle), Some("word")).unwrap().len()));
        });
        group.bench_with_input(BenchmarkId::new("all_layers", turns), &g, |b, g| {
            b.iter(|| black_box(g.annotations_at(black_box(middle), None).unwrap().len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode, bench_annotations_at);
criterion_main!(benches);
