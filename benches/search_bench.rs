//! Micro-benchmarks for exact and prefix search over a synthetic index.

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quarry::InvertedIndex;

/// Deterministic synthetic corpus: `docs` locations, each with `tokens`
/// positions drawn from a fixed vocabulary of three-letter combinations.
fn synthetic_index(docs: usize, tokens: usize) -> InvertedIndex {
    let vocabulary: Vec<String> = ('a'..='e')
        .flat_map(|a| ('a'..='e').flat_map(move |b| ('a'..='e').map(move |c| format!("{a}{b}{c}"))))
        .collect();

    let mut index = InvertedIndex::new();
    for doc in 0..docs {
        let location = format!("/doc{doc:04}.txt");
        for position in 1..=tokens {
            let word = &vocabulary[(doc * 31 + position * 7) % vocabulary.len()];
            index.add(word, &location, position);
        }
    }
    index
}

fn bench_search(c: &mut Criterion) {
    let index = synthetic_index(500, 200);
    let exact: BTreeSet<String> = ["abc".to_string(), "cde".to_string()].into();
    let prefix: BTreeSet<String> = ["ab".to_string()].into();

    c.bench_function("exact_search/2stems_500docs", |b| {
        b.iter(|| black_box(index.exact_search(black_box(&exact))))
    });

    c.bench_function("partial_search/1prefix_500docs", |b| {
        b.iter(|| black_box(index.partial_search(black_box(&prefix))))
    });
}

fn bench_merge(c: &mut Criterion) {
    c.bench_function("add_all/100doc_locals", |b| {
        b.iter_with_setup(
            || {
                let shared = synthetic_index(100, 100);
                let local = synthetic_index(10, 100);
                (shared, local)
            },
            |(mut shared, local)| {
                shared.add_all(local);
                black_box(shared)
            },
        )
    });
}

criterion_group!(benches, bench_search, bench_merge);
criterion_main!(benches);
