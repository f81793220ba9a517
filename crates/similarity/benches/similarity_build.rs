//! Benchmarks for the similarity engine
//!
//! Run with: cargo bench --package similarity
//!
//! Uses a synthetic corpus so it runs without the dataset.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{Corpus, MovieRecord};
use similarity::EngineBuilder;
use std::sync::Arc;

const WORDS: &[&str] = &[
    "space", "battle", "family", "reunion", "heist", "ocean", "storm", "detective",
    "murder", "village", "dragon", "kingdom", "robot", "colony", "wedding", "war",
    "fleet", "secret", "journey", "revenge", "island", "prison", "escape", "music",
];
const GENRES: &[&str] = &["Action", "Drama", "Comedy", "Science Fiction", "Romance", "Horror"];

fn synthetic_corpus(n: usize) -> Arc<Corpus> {
    let movies = (0..n)
        .map(|i| {
            let overview: Vec<&str> = (0..12).map(|k| WORDS[(i * 7 + k * 5) % WORDS.len()]).collect();
            MovieRecord::new(i as u32, format!("Movie {}", i))
                .with_overview(overview.join(" "))
                .with_genres([GENRES[i % GENRES.len()], GENRES[(i / 3) % GENRES.len()]])
        })
        .collect();
    Arc::new(Corpus::from_records(movies).expect("synthetic ids are unique"))
}

fn bench_build(c: &mut Criterion) {
    let corpus = synthetic_corpus(1000);

    c.bench_function("engine_build_1000", |b| {
        b.iter(|| {
            let engine = EngineBuilder::new(black_box(corpus.clone())).build().unwrap();
            black_box(engine)
        })
    });
}

fn bench_recommend(c: &mut Criterion) {
    let engine = EngineBuilder::new(synthetic_corpus(2000)).build().unwrap();

    c.bench_function("recommend_top10", |b| {
        b.iter(|| {
            let recs = engine.recommend(black_box("Movie 42"), black_box(10)).unwrap();
            black_box(recs)
        })
    });
}

criterion_group!(benches, bench_build, bench_recommend);
criterion_main!(benches);
