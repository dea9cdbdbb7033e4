//! Benchmarks for ticker matching and comment cleaning

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fd_sentiment::{
    ExclusionSet, MentionAggregator, TickerMatcher, Vocabulary, clean_text,
    vocabulary::{DEFAULT_EXCLUSIONS, DEFAULT_EXTRA_TICKERS},
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

const WORDS: &[&str] = &[
    "the", "stock", "is", "going", "to", "moon", "buy", "the", "dip", "calls", "puts", "earnings",
    "bagholder", "CEO", "IT", "rally", "crash", "$", "!!", "yolo", "hold", "sell", "now",
];

const TICKERS: &[&str] = &["AAPL", "TSLA", "NVDA", "MSFT", "AMZN", "$GME", "BTC.", "ETH,", "amd"];

fn matcher() -> TickerMatcher {
    let base = ["AAPL", "TSLA", "NVDA", "MSFT", "AMZN", "AMD", "META", "GOOG", "IT"];
    let vocabulary = Vocabulary::new(base.iter().chain(DEFAULT_EXTRA_TICKERS).copied());
    TickerMatcher::new(vocabulary, ExclusionSet::new(DEFAULT_EXCLUSIONS.iter().copied()))
}

fn comments(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(5..60);
            (0..len)
                .map(|_| {
                    let pool = if rng.gen_bool(0.1) { TICKERS } else { WORDS };
                    *pool.choose(&mut rng).unwrap_or(&"")
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn benchmark_extract(c: &mut Criterion) {
    let matcher = matcher();
    let sample = comments(1, 7).remove(0);

    c.bench_function("extract_single_comment", |b| {
        b.iter(|| matcher.extract(black_box(&sample)))
    });

    let mut group = c.benchmark_group("aggregate_batch");
    for size in [100, 1_000, 10_000].iter() {
        let batch = comments(*size, 42);
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| {
                let mut aggregator = MentionAggregator::new();
                for comment in batch {
                    aggregator.ingest(black_box(comment), &matcher);
                }
                aggregator.total_mentions()
            })
        });
    }
    group.finish();
}

fn benchmark_clean(c: &mut Criterion) {
    let batch = comments(100, 3);

    c.bench_function("clean_100_comments", |b| {
        b.iter(|| {
            batch
                .iter()
                .map(|comment| clean_text(black_box(comment)))
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, benchmark_extract, benchmark_clean);
criterion_main!(benches);
