//! Indicator, store and round benchmarks.
//!
//! Run with: `cargo bench --package barwatch-bench`

use std::sync::Arc;
use std::time::Duration;

use barwatch_bench::{StaticProvider, seeded_store, synthetic_bars, tickers};
use barwatch_lib::{
    Clock, Pipeline, PipelineConfig, RollingWindowStore, SymbolList, WINDOW_LEN, WindowPolicy,
    compute_indicators,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn indicator_benchmark(c: &mut Criterion) {
    let ticker = tickers(1).remove(0);
    let bars = synthetic_bars(&ticker, WINDOW_LEN + 1);
    let (current, history) = bars.split_last().unwrap();
    let closes: Vec<f64> = history.iter().rev().map(|b| b.close).collect();
    let points: Vec<_> = history.iter().rev().map(|b| b.window_point()).collect();

    let mut group = c.benchmark_group("indicators");
    for policy in [WindowPolicy::Inclusive, WindowPolicy::StrictPrior] {
        group.bench_with_input(
            BenchmarkId::new("compute", format!("{policy:?}")),
            &policy,
            |b, policy| b.iter(|| compute_indicators(current, &closes, &points, *policy)),
        );
    }
    group.finish();
}

fn record_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for history in [0usize, 21, 200] {
        let ticker = tickers(1);
        let store = seeded_store(&ticker, history).unwrap();
        let probe = synthetic_bars(&ticker[0], history + 1).pop().unwrap();

        group.bench_with_input(BenchmarkId::new("record_bar", history), &probe, |b, bar| {
            b.iter(|| {
                // Re-recording an existing minute only pays for the key check.
                let _ = store.record_bar(bar, WindowPolicy::Inclusive);
            });
        });

        group.bench_function(BenchmarkId::new("recent_high_low", history), |b| {
            b.iter(|| store.recent_high_low(&ticker[0], probe.timestamp, WINDOW_LEN));
        });
    }
    group.finish();
}

fn round_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("round");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for count in [60usize, 600] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("one_round", count), &count, |b, &count| {
            b.to_async(&runtime).iter(|| async move {
                let symbols = SymbolList::from_symbols(tickers(count)).unwrap();
                let store = RollingWindowStore::open_in_memory().unwrap();
                let config = PipelineConfig::default()
                    .with_rounds(1)
                    .with_round_interval(Duration::ZERO)
                    .with_clock(Clock::Utc);
                let mut pipeline = Pipeline::new(config, Arc::new(StaticProvider), store, symbols);
                pipeline.prepare().unwrap();
                pipeline.run(std::future::pending::<()>()).await.unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    indicator_benchmark,
    record_benchmark,
    round_benchmark
);
criterion_main!(benches);
