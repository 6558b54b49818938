//! Benchmark fixtures for barwatch.

use async_trait::async_trait;
use barwatch_lib::{
    Bar, FetchError, MinuteOfDay, RawSnapshot, RollingWindowStore, StoreError, Symbol,
    SnapshotProvider, WindowPolicy,
};
use serde_json::json;

/// Epoch milliseconds of 2024-01-15 09:30 UTC.
pub const SESSION_OPEN_MS: i64 = 1_705_311_000_000;

/// Returns `count` tickers named `T0000`, `T0001`, ...
pub fn tickers(count: usize) -> Vec<Symbol> {
    (0..count).map(|i| Symbol::new(format!("T{i:04}"))).collect()
}

/// Generates `minutes` consecutive bars for one ticker, starting at 09:30.
///
/// Prices follow a deterministic zig-zag so the range ratio is never flat.
pub fn synthetic_bars(ticker: &Symbol, minutes: usize) -> Vec<Bar> {
    let open = MinuteOfDay::from_hm(9, 30).unwrap_or(MinuteOfDay::MIDNIGHT);
    MinuteOfDay::range(open, MinuteOfDay::LAST)
        .take(minutes)
        .enumerate()
        .map(|(i, minute)| {
            let base = 100.0 + (i % 7) as f64 - (i % 3) as f64 * 0.5;
            Bar::new(
                ticker.clone(),
                minute,
                base,
                base + 0.25,
                base + 1.0 + (i % 5) as f64 * 0.1,
                base - 1.0,
                1_000.0 + i as f64,
            )
        })
        .collect()
}

/// Opens an in-memory store and records `minutes` bars for every ticker.
///
/// # Errors
///
/// Returns an error if the store cannot be created or written.
pub fn seeded_store(tickers: &[Symbol], minutes: usize) -> Result<RollingWindowStore, StoreError> {
    let store = RollingWindowStore::open_in_memory()?;
    store.init_schema()?;
    for ticker in tickers {
        for bar in synthetic_bars(ticker, minutes) {
            store.record_bar(&bar, WindowPolicy::Inclusive)?;
        }
    }
    Ok(store)
}

/// Provider answering every ticker with the same well-formed minute bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProvider;

#[async_trait]
impl SnapshotProvider for StaticProvider {
    async fn snapshots(&self, symbols: &[Symbol]) -> Result<Vec<RawSnapshot>, FetchError> {
        Ok(symbols
            .iter()
            .map(|s| {
                let min = json!({
                    "o": 100.0, "c": 100.5, "h": 101.0, "l": 99.5,
                    "v": 1_500.0, "t": SESSION_OPEN_MS,
                });
                RawSnapshot::new(s.as_str(), Some(min))
            })
            .collect())
    }
}
