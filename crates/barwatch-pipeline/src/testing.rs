//! Scripted snapshot provider for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use barwatch_fetch::{FetchError, RawSnapshot, SnapshotProvider};
use barwatch_types::Symbol;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

/// Builds a provider minute object stamped 2024-01-15 `hour:minute` UTC.
pub(crate) fn minute_json(o: f64, c: f64, h: f64, l: f64, hour: u32, minute: u32) -> Value {
    let t = Utc
        .with_ymd_and_hms(2024, 1, 15, hour, minute, 0)
        .unwrap()
        .timestamp_millis();
    json!({"o": o, "c": c, "h": h, "l": l, "v": 1000.0, "t": t})
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedProvider {
    minutes: HashMap<String, Option<Value>>,
    failing: HashSet<String>,
    stalled: bool,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_minute(mut self, ticker: &str, minute: Value) -> Self {
        self.minutes.insert(ticker.to_string(), Some(minute));
        self
    }

    pub(crate) fn with_missing(mut self, ticker: &str) -> Self {
        self.minutes.insert(ticker.to_string(), None);
        self
    }

    /// Any batch containing `ticker` fails.
    pub(crate) fn with_failure(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    /// Every call waits forever.
    pub(crate) fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotProvider for ScriptedProvider {
    async fn snapshots(&self, symbols: &[Symbol]) -> Result<Vec<RawSnapshot>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled {
            std::future::pending::<()>().await;
        }
        if let Some(bad) = symbols.iter().find(|s| self.failing.contains(s.as_str())) {
            return Err(FetchError::Other(format!("scripted failure for {bad}")));
        }
        Ok(symbols
            .iter()
            .filter_map(|s| {
                self.minutes
                    .get(s.as_str())
                    .map(|min| RawSnapshot::new(s.as_str(), min.clone()))
            })
            .collect())
    }
}
