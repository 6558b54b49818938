//! Per-batch unit of work.

use std::sync::Arc;

use barwatch_fetch::{SnapshotProvider, validate_snapshot};
use barwatch_indicators::WindowPolicy;
use barwatch_store::{RecordOutcome, RollingWindowStore};
use barwatch_types::{Bar, Clock, Symbol};

/// What happened to one batch in one round.
///
/// A batch never fails its round: provider and store errors end up in
/// [`BatchOutcome::error`] and the remaining batches carry on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Position of the batch within its round.
    pub batch_index: usize,
    /// Number of tickers requested.
    pub symbols: usize,
    /// Rows written to the store.
    pub stored: usize,
    /// Bars whose minute was already stored.
    pub duplicates: usize,
    /// Snapshots without a well-formed minute bar.
    pub skipped: usize,
    /// Last error met while processing the batch.
    pub error: Option<String>,
}

impl BatchOutcome {
    /// Creates an empty outcome for a batch.
    #[must_use]
    pub const fn new(batch_index: usize, symbols: usize) -> Self {
        Self {
            batch_index,
            symbols,
            stored: 0,
            duplicates: 0,
            skipped: 0,
            error: None,
        }
    }

    /// Returns true if no error was met.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetches one batch from the provider and records its bars.
///
/// Cloning is cheap; every clone shares the provider and the store.
#[derive(Clone)]
pub struct BatchWorker {
    provider: Arc<dyn SnapshotProvider>,
    store: RollingWindowStore,
    clock: Clock,
}

impl std::fmt::Debug for BatchWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchWorker")
            .field("store", &self.store)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl BatchWorker {
    /// Creates a worker over a shared provider and store.
    #[must_use]
    pub fn new(provider: Arc<dyn SnapshotProvider>, store: RollingWindowStore, clock: Clock) -> Self {
        Self {
            provider,
            store,
            clock,
        }
    }

    /// Processes one batch.
    ///
    /// The network call runs on the async executor; the store writes run on
    /// the blocking pool, each bar as one locked read-compute-write unit.
    pub async fn process(&self, batch_index: usize, batch: Vec<Symbol>) -> BatchOutcome {
        let mut outcome = BatchOutcome::new(batch_index, batch.len());

        let snapshots = match self.provider.snapshots(&batch).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::warn!(batch = batch_index, error = %e, "Error fetching data for batch");
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        let bars: Vec<Bar> = snapshots
            .iter()
            .filter_map(|snapshot| validate_snapshot(snapshot, self.clock))
            .collect();
        outcome.skipped = snapshots.len() - bars.len();

        if bars.is_empty() {
            tracing::debug!(batch = batch_index, skipped = outcome.skipped, "No valid bars in batch");
            return outcome;
        }

        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || record_bars(&store, &bars, outcome)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(batch = batch_index, error = %e, "Store task failed");
                let mut outcome = BatchOutcome::new(batch_index, batch.len());
                outcome.error = Some(format!("store task failed: {e}"));
                outcome
            }
        }
    }
}

fn record_bars(store: &RollingWindowStore, bars: &[Bar], mut outcome: BatchOutcome) -> BatchOutcome {
    for bar in bars {
        match store.record_bar(bar, WindowPolicy::Inclusive) {
            Ok(RecordOutcome::Inserted(row)) => {
                outcome.stored += 1;
                tracing::debug!(
                    ticker = %row.ticker(),
                    timestamp = %row.timestamp(),
                    sma_21 = ?row.sma_21,
                    range_ratio = ?row.range_ratio,
                    "Stored row"
                );
            }
            Ok(RecordOutcome::Duplicate) => outcome.duplicates += 1,
            Err(e) => {
                tracing::warn!(
                    batch = outcome.batch_index,
                    ticker = %bar.ticker,
                    error = %e,
                    "Error while recording bar"
                );
                outcome.error = Some(e.to_string());
            }
        }
    }

    if outcome.stored > 0 {
        tracing::info!(
            batch = outcome.batch_index,
            stored = outcome.stored,
            "Inserted records for batch"
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, minute_json};
    use barwatch_types::MinuteOfDay;

    fn store() -> RollingWindowStore {
        let store = RollingWindowStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    fn worker(provider: ScriptedProvider, store: &RollingWindowStore) -> BatchWorker {
        BatchWorker::new(Arc::new(provider), store.clone(), Clock::Utc)
    }

    #[tokio::test]
    async fn test_process_stores_valid_bars() {
        let store = store();
        let provider = ScriptedProvider::new()
            .with_minute("AAA", minute_json(10.0, 10.5, 11.0, 9.5, 14, 37))
            .with_minute("BBB", minute_json(20.0, 20.5, 21.0, 19.5, 14, 37));

        let outcome = worker(provider, &store)
            .process(0, vec![Symbol::new("AAA"), Symbol::new("BBB")])
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.stored, 2);
        assert_eq!(outcome.skipped, 0);
        let row = store
            .get(&Symbol::new("AAA"), MinuteOfDay::new(1437).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(row.sma_21, Some(10.5));
        assert_eq!(row.range_ratio, None);
    }

    #[tokio::test]
    async fn test_process_skips_malformed_snapshots() {
        let store = store();
        let provider = ScriptedProvider::new()
            .with_minute("AAA", minute_json(10.0, 10.5, 11.0, 9.5, 14, 37))
            .with_minute("BBB", serde_json::json!({"o": "n/a", "c": 1.0}))
            .with_missing("CCC");

        let outcome = worker(provider, &store)
            .process(
                3,
                vec![Symbol::new("AAA"), Symbol::new("BBB"), Symbol::new("CCC")],
            )
            .await;

        assert_eq!(outcome.batch_index, 3);
        assert_eq!(outcome.stored, 1);
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.is_success());
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_process_contains_provider_errors() {
        let store = store();
        let provider = ScriptedProvider::new().with_failure("AAA");

        let outcome = worker(provider, &store)
            .process(1, vec![Symbol::new("AAA")])
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.stored, 0);
        assert_eq!(store.row_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_refetch_same_minute_is_duplicate() {
        let store = store();
        let provider =
            ScriptedProvider::new().with_minute("AAA", minute_json(10.0, 10.5, 11.0, 9.5, 14, 37));
        let worker = worker(provider, &store);

        let first = worker.process(0, vec![Symbol::new("AAA")]).await;
        let second = worker.process(0, vec![Symbol::new("AAA")]).await;

        assert_eq!(first.stored, 1);
        assert_eq!(second.stored, 0);
        assert_eq!(second.duplicates, 1);
        assert_eq!(store.row_count().unwrap(), 1);
    }
}
