//! Round loop of the online pipeline.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use barwatch_fetch::SnapshotProvider;
use barwatch_format::OutputFormat;
use barwatch_store::RollingWindowStore;
use barwatch_symbols::{SymbolList, partition};
use barwatch_types::{BarwatchError, Clock, IndicatorRow, Result, Symbol};
use futures::stream::{self, StreamExt};

use crate::{BatchOutcome, BatchWorker};

/// Configuration for the online pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of batches fetched at once; also the batch count cap.
    pub max_workers: usize,
    /// Number of rounds to run.
    pub rounds: u32,
    /// Pause between two rounds.
    pub round_interval: Duration,
    /// Clock used to turn snapshot timestamps into minutes of the day.
    pub clock: Clock,
    /// Number of most recent rows attached to each round report.
    pub recent_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workers: 60,
            rounds: 5,
            round_interval: Duration::from_secs(60),
            clock: Clock::Local,
            recent_rows: 10,
        }
    }
}

impl PipelineConfig {
    /// Sets the worker cap.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Sets the number of rounds.
    #[must_use]
    pub const fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets the pause between rounds.
    #[must_use]
    pub const fn with_round_interval(mut self, round_interval: Duration) -> Self {
        self.round_interval = round_interval;
        self
    }

    /// Sets the clock.
    #[must_use]
    pub const fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Where the driver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Nothing done yet.
    #[default]
    Idle,
    /// The table was created fresh.
    SchemaReady,
    /// Round `n` (1-based) is fetching.
    RunningRound(u32),
    /// Pausing after round `n`.
    Sleeping(u32),
    /// Writing the final export.
    Exporting,
    /// Finished.
    Done,
}

/// Totals for one round.
#[derive(Debug, Clone, Default)]
pub struct RoundReport {
    /// Round number, 1-based.
    pub round: u32,
    /// Number of batches submitted.
    pub batches: usize,
    /// Rows written.
    pub stored: usize,
    /// Bars already present in the store.
    pub duplicates: usize,
    /// Snapshots without a usable minute bar.
    pub skipped: usize,
    /// Batches that met an error.
    pub failed_batches: usize,
    /// Wall time of the round.
    pub elapsed: Duration,
    /// Most recent rows in the store once the round finished.
    pub recent: Vec<IndicatorRow>,
}

impl RoundReport {
    fn from_outcomes(round: u32, outcomes: &[BatchOutcome], elapsed: Duration) -> Self {
        Self {
            round,
            batches: outcomes.len(),
            stored: outcomes.iter().map(|o| o.stored).sum(),
            duplicates: outcomes.iter().map(|o| o.duplicates).sum(),
            skipped: outcomes.iter().map(|o| o.skipped).sum(),
            failed_batches: outcomes.iter().filter(|o| !o.is_success()).count(),
            elapsed,
            recent: Vec::new(),
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Rounds that ran to completion.
    pub rounds_completed: u32,
    /// True if the shutdown signal ended the run early.
    pub interrupted: bool,
    /// One report per completed round.
    pub reports: Vec<RoundReport>,
}

impl RunSummary {
    /// Returns the number of rows written across all rounds.
    #[must_use]
    pub fn total_stored(&self) -> usize {
        self.reports.iter().map(|r| r.stored).sum()
    }
}

/// The online pipeline driver.
///
/// Lifecycle: [`Pipeline::prepare`], then [`Pipeline::run`] (or
/// [`Pipeline::run_with`]), then [`Pipeline::export`].
pub struct Pipeline {
    config: PipelineConfig,
    symbols: SymbolList,
    store: RollingWindowStore,
    worker: BatchWorker,
    state: DriverState,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("symbols", &self.symbols.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a driver over a provider, a store and a symbol list.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        provider: Arc<dyn SnapshotProvider>,
        store: RollingWindowStore,
        symbols: SymbolList,
    ) -> Self {
        let worker = BatchWorker::new(provider, store.clone(), config.clock);
        Self {
            config,
            symbols,
            store,
            worker,
            state: DriverState::Idle,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the shared store.
    #[must_use]
    pub const fn store(&self) -> &RollingWindowStore {
        &self.store
    }

    /// Returns the number of batches each round submits.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the worker cap is zero.
    pub fn batch_count(&self) -> Result<usize> {
        Ok(partition(self.symbols.as_slice(), self.config.max_workers)?.len())
    }

    /// Creates the table fresh, discarding any previous rows.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero worker cap, or a schema error
    /// if the table cannot be created. Both are fatal.
    pub fn prepare(&mut self) -> Result<()> {
        self.batch_count()?;
        self.store.init_schema()?;
        self.state = DriverState::SchemaReady;
        Ok(())
    }

    /// Runs every round until done or until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Pipeline::prepare`] has not succeeded.
    pub async fn run<F: Future>(&mut self, shutdown: F) -> Result<RunSummary> {
        self.run_with(shutdown, |_| {}).await
    }

    /// Like [`Pipeline::run`], calling `observer` as each batch finishes.
    ///
    /// In-flight batches of an interrupted round are abandoned at their next
    /// await point; a bar already handed to the store still completes its
    /// write atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Pipeline::prepare`] has not succeeded.
    pub async fn run_with<F, O>(&mut self, shutdown: F, mut observer: O) -> Result<RunSummary>
    where
        F: Future,
        O: FnMut(&BatchOutcome),
    {
        if self.state != DriverState::SchemaReady {
            return Err(BarwatchError::Config(format!(
                "pipeline cannot run from state {:?}",
                self.state
            )));
        }

        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        for round in 1..=self.config.rounds {
            self.state = DriverState::RunningRound(round);
            tracing::info!(round, rounds = self.config.rounds, "Starting data fetch and processing");

            let report = tokio::select! {
                report = self.run_round(round, &mut observer) => Some(report?),
                _ = &mut shutdown => None,
            };
            let Some(report) = report else {
                tracing::info!(round, "Process interrupted, skipping remaining rounds");
                summary.interrupted = true;
                break;
            };

            tracing::info!(
                round,
                batches = report.batches,
                stored = report.stored,
                duplicates = report.duplicates,
                skipped = report.skipped,
                failed = report.failed_batches,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Round complete"
            );
            summary.rounds_completed = round;
            summary.reports.push(report);

            if round == self.config.rounds {
                break;
            }

            self.state = DriverState::Sleeping(round);
            let interrupted = tokio::select! {
                () = tokio::time::sleep(self.config.round_interval) => false,
                _ = &mut shutdown => true,
            };
            if interrupted {
                tracing::info!(round, "Process interrupted while sleeping");
                summary.interrupted = true;
                break;
            }
        }

        self.state = DriverState::Exporting;
        Ok(summary)
    }

    /// Runs one round: every batch once, at most `max_workers` at a time.
    async fn run_round<O>(&self, round: u32, observer: &mut O) -> Result<RoundReport>
    where
        O: FnMut(&BatchOutcome),
    {
        let started = Instant::now();
        let batches: Vec<Vec<Symbol>> = partition(self.symbols.as_slice(), self.config.max_workers)?
            .map(<[Symbol]>::to_vec)
            .collect();

        let mut outcomes = Vec::with_capacity(batches.len());
        let mut pending = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| {
                let worker = self.worker.clone();
                async move { worker.process(index, batch).await }
            })
            .buffer_unordered(self.config.max_workers);

        while let Some(outcome) = pending.next().await {
            observer(&outcome);
            outcomes.push(outcome);
        }

        let mut report = RoundReport::from_outcomes(round, &outcomes, started.elapsed());
        if self.config.recent_rows > 0 {
            let store = self.store.clone();
            let limit = self.config.recent_rows;
            let recent = tokio::task::spawn_blocking(move || store.recent_rows(limit))
                .await
                .map_err(|e| BarwatchError::Store(format!("spawn_blocking failed: {e}")))
                .and_then(|rows| rows.map_err(BarwatchError::from));
            match recent {
                Ok(rows) => report.recent = rows,
                Err(e) => tracing::warn!(round, error = %e, "Failed to read recent rows"),
            }
        }
        Ok(report)
    }

    /// Writes every stored row to `writer` and finishes the run.
    ///
    /// The driver reaches [`DriverState::Done`] whether or not the export
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns an export error if the rows cannot be read or written.
    pub fn export<W: Write + Send>(&mut self, format: OutputFormat, writer: W) -> Result<usize> {
        self.state = DriverState::Exporting;
        let result = self
            .store
            .export_all()
            .map_err(|e| BarwatchError::Export(e.to_string()))
            .and_then(|rows| {
                format.write_rows(&rows, writer)?;
                Ok(rows.len())
            });
        self.state = DriverState::Done;
        result
    }
}
