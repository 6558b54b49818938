//! Offline replay of a historical minute-bar file.
//!
//! The file is a CSV with a `Ticker,Time,Open,High,Low,Close,Volume` header,
//! `Time` being an `HHMM` minute. Minutes are walked in order from `start` to
//! `end`; every listed ticker with a bar at that minute gets its indicators
//! computed over the strictly-prior window. The run writes two text reports
//! and a SQLite copy of the rows that carry at least one indicator.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use barwatch_format::{FormatError, report};
use barwatch_indicators::{WINDOW_LEN, WindowPolicy, compute_indicators};
use barwatch_store::{RollingWindowStore, StoreError};
use barwatch_symbols::SymbolList;
use barwatch_types::{Bar, BarwatchError, IndicatorRow, MinuteOfDay, Symbol};
use chrono::{Local, NaiveDate};
use csv_async::{AsyncReaderBuilder, ErrorKind, Trim};
use futures::StreamExt;
use serde::Deserialize;
use thiserror::Error;

/// Bars per ticker, keyed and ordered by minute.
pub type History = HashMap<Symbol, BTreeMap<MinuteOfDay, Bar>>;

/// Errors that can occur during a replay.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// The historical file could not be read.
    #[error("Failed to read {path}: {source}")]
    Input {
        /// Path of the historical file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The historical file is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    /// A report file could not be written.
    #[error("Failed to write {path}: {source}")]
    Output {
        /// Path of the report.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: FormatError,
    },

    /// The output database failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking task panicked or was cancelled.
    #[error("Replay task failed: {0}")]
    Task(String),
}

impl From<ReplayError> for BarwatchError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::Store(e) => e.into(),
            e @ (ReplayError::Input { .. } | ReplayError::Csv(_)) => Self::Config(e.to_string()),
            e @ ReplayError::Output { .. } => Self::Export(e.to_string()),
            e @ ReplayError::Task(_) => Self::Store(e.to_string()),
        }
    }
}

/// Configuration for a replay run.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Historical minute-bar CSV.
    pub input: PathBuf,
    /// Directory receiving the reports and the default database.
    pub output_dir: PathBuf,
    /// First minute to process.
    pub start: MinuteOfDay,
    /// Last minute to process, inclusive.
    pub end: MinuteOfDay,
    /// Date stamped on the output file names.
    pub date: NaiveDate,
    /// Minute stamped on the report file names.
    pub run_minute: MinuteOfDay,
    /// Database path; `<date>-Phase1.db` in `output_dir` when unset.
    pub database: Option<PathBuf>,
}

impl ReplayConfig {
    /// Default first minute (04:00).
    pub const DEFAULT_START: MinuteOfDay = MinuteOfDay::from_hm(4, 0).unwrap();

    /// Default last minute (19:59).
    pub const DEFAULT_END: MinuteOfDay = MinuteOfDay::from_hm(19, 59).unwrap();

    /// Creates a configuration stamped with the current local date and time.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let now = Local::now();
        Self {
            input: input.into(),
            output_dir: PathBuf::from("."),
            start: Self::DEFAULT_START,
            end: Self::DEFAULT_END,
            date: now.date_naive(),
            run_minute: MinuteOfDay::from_datetime(&now),
            database: None,
        }
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the processed minute range.
    #[must_use]
    pub const fn with_range(mut self, start: MinuteOfDay, end: MinuteOfDay) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Sets the date and minute stamped on the output names.
    #[must_use]
    pub const fn with_stamp(mut self, date: NaiveDate, run_minute: MinuteOfDay) -> Self {
        self.date = date;
        self.run_minute = run_minute;
        self
    }

    /// Sets an explicit database path.
    #[must_use]
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    fn report_path(&self, kind: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}-{:04}-{kind}.txt",
            self.date.format("%Y-%m-%d"),
            self.run_minute.as_u16()
        ))
    }

    /// Path of the SMA report.
    #[must_use]
    pub fn sma_path(&self) -> PathBuf {
        self.report_path("SMA")
    }

    /// Path of the range-ratio report.
    #[must_use]
    pub fn range_ratio_path(&self) -> PathBuf {
        self.report_path("RangeRatio")
    }

    /// Path of the output database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| {
            self.output_dir
                .join(format!("{}-Phase1.db", self.date.format("%Y-%m-%d")))
        })
    }
}

/// Counters and output locations of a replay run.
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    /// Records read for listed tickers.
    pub rows_read: usize,
    /// Records that could not be parsed.
    pub malformed: usize,
    /// (minute, ticker) pairs with a bar.
    pub processed: usize,
    /// (minute, ticker) pairs without a bar.
    pub missing: usize,
    /// Rows with at least one indicator.
    pub kept: usize,
    /// Lines in the SMA report.
    pub sma_lines: usize,
    /// Lines in the range-ratio report.
    pub range_ratio_lines: usize,
    /// SMA report location.
    pub sma_path: PathBuf,
    /// Range-ratio report location.
    pub range_ratio_path: PathBuf,
    /// Database location.
    pub database_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HistoricalRecord {
    ticker: String,
    time: MinuteOfDay,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<HistoricalRecord> for Bar {
    fn from(r: HistoricalRecord) -> Self {
        Self::new(
            Symbol::new(r.ticker),
            r.time,
            r.open,
            r.close,
            r.high,
            r.low,
            r.volume,
        )
    }
}

/// Reads the bars of the listed tickers from a historical file.
///
/// Bars outside the processed range are kept: they still feed the windows.
/// When a (ticker, minute) appears twice the first record wins. Returns the
/// history with the number of records read and the number skipped as
/// malformed.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub async fn load_history(
    path: &Path,
    symbols: &SymbolList,
) -> Result<(History, usize, usize), ReplayError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| ReplayError::Input {
            path: path.to_path_buf(),
            source,
        })?;

    let mut reader = AsyncReaderBuilder::new()
        .trim(Trim::All)
        .create_deserializer(file);
    let mut records = reader.deserialize::<HistoricalRecord>();

    let mut history = History::new();
    let mut read = 0usize;
    let mut malformed = 0usize;

    while let Some(record) = records.next().await {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), ErrorKind::Deserialize { .. }) => {
                tracing::warn!(error = %e, "Skipping malformed record");
                malformed += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !symbols.contains(&record.ticker) {
            continue;
        }
        read += 1;
        let bar = Bar::from(record);
        history
            .entry(bar.ticker.clone())
            .or_default()
            .entry(bar.timestamp)
            .or_insert(bar);
    }

    tracing::info!(path = %path.display(), rows = read, malformed, "Loaded historical data");
    Ok((history, read, malformed))
}

/// Computes the indicator rows of a replay, minute by minute.
///
/// Returns the kept rows in processing order together with the number of
/// processed and missing (minute, ticker) pairs.
#[must_use]
pub fn replay_rows(
    history: &History,
    symbols: &SymbolList,
    start: MinuteOfDay,
    end: MinuteOfDay,
) -> (Vec<IndicatorRow>, usize, usize) {
    let mut rows = Vec::new();
    let mut processed = 0;
    let mut missing = 0;

    for minute in MinuteOfDay::range(start, end) {
        for symbol in symbols.iter() {
            let Some((bars, bar)) = history
                .get(symbol)
                .and_then(|bars| bars.get(&minute).map(|bar| (bars, bar)))
            else {
                tracing::trace!(ticker = %symbol, %minute, "No data, skipping");
                missing += 1;
                continue;
            };
            processed += 1;

            // The current bar plus a full strictly-prior window.
            let recent: Vec<&Bar> = bars
                .range(..=minute)
                .rev()
                .map(|(_, b)| b)
                .take(WINDOW_LEN + 1)
                .collect();
            let closes: Vec<f64> = recent.iter().map(|b| b.close).collect();
            let points: Vec<_> = recent.iter().map(|b| b.window_point()).collect();
            let indicators = compute_indicators(bar, &closes, &points, WindowPolicy::StrictPrior);

            if indicators.is_empty() {
                continue;
            }
            tracing::debug!(
                ticker = %symbol,
                %minute,
                sma_21 = ?indicators.sma_21,
                range_ratio = ?indicators.range_ratio,
                "Processed"
            );
            rows.push(IndicatorRow::new(
                bar.clone(),
                indicators.sma_21,
                indicators.range_ratio,
            ));
        }
    }

    (rows, processed, missing)
}

/// Runs a full replay: load, compute, write reports, persist.
///
/// # Errors
///
/// Returns an error if the input cannot be read or an output cannot be written.
pub async fn replay(config: &ReplayConfig, symbols: &SymbolList) -> Result<ReplaySummary, ReplayError> {
    let (history, rows_read, malformed) = load_history(&config.input, symbols).await?;

    let config = config.clone();
    let symbols = symbols.clone();
    tokio::task::spawn_blocking(move || -> Result<ReplaySummary, ReplayError> {
        let (rows, processed, missing) = replay_rows(&history, &symbols, config.start, config.end);
        let mut summary = ReplaySummary {
            rows_read,
            malformed,
            processed,
            missing,
            kept: rows.len(),
            sma_path: config.sma_path(),
            range_ratio_path: config.range_ratio_path(),
            database_path: config.database_path(),
            ..ReplaySummary::default()
        };

        summary.sma_lines = write_report(&summary.sma_path, &rows, report::write_sma_report)?;
        summary.range_ratio_lines = write_report(
            &summary.range_ratio_path,
            &rows,
            report::write_range_ratio_report,
        )?;

        tracing::info!(path = %summary.database_path.display(), "Saving data");
        let store = RollingWindowStore::open(&summary.database_path)?;
        store.init_schema()?;
        let stored = store.insert_batch(&rows)?;
        tracing::info!(
            rows = stored,
            path = %summary.database_path.display(),
            "Data saved"
        );

        Ok(summary)
    })
    .await
    .map_err(|e| ReplayError::Task(e.to_string()))?
}

fn write_report(
    path: &Path,
    rows: &[IndicatorRow],
    write: fn(&[IndicatorRow], BufWriter<File>) -> Result<usize, FormatError>,
) -> Result<usize, ReplayError> {
    let output = |source: FormatError| ReplayError::Output {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| output(e.into()))?;
    }
    let file = File::create(path).map_err(|e| output(e.into()))?;
    write(rows, BufWriter::new(file)).map_err(output)
}
