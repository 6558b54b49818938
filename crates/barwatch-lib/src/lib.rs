//! Minute-bar snapshot pipeline with rolling indicators over SQLite.
//!
//! This is a facade crate that re-exports functionality from the barwatch
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use barwatch_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let symbols = SymbolList::from_file("StockList.txt")?;
//!     let store = RollingWindowStore::open("stocks.db")?;
//!     let client = SnapshotClient::new(ClientConfig::default().with_api_key(std::env::var("BARWATCH_API_KEY")?))?;
//!
//!     let mut pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(client), store, symbols);
//!     pipeline.prepare()?;
//!     let summary = pipeline.run(tokio::signal::ctrl_c()).await?;
//!     println!("Stored {} rows", summary.total_stored());
//!
//!     pipeline.export(OutputFormat::Csv, std::fs::File::create("stock_prices.csv")?)?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use barwatch_types::*;

pub use barwatch_symbols::{Batches, SymbolError, SymbolList, batch_size, partition};

pub use barwatch_indicators::{
    Indicators, Rounding, WINDOW_LEN, WindowPolicy, compute_indicators, range_ratio,
    rolling_mean,
};

pub use barwatch_store::{InsertOutcome, RecordOutcome, RollingWindowStore, StoreError};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use barwatch_fetch::{
    ClientConfig, FetchError, RawSnapshot, SnapshotClient, SnapshotProvider, validate_snapshot,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use barwatch_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat, report,
};

#[cfg(feature = "pipeline")]
pub use barwatch_pipeline::{
    BatchOutcome, BatchWorker, DriverState, Pipeline, PipelineConfig, ReplayConfig, ReplayError,
    ReplaySummary, RoundReport, RunSummary, replay,
};

/// Prelude module for convenient imports.
///
/// ```
/// use barwatch_lib::prelude::*;
/// ```
pub mod prelude {
    pub use barwatch_types::{
        Bar, BarwatchError, Clock, IndicatorRow, MinuteOfDay, Result, Symbol, WindowPoint,
    };

    pub use barwatch_symbols::{SymbolList, partition};

    pub use barwatch_indicators::{WindowPolicy, compute_indicators};

    pub use barwatch_store::RollingWindowStore;

    #[cfg(feature = "fetch")]
    pub use barwatch_fetch::{ClientConfig, SnapshotClient, SnapshotProvider};

    #[cfg(feature = "format")]
    pub use barwatch_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "pipeline")]
    pub use barwatch_pipeline::{Pipeline, PipelineConfig, ReplayConfig, RunSummary};
}
