//! Concurrent fetch, indicator and persist pipeline for barwatch.
//!
//! - [`BatchWorker`] - Fetches one batch and records its bars
//! - [`Pipeline`] - Drives rounds of batch workers, then exports
//! - [`replay`] - Offline replay of a historical minute-bar file

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod driver;
pub mod replay;
#[cfg(test)]
mod testing;
mod worker;

pub use driver::{DriverState, Pipeline, PipelineConfig, RoundReport, RunSummary};
pub use replay::{ReplayConfig, ReplayError, ReplaySummary};
pub use worker::{BatchOutcome, BatchWorker};
