//! SQLite rolling-window store for the barwatch minute-bar pipeline.
//!
//! - [`RollingWindowStore`] - Shared handle to the `stock_prices` table
//! - [`InsertOutcome`] / [`RecordOutcome`] - Results of insert-if-absent writes
//! - [`StoreError`] - Store failures

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod schema;
mod store;

pub use error::StoreError;
pub use schema::{COLUMNS, TABLE};
pub use store::{InsertOutcome, RecordOutcome, RollingWindowStore};
