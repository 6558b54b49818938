//! Export formatters for the barwatch minute-bar pipeline.
//!
//! This crate provides formatters for writing indicator rows
//! to various output formats:
//!
//! - [`CsvFormatter`] - CSV format, absent indicators written as `None`
//! - [`JsonFormatter`] - JSON array or NDJSON format
//! - [`report`] - Line formats of the offline SMA and range-ratio reports

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;
pub mod report;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat, format_real};
pub use json::{JsonFormatter, JsonStyle};
