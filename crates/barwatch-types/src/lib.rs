//! Core types for the barwatch minute-bar indicator pipeline.
//!
//! This crate provides the fundamental data structures used throughout barwatch:
//!
//! - [`Symbol`] - An opaque, case-sensitive ticker identifier
//! - [`MinuteOfDay`] - An `HHMM` minute-of-day timestamp
//! - [`Bar`] - One minute of observed market data for one symbol
//! - [`IndicatorRow`] - A bar plus its derived rolling-window indicators
//! - [`WindowPoint`] - One element of a high/low rolling window

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod error;
mod minute;
mod symbol;

pub use bar::{Bar, IndicatorRow, WindowPoint};
pub use error::{BarwatchError, Result};
pub use minute::{Clock, MinuteOfDay, MinuteOfDayError};
pub use symbol::Symbol;
