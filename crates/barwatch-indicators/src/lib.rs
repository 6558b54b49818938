//! Rolling-window indicators for the barwatch minute-bar pipeline.
//!
//! This crate provides the indicator engine:
//!
//! - [`rolling_mean`] - Mean of recent closes, rounded to 2 places
//! - [`range_ratio`] - Current bar range over the window range, rounded to 3 places
//! - [`compute_indicators`] - Builds both values for a bar from its stored history
//! - [`WindowPolicy`] - Inclusive (online) or strictly-prior (offline replay) windows

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod window;

pub use engine::{mean, range_ratio, raw_range_ratio, rolling_mean, round_to};
pub use window::{Indicators, Rounding, WINDOW_LEN, WindowPolicy, compute_indicators};
