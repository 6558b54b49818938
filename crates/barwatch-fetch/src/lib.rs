//! Snapshot provider client for the barwatch minute-bar pipeline.
//!
//! This crate provides the fetch side of the pipeline:
//!
//! - [`SnapshotProvider`] - Seam between the worker and the data source
//! - [`SnapshotClient`] - HTTP provider with connection pooling and retries
//! - [`url::snapshot_url`] - Builds the batch snapshot URL
//! - [`validate_snapshot`] - Turns a raw snapshot into a [`barwatch_types::Bar`] or nothing

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod provider;
mod snapshot;
pub mod url;

pub use client::{ClientConfig, FetchError, SnapshotClient};
pub use provider::SnapshotProvider;
pub use snapshot::{RawSnapshot, SnapshotResponse, validate_snapshot};
