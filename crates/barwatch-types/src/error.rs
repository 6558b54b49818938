//! Error types for barwatch.

use thiserror::Error;

/// Result type alias for barwatch operations.
pub type Result<T> = std::result::Result<T, BarwatchError>;

/// Errors that can occur while running the pipeline.
///
/// Only [`BarwatchError::Config`] and [`BarwatchError::Schema`] halt a run.
/// Provider and store failures are contained at the batch boundary, and export
/// failures are reported without changing the exit status. A malformed
/// snapshot is not an error at all: validation simply yields no bar.
#[derive(Error, Debug)]
pub enum BarwatchError {
    /// Missing or empty symbol source, or an invalid setting.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backing table could not be created.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Network or payload failure for one batch.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A query or insert against the store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Writing the final output failed.
    #[error("Export error: {0}")]
    Export(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BarwatchError {
    /// Returns true if this error must abort the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Schema(_))
    }
}
