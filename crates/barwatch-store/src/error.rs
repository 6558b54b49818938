//! Store error type.

use barwatch_types::BarwatchError;
use thiserror::Error;

/// Errors raised by the rolling-window store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The table could not be dropped or created.
    #[error("Schema initialization failed: {0}")]
    Schema(#[source] rusqlite::Error),

    /// A query or write failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for BarwatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Schema(_) => Self::Schema(err.to_string()),
            other => Self::Store(other.to_string()),
        }
    }
}
