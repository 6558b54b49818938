//! The snapshot provider seam.

use async_trait::async_trait;
use barwatch_types::Symbol;

use crate::{FetchError, RawSnapshot, SnapshotClient};

/// Source of current snapshots for a batch of tickers.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Returns the provider's snapshots for exactly these tickers.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be fetched.
    async fn snapshots(&self, symbols: &[Symbol]) -> Result<Vec<RawSnapshot>, FetchError>;
}

#[async_trait]
impl SnapshotProvider for SnapshotClient {
    async fn snapshots(&self, symbols: &[Symbol]) -> Result<Vec<RawSnapshot>, FetchError> {
        self.fetch(symbols).await
    }
}
