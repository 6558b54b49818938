//! HTTP client for the snapshot endpoint.

use std::time::Duration;

use barwatch_types::{BarwatchError, Symbol};
use reqwest::Client;
use thiserror::Error;

use crate::snapshot::{RawSnapshot, SnapshotResponse};
use crate::url::{BASE_URL, snapshot_url};

/// Configuration for the snapshot client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the provider.
    pub base_url: String,
    /// Provider API key.
    pub api_key: String,
    /// Idle connections kept per host; match the worker cap.
    pub pool_size: usize,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: String::new(),
            pool_size: 60,
            timeout: Duration::from_secs(20),
            max_retries: 3,     // Rounds are a minute apart, keep retries short
            base_delay_ms: 250, // Start with 250ms delay
            max_delay_ms: 5_000,
            user_agent: format!("barwatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Sets the provider API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the provider base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the idle connection pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }
}

/// Errors that can occur while fetching snapshots.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Server kept failing after all retries.
    #[error("Server error: {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// The provider rejected the request.
    #[error("Request rejected with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// Any other provider failure.
    #[error("{0}")]
    Other(String),
}

impl From<FetchError> for BarwatchError {
    fn from(err: FetchError) -> Self {
        Self::Provider(err.to_string())
    }
}

/// HTTP snapshot client with connection pooling and retry logic.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    client: Client,
    config: ClientConfig,
}

impl SnapshotClient {
    /// Creates a new snapshot client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches the current snapshots for one batch of tickers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retries, the provider
    /// rejects it, or the body is not a snapshot response.
    pub async fn fetch(&self, symbols: &[Symbol]) -> Result<Vec<RawSnapshot>, FetchError> {
        let cache_buster = chrono::Utc::now().timestamp();
        let url = snapshot_url(&self.config.base_url, symbols, &self.config.api_key, cache_buster)
            .map_err(FetchError::InvalidUrl)?;
        let mut attempts = 0;

        loop {
            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    // Retry on server errors (5xx) and rate limiting (429)
                    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            let delay = self.calculate_backoff_delay(attempts);
                            tracing::debug!(%status, attempts, ?delay, "Retrying snapshot request");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(FetchError::ServerError {
                            status: status.as_u16(),
                        });
                    }

                    if !status.is_success() {
                        return Err(FetchError::Rejected {
                            status: status.as_u16(),
                        });
                    }

                    let body: SnapshotResponse = response.json().await?;
                    return Ok(body.tickers);
                }
                Err(e) if self.is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    tracing::debug!(error = %e, attempts, ?delay, "Retrying snapshot request");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));

        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // Deterministic jitter within ±25%
        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            offset as i64 - jitter_range as i64
        } else {
            0
        };

        let final_delay = (capped_delay as i64 + jitter).max(50) as u64;
        Duration::from_millis(final_delay)
    }

    /// Determines if an error is retryable.
    fn is_retryable_error(&self, error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}
