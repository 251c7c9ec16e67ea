//! HTTP GET with per-attempt timeouts and sequential retries.
//!
//! A fetch never fails outright: it reports how many attempts were made and
//! the page, if any attempt produced one. Any HTTP status counts as a
//! response. Each attempt downloads the whole body within its time limit.

use crate::error::{AttemptFailure, FetchError, Result};
use pricetrack_core::{FetchTimeout, HttpConfig};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

// =============================================================================
// Constants
// =============================================================================

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("pricetrack/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Outcome
// =============================================================================

/// A fully downloaded response.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Result of a retried fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    /// The page, or `None` if every attempt failed.
    pub response: Option<FetchedPage>,
    /// Attempts made, including the successful one.
    pub attempts_used: u32,
    /// Failure of the last failed attempt.
    pub last_failure: Option<AttemptFailure>,
}

impl FetchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }

    /// Converts the outcome into the page or an error describing the
    /// exhausted attempts.
    ///
    /// # Errors
    /// Returns `FetchError::Exhausted` if no attempt produced a response.
    pub fn into_page(self, url: &str) -> Result<FetchedPage> {
        self.response.ok_or_else(|| FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.attempts_used,
            last_failure: self.last_failure,
        })
    }
}

// =============================================================================
// Fetcher
// =============================================================================

/// Retrying HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    timeout: FetchTimeout,
    max_attempts: u32,
}

impl HttpFetcher {
    /// Creates a fetcher using the configured timeout policy and attempt budget.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            timeout: config.timeout,
            max_attempts: config.max_attempts,
        })
    }

    /// Fetches `url` with the configured policy.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        self.fetch_with(url, self.timeout, self.max_attempts).await
    }

    /// Fetches `url`, making at most `max_attempts` sequential attempts.
    ///
    /// The attempt's time limit covers both the request and the body
    /// download. Connection failures are retried quietly; timeouts and other
    /// failures, including a body that breaks off, are logged as warnings
    /// before retrying.
    pub async fn fetch_with(&self, url: &str, timeout: FetchTimeout, max_attempts: u32) -> FetchOutcome {
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            let limit = timeout.for_attempt(attempt);

            let failure = match tokio::time::timeout(limit, self.download(url)).await {
                Ok(Ok(page)) => {
                    tracing::debug!(url, attempt, status = %page.status, bytes = page.body.len(), "fetched");
                    return FetchOutcome {
                        response: Some(page),
                        attempts_used: attempt,
                        last_failure: None,
                    };
                }
                Ok(Err(err)) if err.is_timeout() => AttemptFailure::Timeout(limit),
                Ok(Err(err)) => AttemptFailure::from(err),
                Err(_) => AttemptFailure::Timeout(limit),
            };

            match &failure {
                AttemptFailure::Connection(reason) => {
                    tracing::debug!(url, attempt, %reason, "connection failed");
                }
                AttemptFailure::Timeout(_) => {
                    tracing::warn!(url, attempt, timeout_secs = limit.as_secs_f64(), "request timed out");
                }
                AttemptFailure::Other(reason) => {
                    tracing::warn!(url, attempt, %reason, "request failed");
                }
            }
            last_failure = Some(failure);
        }

        if last_failure.as_ref().is_some_and(AttemptFailure::is_connection) {
            tracing::error!(url, attempts = max_attempts, "could not connect");
        }

        FetchOutcome {
            response: None,
            attempts_used: max_attempts,
            last_failure,
        }
    }

    async fn download(&self, url: &str) -> reqwest::Result<FetchedPage> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(FetchedPage {
            status,
            headers,
            body,
        })
    }
}
