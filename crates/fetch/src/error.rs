//! Error types for HTTP fetching.

use std::time::Duration;
use thiserror::Error;

/// Why a single attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The connection could not be established.
    Connection(String),
    /// No response within the attempt's time limit.
    Timeout(Duration),
    /// Any other transport failure.
    Other(String),
}

impl AttemptFailure {
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<reqwest::Error> for AttemptFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Errors raised by the fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(String),

    /// Every attempt failed.
    #[error("no response from {url} after {attempts} attempt(s)")]
    Exhausted {
        /// Requested URL.
        url: String,
        /// Attempts made.
        attempts: u32,
        /// Failure of the final attempt, if any attempt was made.
        last_failure: Option<AttemptFailure>,
    },
}

impl FetchError {
    /// Returns true if the final attempt could not connect at all.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Exhausted {
                last_failure: Some(AttemptFailure::Connection(_)),
                ..
            }
        )
    }
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
