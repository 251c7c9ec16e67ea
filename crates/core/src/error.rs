//! Error types shared by the price tracking crates.

use thiserror::Error;

/// Errors raised while loading configuration or normalizing values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bucket interval is not a positive, representable number of minutes.
    #[error("invalid bucket interval: {0} minutes")]
    InvalidInterval(f64),

    /// Fetch timeout is neither a positive number of seconds nor `auto`.
    #[error("invalid fetch timeout: {0}")]
    InvalidTimeout(String),

    /// Timestamp string did not match any accepted format.
    #[error("unrecognized timestamp: {0:?}")]
    UnparseableTimestamp(String),

    /// Requested credential section is absent from the credential file.
    #[error("credential section not found: {section}")]
    MissingSection {
        /// Section name that was requested.
        section: String,
    },

    /// Requested credential key is absent from its section.
    #[error("credential not found: {section}.{key}")]
    MissingCredential {
        /// Section name that was requested.
        section: String,
        /// Key name that was requested.
        key: String,
    },

    /// Configuration file could not be read or extracted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Creates a missing section error.
    pub fn missing_section(section: impl Into<String>) -> Self {
        Self::MissingSection {
            section: section.into(),
        }
    }

    /// Creates a missing credential error.
    pub fn missing_credential(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingCredential {
            section: section.into(),
            key: key.into(),
        }
    }

    /// Returns true if the error stems from bad caller input rather than the environment.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInterval(_)
                | Self::InvalidTimeout(_)
                | Self::UnparseableTimestamp(_)
                | Self::MissingSection { .. }
                | Self::MissingCredential { .. }
        )
    }
}

impl From<figment::Error> for CoreError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
