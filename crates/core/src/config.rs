use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(alias = "PostgreSQL")]
    pub postgres: PostgresCredentials,
    pub http: HttpConfig,
}

/// Connection credentials for the tracking database.
///
/// Blank values are treated as absent so they are left out of the
/// connect options instead of being sent as empty strings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresCredentials {
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl PostgresCredentials {
    #[must_use]
    pub fn dbname(&self) -> Option<&str> {
        non_blank(self.dbname.as_deref())
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        non_blank(self.user.as_deref())
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        non_blank(self.password.as_deref())
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        non_blank(self.host.as_deref())
    }

    /// Renders a libpq-style `key=value` string with the password masked.
    #[must_use]
    pub fn redacted_conninfo(&self) -> String {
        let mut parts = Vec::new();
        if let Some(dbname) = self.dbname() {
            parts.push(format!("dbname={dbname}"));
        }
        if let Some(user) = self.user() {
            parts.push(format!("user={user}"));
        }
        if self.password().is_some() {
            parts.push("password=***".to_string());
        }
        if let Some(host) = self.host() {
            parts.push(format!("host={host}"));
        }
        if let Some(port) = self.port {
            parts.push(format!("port={port}"));
        }
        parts.join(" ")
    }
}

impl fmt::Debug for PostgresCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresCredentials")
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout: FetchTimeout,
    pub max_attempts: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: FetchTimeout::Fixed(Duration::from_secs(10)),
            max_attempts: 3,
        }
    }
}

/// Per-attempt timeout policy for HTTP fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeout", into = "RawTimeout")]
pub enum FetchTimeout {
    /// Same limit on every attempt.
    Fixed(Duration),
    /// One second on the first attempt, one more on each retry.
    Auto,
}

impl FetchTimeout {
    /// Numeric sentinel that selects [`FetchTimeout::Auto`].
    pub const AUTO_SENTINEL: f64 = -1.0;

    /// Builds a policy from seconds, where `-1` means auto-escalation.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidTimeout` for zero, negative (other than the
    /// sentinel) or non-finite values.
    pub fn from_secs(secs: f64) -> Result<Self> {
        if secs == Self::AUTO_SENTINEL {
            Ok(Self::Auto)
        } else if secs.is_finite() && secs > 0.0 {
            Ok(Self::Fixed(Duration::from_secs_f64(secs)))
        } else {
            Err(CoreError::InvalidTimeout(secs.to_string()))
        }
    }

    /// Timeout applied to the given 1-based attempt.
    #[must_use]
    pub fn for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(limit) => *limit,
            Self::Auto => Duration::from_secs(u64::from(attempt.max(1))),
        }
    }
}

impl FromStr for FetchTimeout {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let secs: f64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidTimeout(trimmed.to_string()))?;
        Self::from_secs(secs)
    }
}

impl fmt::Display for FetchTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(limit) => write!(f, "{}s", limit.as_secs_f64()),
            Self::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Seconds(f64),
    Keyword(String),
}

impl TryFrom<RawTimeout> for FetchTimeout {
    type Error = CoreError;

    fn try_from(raw: RawTimeout) -> Result<Self> {
        match raw {
            RawTimeout::Seconds(secs) => Self::from_secs(secs),
            RawTimeout::Keyword(keyword) => keyword.parse(),
        }
    }
}

impl From<FetchTimeout> for RawTimeout {
    fn from(timeout: FetchTimeout) -> Self {
        match timeout {
            FetchTimeout::Fixed(limit) => Self::Seconds(limit.as_secs_f64()),
            FetchTimeout::Auto => Self::Keyword("auto".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_timeout_escalates_per_attempt() {
        let timeouts: Vec<_> = (1..=3).map(|a| FetchTimeout::Auto.for_attempt(a)).collect();
        assert_eq!(
            timeouts,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
    }

    #[test]
    fn test_fixed_timeout_is_constant() {
        let timeout = FetchTimeout::Fixed(Duration::from_millis(2500));
        assert_eq!(timeout.for_attempt(1), timeout.for_attempt(5));
    }

    #[test]
    fn test_sentinel_selects_auto() {
        assert_eq!(FetchTimeout::from_secs(-1.0).unwrap(), FetchTimeout::Auto);
        assert_eq!("-1".parse::<FetchTimeout>().unwrap(), FetchTimeout::Auto);
        assert_eq!("AUTO".parse::<FetchTimeout>().unwrap(), FetchTimeout::Auto);
    }

    #[test]
    fn test_invalid_timeouts_rejected() {
        assert!(FetchTimeout::from_secs(0.0).is_err());
        assert!(FetchTimeout::from_secs(-3.0).is_err());
        assert!(FetchTimeout::from_secs(f64::NAN).is_err());
        assert!("soon".parse::<FetchTimeout>().is_err());
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let creds = PostgresCredentials {
            dbname: Some("tracking".to_string()),
            user: Some("   ".to_string()),
            password: Some(String::new()),
            host: None,
            port: Some(5433),
        };
        assert_eq!(creds.dbname(), Some("tracking"));
        assert_eq!(creds.user(), None);
        assert_eq!(creds.password(), None);
        assert_eq!(creds.redacted_conninfo(), "dbname=tracking port=5433");
    }

    #[test]
    fn test_debug_masks_password() {
        let creds = PostgresCredentials {
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout, FetchTimeout::Fixed(Duration::from_secs(10)));
    }
}
