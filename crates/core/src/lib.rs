//! Core building blocks for the price tracking tools.
//!
//! This crate provides:
//! - Typed configuration loaded from `credentials.toml` and the environment
//! - Section-grouped credential lookup
//! - Timestamp bucketing and lenient parsing
//! - List and SQL-text helpers

pub mod clock;
pub mod config;
pub mod config_loader;
pub mod credentials;
pub mod error;
pub mod files;
pub mod lists;
pub mod sql;
pub mod time_bucket;
pub mod timestamps;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, FetchTimeout, HttpConfig, PostgresCredentials};
pub use config_loader::{ConfigLoader, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use credentials::{CredentialSelection, CredentialStore, Section};
pub use error::{CoreError, Result};
pub use files::write_to_file;
pub use lists::union_no_dups;
pub use sql::{quote_ident, sql_int_list, sql_str_list};
pub use time_bucket::TimeBucket;
pub use timestamps::{parse_timestamp, parse_timestamps};
