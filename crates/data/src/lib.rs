//! Postgres storage for the price tracking tools.
//!
//! This crate provides:
//! - A [`StorageConnector`] abstraction with a per-call connection Postgres implementation
//! - The event timestamp repository with deadlock-avoidant batch upserts
//! - Schema maintenance routines (entity rename, table clone)

pub mod admin;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod value;

#[cfg(test)]
mod test_support;

pub use admin::{CloneTableRequest, QualifiedName, SchemaAdmin};
pub use database::{PgConnector, StorageConnector, BATCH_PAGE_SIZE};
pub use error::{Result, StorageError};
pub use models::{ColumnTag, EntityStamps, TimestampRecord, ENTITY_KEY_COLUMN, TIMESTAMPS_TABLE};
pub use repositories::TimestampRepository;
pub use value::{SqlRow, SqlValue, Statement};
