//! Data models for tracked entities.

pub mod timestamp;

pub use timestamp::{ColumnTag, EntityStamps, TimestampRecord, ENTITY_KEY_COLUMN, TIMESTAMPS_TABLE};
