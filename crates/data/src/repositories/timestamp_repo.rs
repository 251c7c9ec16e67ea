//! Event timestamp repository.
//!
//! Stamps entities with the time an event was last observed. Rows are
//! written in ascending entity id order so concurrent writers lock rows in
//! the same sequence and cannot deadlock each other.

use std::sync::Arc;

use pricetrack_core::{Clock, SystemClock, TimeBucket};

use crate::database::StorageConnector;
use crate::error::Result;
use crate::models::{ColumnTag, EntityStamps, TimestampRecord};
use crate::value::SqlRow;

/// Repository writing event timestamps through a [`StorageConnector`].
pub struct TimestampRepository<C> {
    connector: C,
    clock: Arc<dyn Clock>,
    bucket: TimeBucket,
}

impl<C: StorageConnector> TimestampRepository<C> {
    /// Creates a repository stamping with the system clock.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self::with_clock(connector, Arc::new(SystemClock))
    }

    /// Creates a repository with an explicit clock.
    #[must_use]
    pub fn with_clock(connector: C, clock: Arc<dyn Clock>) -> Self {
        Self {
            connector,
            clock,
            bucket: TimeBucket::SECOND,
        }
    }

    /// Normalizes input into rows ready for submission.
    ///
    /// Timestamps are floored to the second; entities without one share a
    /// single "now". The result is stably sorted by entity id.
    #[must_use]
    pub fn build_records(&self, stamps: EntityStamps) -> Vec<TimestampRecord> {
        let now = self.bucket.floor(self.clock.now());

        let mut records: Vec<TimestampRecord> = match stamps {
            EntityStamps::Bare(ids) => ids
                .into_iter()
                .map(|id| TimestampRecord::new(id, now))
                .collect(),
            EntityStamps::Stamped(pairs) => pairs
                .into_iter()
                .map(|(id, at)| TimestampRecord::new(id, at.map_or(now, |ts| self.bucket.floor(ts))))
                .collect(),
        };

        records.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        records
    }

    /// Stamps entities in the column for `tag`, in one transaction.
    ///
    /// Returns the number of rows submitted.
    ///
    /// # Errors
    /// Returns an error if the batch fails; nothing is written in that case.
    pub async fn record_events(&self, stamps: EntityStamps, tag: ColumnTag) -> Result<u64> {
        if stamps.is_empty() {
            tracing::debug!(%tag, "no entities to stamp");
            return Ok(0);
        }

        let rows: Vec<SqlRow> = self
            .build_records(stamps)
            .into_iter()
            .map(TimestampRecord::into_params)
            .collect();

        tracing::info!(%tag, table = tag.table(), rows = rows.len(), "recording event timestamps");
        self.connector.execute_batch(&tag.upsert_sql(), &rows).await
    }

    /// Like [`record_events`](Self::record_events), taking the tag as text.
    ///
    /// # Errors
    /// Returns `StorageError::InvalidColumnTag` before touching storage if the
    /// tag is unknown, or any error from the write.
    pub async fn record_events_for_tag(&self, stamps: EntityStamps, tag: &str) -> Result<u64> {
        let tag: ColumnTag = tag.parse()?;
        self.record_events(stamps, tag).await
    }
}
