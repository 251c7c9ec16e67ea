//! Per-entity event timestamps.

use crate::error::StorageError;
use crate::value::{SqlRow, SqlValue};
use chrono::{DateTime, Utc};
use pricetrack_core::quote_ident;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Table holding one row of event timestamps per entity.
pub const TIMESTAMPS_TABLE: &str = "Timestamps_WmAz";

/// Unique key column of [`TIMESTAMPS_TABLE`].
pub const ENTITY_KEY_COLUMN: &str = "asin";

/// Kind of event being stamped; each maps to one timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTag {
    /// Walmart item data scraped.
    WmData,
    /// Walmart item matched to an Amazon listing.
    MatchToAz,
    /// Amazon competitive price fetched.
    AzCompPrice,
    /// Amazon fee estimate fetched.
    AzFees,
    /// Amazon lowest offer fetched.
    AzLowestOffer,
}

impl ColumnTag {
    pub const ALL: [Self; 5] = [
        Self::WmData,
        Self::MatchToAz,
        Self::AzCompPrice,
        Self::AzFees,
        Self::AzLowestOffer,
    ];

    /// Column written for this tag.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::WmData => "wm_data",
            Self::MatchToAz => "match_to_az",
            Self::AzCompPrice => "az_comp_price",
            Self::AzFees => "az_fees",
            Self::AzLowestOffer => "az_lowest_offer",
        }
    }

    /// Table holding the column.
    #[must_use]
    pub fn table(self) -> &'static str {
        TIMESTAMPS_TABLE
    }

    /// Upsert touching only this tag's column.
    ///
    /// Parameters: `$1` entity id, `$2` value for a new row, `$3` value on conflict.
    #[must_use]
    pub fn upsert_sql(self) -> String {
        let column = quote_ident(self.column());
        let key = quote_ident(ENTITY_KEY_COLUMN);
        format!(
            "INSERT INTO {table} ({key}, {column}) VALUES ($1, $2) \
             ON CONFLICT ({key}) DO UPDATE SET {column} = $3",
            table = quote_ident(self.table()),
        )
    }

    fn valid_tags() -> String {
        Self::ALL
            .iter()
            .map(|tag| tag.column())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ColumnTag {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.column() == s)
            .ok_or_else(|| StorageError::InvalidColumnTag {
                received: s.to_string(),
                expected: Self::valid_tags(),
            })
    }
}

impl fmt::Display for ColumnTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Row submitted for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRecord {
    pub entity_id: String,
    /// Written when the entity has no row yet.
    pub observed_at: DateTime<Utc>,
    /// Written when the entity already has a row.
    pub updated_at: DateTime<Utc>,
}

impl TimestampRecord {
    #[must_use]
    pub fn new(entity_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            entity_id: entity_id.into(),
            observed_at: at,
            updated_at: at,
        }
    }

    /// Positional parameters for [`ColumnTag::upsert_sql`].
    #[must_use]
    pub fn into_params(self) -> SqlRow {
        vec![
            SqlValue::Text(self.entity_id),
            SqlValue::Timestamp(self.observed_at),
            SqlValue::Timestamp(self.updated_at),
        ]
    }
}

/// Entities to stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityStamps {
    /// Ids stamped with the current time.
    Bare(Vec<String>),
    /// Ids with explicit timestamps; `None` falls back to the current time.
    Stamped(Vec<(String, Option<DateTime<Utc>>)>),
}

impl EntityStamps {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bare(ids) => ids.len(),
            Self::Stamped(pairs) => pairs.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for EntityStamps {
    fn from(ids: Vec<String>) -> Self {
        Self::Bare(ids)
    }
}

impl From<Vec<(String, Option<DateTime<Utc>>)>> for EntityStamps {
    fn from(pairs: Vec<(String, Option<DateTime<Utc>>)>) -> Self {
        Self::Stamped(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_parsing() {
        assert_eq!("wm_data".parse::<ColumnTag>().unwrap(), ColumnTag::WmData);
        assert_eq!(
            "az_lowest_offer".parse::<ColumnTag>().unwrap(),
            ColumnTag::AzLowestOffer
        );
        for tag in ColumnTag::ALL {
            assert_eq!(tag.to_string().parse::<ColumnTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_names_received_value() {
        let err = "WM_DATA".parse::<ColumnTag>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("WM_DATA"));
        assert!(msg.contains("az_fees"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_upsert_touches_only_tagged_column() {
        let sql = ColumnTag::AzFees.upsert_sql();
        assert_eq!(
            sql,
            "INSERT INTO \"Timestamps_WmAz\" (\"asin\", \"az_fees\") VALUES ($1, $2) \
             ON CONFLICT (\"asin\") DO UPDATE SET \"az_fees\" = $3"
        );
    }

    #[test]
    fn test_serde_names_match_columns() {
        let json = serde_json::to_string(&ColumnTag::MatchToAz).unwrap();
        assert_eq!(json, "\"match_to_az\"");
    }
}
