//! Schema maintenance routines.
//!
//! Renaming an entity id across every table that references it, and
//! cloning a table with a chosen subset and order of columns.

use std::fmt;

use pricetrack_core::quote_ident;
use rand::Rng;

use crate::database::StorageConnector;
use crate::error::{Result, StorageError};
use crate::models::{ENTITY_KEY_COLUMN, TIMESTAMPS_TABLE};
use crate::value::{SqlValue, Statement};

/// Highest random suffix appended to generated clone names.
const CLONE_SUFFIX_MAX: u32 = 9999;

/// Tables keyed by entity id, in the order they are updated by
/// [`SchemaAdmin::rename_entity`]. The flag marks the table whose rows are
/// always renamed and annotated instead of skipped on collision.
const RENAME_TARGETS: [(Option<&str>, &str, bool); 5] = [
    (Some("io"), "Manual", false),
    (Some("io"), "Purchased", false),
    (Some("io"), "SKUs", true),
    (None, "Products_WmAz", false),
    (None, TIMESTAMPS_TABLE, false),
];

/// A table name with an optional schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub table: String,
}

impl QualifiedName {
    #[must_use]
    pub fn new(schema: Option<&str>, table: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        }
    }

    /// Parses `table` or `schema.table`.
    ///
    /// # Errors
    /// Returns a validation error for blank parts or more than one dot.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split('.').map(str::trim).collect();
        match parts.as_slice() {
            [table] if !table.is_empty() => Ok(Self::new(None, table)),
            [schema, table] if !schema.is_empty() && !table.is_empty() => {
                Ok(Self::new(Some(schema), table))
            }
            _ => Err(StorageError::validation(format!("invalid table name: {raw:?}"))),
        }
    }

    /// SQL form with both parts quoted.
    #[must_use]
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.table)),
            None => quote_ident(&self.table),
        }
    }

    /// Takes the schema of `other` when this name has none.
    #[must_use]
    pub fn or_schema_of(mut self, other: &Self) -> Self {
        if self.schema.is_none() {
            self.schema.clone_from(&other.schema);
        }
        self
    }

    #[must_use]
    pub fn with_suffix(&self, suffix: u32) -> Self {
        Self {
            schema: self.schema.clone(),
            table: format!("{}_{suffix}", self.table),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.table),
            None => f.write_str(&self.table),
        }
    }
}

/// Parameters for [`SchemaAdmin::clone_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneTableRequest {
    /// `table` or `schema.table`.
    pub source: String,
    /// Columns to keep, in output order. `None` keeps all of them.
    pub columns: Option<Vec<String>>,
    /// Primary key column. `None` reuses the source table's key, if any.
    pub primary_key: Option<String>,
    /// Target name. `None` appends a random suffix to the source name.
    pub new_name: Option<String>,
}

impl CloneTableRequest {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            columns: None,
            primary_key: None,
            new_name: None,
        }
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_new_name(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }
}

/// Runs schema maintenance through a [`StorageConnector`].
#[derive(Debug, Clone)]
pub struct SchemaAdmin<C> {
    connector: C,
}

impl<C: StorageConnector> SchemaAdmin<C> {
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Renames an entity id in every table that references it, in one
    /// transaction.
    ///
    /// Rows are only renamed where `new` is not already present, except in
    /// `io."SKUs"`, which is always renamed and gets a note recording the change.
    ///
    /// # Errors
    /// Returns a validation error for blank or identical ids, or any error
    /// from the update.
    pub async fn rename_entity(&self, old: &str, new: &str) -> Result<u64> {
        let (old, new) = (old.trim(), new.trim());
        if old.is_empty() || new.is_empty() {
            return Err(StorageError::validation("entity ids must not be blank"));
        }
        if old == new {
            return Err(StorageError::validation(format!(
                "old and new entity ids are both {old:?}"
            )));
        }

        let key = quote_ident(ENTITY_KEY_COLUMN);
        let note = format!("{ENTITY_KEY_COLUMN} changed from {old} to {new}");
        let statements: Vec<Statement> = RENAME_TARGETS
            .iter()
            .map(|(schema, table, annotate)| {
                let table = QualifiedName::new(*schema, table).quoted();
                if *annotate {
                    Statement::new(
                        format!(
                            "UPDATE {table} SET {key} = $1, notes = CONCAT_WS('. ', notes, $2::text) \
                             WHERE {key} = $3"
                        ),
                        vec![new.into(), note.as_str().into(), old.into()],
                    )
                } else {
                    Statement::new(
                        format!(
                            "UPDATE {table} SET {key} = $1 WHERE {key} = $2 \
                             AND NOT EXISTS (SELECT 1 FROM {table} WHERE {key} = $1)"
                        ),
                        vec![new.into(), old.into()],
                    )
                }
            })
            .collect();

        tracing::info!(old, new, "renaming entity");
        self.connector.execute_script(&statements).await
    }

    /// Creates a copy of a table with the requested columns and primary key.
    ///
    /// Returns the name of the created table.
    ///
    /// # Errors
    /// Returns a validation error when source and target coincide, the
    /// selection is empty, or the primary key is not a selected source
    /// column; otherwise any database error.
    pub async fn clone_table(&self, request: &CloneTableRequest) -> Result<QualifiedName> {
        let source = QualifiedName::parse(&request.source)?;
        let target = match &request.new_name {
            Some(name) => QualifiedName::parse(name)?.or_schema_of(&source),
            None => source.with_suffix(rand::thread_rng().gen_range(0..=CLONE_SUFFIX_MAX)),
        };
        if target == source {
            return Err(StorageError::validation(format!(
                "source and target are both {source}"
            )));
        }

        let source_columns = self.source_columns(&source).await?;
        tracing::info!(%source, columns = ?source_columns, "read source columns");

        let columns: Vec<String> = match &request.columns {
            Some(requested) => {
                let (kept, missing): (Vec<String>, Vec<String>) = requested
                    .iter()
                    .cloned()
                    .partition(|c| source_columns.contains(c));
                if !missing.is_empty() {
                    tracing::warn!(%source, ?missing, "requested columns not in source, skipping");
                }
                kept
            }
            None => source_columns.clone(),
        };
        if columns.is_empty() {
            return Err(StorageError::validation(format!(
                "no columns of {source} selected"
            )));
        }

        let primary_key = match &request.primary_key {
            Some(pk) if !source_columns.contains(pk) => {
                return Err(StorageError::validation(format!(
                    "primary key {pk:?} does not exist in {source}"
                )));
            }
            Some(pk) if !columns.contains(pk) => {
                return Err(StorageError::validation(format!(
                    "primary key {pk:?} is not among the selected columns"
                )));
            }
            Some(pk) => vec![pk.clone()],
            None => {
                let discovered = self.discover_primary_key(&source).await?;
                if discovered.iter().all(|c| columns.contains(c)) {
                    discovered
                } else {
                    tracing::warn!(%source, key = ?discovered, "source primary key not fully selected, clone gets none");
                    Vec::new()
                }
            }
        };

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut statements = vec![Statement::raw(format!(
            "CREATE TABLE {} AS SELECT {column_list} FROM {}",
            target.quoted(),
            source.quoted()
        ))];
        if !primary_key.is_empty() {
            let key_list = primary_key
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            statements.push(Statement::raw(format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({key_list})",
                target.quoted()
            )));
        }

        self.connector.execute_script(&statements).await?;
        tracing::info!(%source, %target, key = ?primary_key, "cloned table");
        Ok(target)
    }

    // Both catalog lookups resolve the name through `to_regclass`, so an
    // unqualified name means the first match on the search path and never a
    // same-named table in another schema.
    async fn source_columns(&self, source: &QualifiedName) -> Result<Vec<String>> {
        let rows = self
            .connector
            .execute_return(
                "SELECT a.attname::text FROM pg_attribute a \
                 WHERE a.attrelid = to_regclass($1) AND a.attnum > 0 AND NOT a.attisdropped \
                 ORDER BY a.attnum",
                &[SqlValue::from(source.quoted())],
            )
            .await?;
        Ok(first_text_column(rows))
    }

    async fn discover_primary_key(&self, source: &QualifiedName) -> Result<Vec<String>> {
        let rows = self
            .connector
            .execute_return(
                "SELECT a.attname::text FROM pg_index i \
                 JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey) \
                 WHERE i.indrelid = to_regclass($1) AND i.indisprimary \
                 ORDER BY array_position(i.indkey::int2[], a.attnum)",
                &[SqlValue::from(source.quoted())],
            )
            .await?;
        Ok(first_text_column(rows))
    }
}

fn first_text_column(rows: Vec<Vec<SqlValue>>) -> Vec<String> {
    rows.into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter_map(|value| match value {
            SqlValue::Text(s) => Some(s),
            _ => None,
        })
        .collect()
}
