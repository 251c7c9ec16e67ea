//! Storage connector abstraction and its Postgres implementation.
//!
//! Every call opens its own connection, runs inside one transaction and
//! closes the connection before returning, whether the work succeeded or
//! not.

use crate::error::{Result, StorageError};
use crate::value::{SqlRow, SqlValue, Statement};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use pricetrack_core::PostgresCredentials;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, PgConnection, Postgres, Row, Transaction, TypeInfo};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Rows submitted per page by [`StorageConnector::execute_batch`].
pub const BATCH_PAGE_SIZE: usize = 100;

/// Executes statements against the tracking database.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    /// Runs one statement for its effect and commits.
    ///
    /// # Errors
    /// Returns an error if the statement fails; the transaction is rolled back.
    async fn execute_no_return(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.execute_script(&[Statement::new(sql, params.to_vec())])
            .await
    }

    /// Runs one query and returns every row.
    ///
    /// # Errors
    /// Returns an error if the query fails or a column cannot be decoded.
    async fn execute_return(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>>;

    /// Runs the same statement once per row inside one transaction.
    ///
    /// # Errors
    /// Returns an error if any row fails; no row is committed in that case.
    async fn execute_batch(&self, sql: &str, rows: &[SqlRow]) -> Result<u64>;

    /// Runs several statements inside one transaction.
    ///
    /// # Errors
    /// Returns an error if any statement fails; nothing is committed in that case.
    async fn execute_script(&self, statements: &[Statement]) -> Result<u64>;
}

#[async_trait]
impl<C: StorageConnector + ?Sized> StorageConnector for Arc<C> {
    async fn execute_no_return(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        (**self).execute_no_return(sql, params).await
    }

    async fn execute_return(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
        (**self).execute_return(sql, params).await
    }

    async fn execute_batch(&self, sql: &str, rows: &[SqlRow]) -> Result<u64> {
        (**self).execute_batch(sql, rows).await
    }

    async fn execute_script(&self, statements: &[Statement]) -> Result<u64> {
        (**self).execute_script(statements).await
    }
}

/// Postgres connector opening a fresh connection per call.
#[derive(Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    /// Builds a connector from credentials. Absent or blank values are left
    /// to the libpq defaults (`PGHOST`, `PGPORT`, ...).
    #[must_use]
    pub fn from_credentials(credentials: &PostgresCredentials) -> Self {
        let mut options = PgConnectOptions::new();
        if let Some(dbname) = credentials.dbname() {
            options = options.database(dbname);
        }
        if let Some(user) = credentials.user() {
            options = options.username(user);
        }
        if let Some(password) = credentials.password() {
            options = options.password(password);
        }
        if let Some(host) = credentials.host() {
            options = options.host(host);
        }
        if let Some(port) = credentials.port {
            options = options.port(port);
        }
        Self { options }
    }

    /// Builds a connector from a `postgres://` URL.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed.
    pub fn from_url(url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| StorageError::validation(format!("invalid database url: {e}")))?;
        Ok(Self { options })
    }

    async fn connect(&self) -> Result<PgConnection> {
        PgConnection::connect_with(&self.options).await.map_err(|e| {
            let err = StorageError::from(e);
            tracing::error!(error = %err, "failed to connect to database");
            err
        })
    }
}

impl fmt::Debug for PgConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConnector")
            .field("host", &self.options.get_host())
            .field("port", &self.options.get_port())
            .field("database", &self.options.get_database())
            .field("username", &self.options.get_username())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StorageConnector for PgConnector {
    async fn execute_return(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
        let mut conn = self.connect().await?;
        let result = fetch_rows(&mut conn, sql, params).await;
        release(conn).await;
        result
    }

    async fn execute_batch(&self, sql: &str, rows: &[SqlRow]) -> Result<u64> {
        let mut conn = self.connect().await?;
        let result = run_batch(&mut conn, sql, rows).await;
        release(conn).await;
        result
    }

    async fn execute_script(&self, statements: &[Statement]) -> Result<u64> {
        let mut conn = self.connect().await?;
        let result = run_script(&mut conn, statements).await;
        release(conn).await;
        result
    }
}

async fn fetch_rows(conn: &mut PgConnection, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
    tracing::debug!(sql, params = params.len(), "executing query");
    let mut tx = conn.begin().await?;

    let rows = match bind_params(sqlx::query(sql), params)
        .fetch_all(&mut *tx)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return Err(abort(tx, e.into()).await),
    };

    let decoded = match rows.iter().map(decode_row).collect::<Result<Vec<_>>>() {
        Ok(decoded) => decoded,
        Err(e) => return Err(abort(tx, e).await),
    };

    tx.commit().await?;
    Ok(decoded)
}

async fn run_batch(conn: &mut PgConnection, sql: &str, rows: &[SqlRow]) -> Result<u64> {
    tracing::debug!(sql, rows = rows.len(), "executing batch");
    let mut tx = conn.begin().await?;
    let mut affected = 0;

    for page in rows.chunks(BATCH_PAGE_SIZE) {
        for row in page {
            match bind_params(sqlx::query(sql), row).execute(&mut *tx).await {
                Ok(done) => affected += done.rows_affected(),
                Err(e) => return Err(abort(tx, e.into()).await),
            }
        }
        tracing::trace!(page = page.len(), "batch page submitted");
    }

    tx.commit().await?;
    Ok(affected)
}

async fn run_script(conn: &mut PgConnection, statements: &[Statement]) -> Result<u64> {
    let mut tx = conn.begin().await?;
    let mut affected = 0;

    for statement in statements {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "executing statement");
        // Parameterless text goes through the simple protocol so it may hold several commands.
        let outcome = if statement.params.is_empty() {
            execute_raw(&mut tx, &statement.sql).await
        } else {
            bind_params(sqlx::query(&statement.sql), &statement.params)
                .execute(&mut *tx)
                .await
        };
        match outcome {
            Ok(done) => affected += done.rows_affected(),
            Err(e) => return Err(abort(tx, e.into()).await),
        }
    }

    tx.commit().await?;
    Ok(affected)
}

async fn execute_raw(
    conn: &mut PgConnection,
    sql: &str,
) -> std::result::Result<sqlx::postgres::PgQueryResult, sqlx::Error> {
    sqlx::Executor::execute(conn, sqlx::raw_sql(sql)).await
}

async fn abort(tx: Transaction<'_, Postgres>, err: StorageError) -> StorageError {
    if let Err(rollback_err) = tx.rollback().await {
        tracing::warn!(error = %rollback_err, "rollback failed");
    }
    tracing::error!(error = %err, "transaction rolled back");
    err
}

async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "failed to close database connection");
    }
}

// Null binds as text; cast in SQL (e.g. `$1::timestamptz`) for other column types.
fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Timestamp(v) => query.bind(*v),
        };
    }
    query
}

fn decode_row(row: &PgRow) -> Result<SqlRow> {
    row.columns()
        .iter()
        .map(|column| -> Result<SqlValue> {
            let idx = column.ordinal();
            let value: SqlValue = match column.type_info().name() {
                "BOOL" => row.try_get::<Option<bool>, _>(idx)?.into(),
                "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(i64::from).into(),
                "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(i64::from).into(),
                "INT8" => row.try_get::<Option<i64>, _>(idx)?.into(),
                "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(f64::from).into(),
                "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.into(),
                "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                    row.try_get::<Option<String>, _>(idx)?.into()
                }
                "TIMESTAMPTZ" => row.try_get::<Option<DateTime<Utc>>, _>(idx)?.into(),
                "TIMESTAMP" => row
                    .try_get::<Option<NaiveDateTime>, _>(idx)?
                    .map(|ts| ts.and_utc())
                    .into(),
                other => {
                    return Err(StorageError::UnsupportedColumnType {
                        column: column.name().to_string(),
                        type_name: other.to_string(),
                    })
                }
            };
            Ok(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_from_credentials() {
        let credentials = PostgresCredentials {
            dbname: Some("tracking".to_string()),
            user: Some("scraper".to_string()),
            password: Some("hunter2".to_string()),
            host: Some("db.internal".to_string()),
            port: Some(5433),
        };
        let connector = PgConnector::from_credentials(&credentials);
        assert_eq!(connector.options.get_database(), Some("tracking"));
        assert_eq!(connector.options.get_username(), "scraper");
        assert_eq!(connector.options.get_host(), "db.internal");
        assert_eq!(connector.options.get_port(), 5433);

        let debug = format!("{connector:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_blank_credentials_are_skipped() {
        let credentials = PostgresCredentials {
            dbname: Some("  ".to_string()),
            ..Default::default()
        };
        let connector = PgConnector::from_credentials(&credentials);
        assert_ne!(connector.options.get_database(), Some("  "));
    }

    #[test]
    fn test_from_url() {
        let connector = PgConnector::from_url("postgres://u:p@localhost:6543/tracking").unwrap();
        assert_eq!(connector.options.get_port(), 6543);
        assert_eq!(connector.options.get_database(), Some("tracking"));
        assert!(PgConnector::from_url("not a url").unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_unreachable_database_is_connectivity_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connector =
            PgConnector::from_url(&format!("postgres://u:p@127.0.0.1:{port}/tracking")).unwrap();
        let err = connector
            .execute_no_return("SELECT 1", &[])
            .await
            .unwrap_err();
        assert!(err.is_connectivity(), "unexpected error: {err}");
    }
}
