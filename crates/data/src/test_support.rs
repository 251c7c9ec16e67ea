//! In-memory connector used by unit tests.

use crate::database::StorageConnector;
use crate::error::{Result, StorageError};
use crate::value::{SqlRow, SqlValue, Statement};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Return { sql: String, params: Vec<SqlValue> },
    Batch { sql: String, rows: Vec<SqlRow> },
    Script(Vec<Statement>),
}

/// Records every call and emulates the keyed upsert used by batch writes:
/// column 0 is the key, column 1 the insert value, column 2 the conflict value.
#[derive(Debug, Default)]
pub struct RecordingConnector {
    calls: Mutex<Vec<Call>>,
    stored: Mutex<BTreeMap<String, SqlValue>>,
    queued: Mutex<VecDeque<Vec<SqlRow>>>,
    fail_batches: Mutex<bool>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self) -> BTreeMap<String, SqlValue> {
        self.stored.lock().unwrap().clone()
    }

    /// Queues rows for the next `execute_return` call.
    pub fn queue_rows(&self, rows: Vec<SqlRow>) {
        self.queued.lock().unwrap().push_back(rows);
    }

    pub fn fail_batches(&self) {
        *self.fail_batches.lock().unwrap() = true;
    }

    pub fn batches(&self) -> Vec<(String, Vec<SqlRow>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Batch { sql, rows } => Some((sql, rows)),
                _ => None,
            })
            .collect()
    }

    pub fn scripts(&self) -> Vec<Vec<Statement>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Script(statements) => Some(statements),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl StorageConnector for RecordingConnector {
    async fn execute_return(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
        self.calls.lock().unwrap().push(Call::Return {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        Ok(self.queued.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute_batch(&self, sql: &str, rows: &[SqlRow]) -> Result<u64> {
        self.calls.lock().unwrap().push(Call::Batch {
            sql: sql.to_string(),
            rows: rows.to_vec(),
        });
        if *self.fail_batches.lock().unwrap() {
            return Err(StorageError::Integrity("simulated failure".to_string()));
        }

        let mut stored = self.stored.lock().unwrap();
        for row in rows {
            let key = row[0].as_str().unwrap_or_default().to_string();
            let value = if stored.contains_key(&key) {
                row[2].clone()
            } else {
                row[1].clone()
            };
            stored.insert(key, value);
        }
        Ok(rows.len() as u64)
    }

    async fn execute_script(&self, statements: &[Statement]) -> Result<u64> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Script(statements.to_vec()));
        Ok(statements.len() as u64)
    }
}
