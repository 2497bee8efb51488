use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};

use crate::dialect::Dialect;
use crate::error::{DbHelperError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{ExecOutcome, RawQueryResult, SqlValue};

type SharedConnection = Arc<Mutex<Connection>>;

/// SQLite driver implementation using rusqlite.
/// Every call runs on the blocking thread pool.
pub struct RusqliteDriver {
    conn: SharedConnection,
}

impl RusqliteDriver {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| DbHelperError::ConnectionFailed(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DbHelperError::ConnectionFailed(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already opened connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run_blocking<F, R>(&self, func: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| DbHelperError::QueryFailed("sqlite connection lock poisoned".into()))?;
            func(&guard).map_err(|e| DbHelperError::QueryFailed(e.to_string()))
        })
        .await
        .map_err(|e| DbHelperError::QueryFailed(format!("sqlite spawn_blocking join error: {e}")))?
    }
}

#[async_trait]
impl DatabaseDriver for RusqliteDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        let sql = sql.to_string();
        let values = convert_params(params);
        self.run_blocking(move |conn| {
            {
                let mut stmt = conn.prepare(&sql)?;
                // Stepping through `query` also runs statements that return rows.
                let mut rows = stmt.query(params_from_iter(values))?;
                while rows.next()?.is_some() {}
            }
            Ok(ExecOutcome::new(
                conn.changes() as u64,
                Some(conn.last_insert_rowid()),
            ))
        })
        .await
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let sql = sql.to_string();
        let values = convert_params(params);
        self.run_blocking(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let column_count = columns.len();

            let mut result_rows = Vec::new();
            let mut rows = stmt.query(params_from_iter(values))?;
            while let Some(row) = rows.next()? {
                let mut row_values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    row_values.push(value_ref_to_string(row.get_ref(i)?));
                }
                result_rows.push(row_values);
            }

            Ok(RawQueryResult::new(columns, result_rows))
        })
        .await
    }

    async fn stat(&self) -> Result<String> {
        self.run_blocking(|conn| {
            let version: String = conn.query_row("SELECT sqlite_version()", [], |r| r.get(0))?;
            let pages: i64 = conn.query_row("PRAGMA page_count", [], |r| r.get(0))?;
            Ok(format!("SQLite {}  Pages: {}", version, pages))
        })
        .await
    }

    fn dialect(&self) -> Dialect {
        Dialect::sqlite()
    }
}

fn convert_params(params: &[SqlValue]) -> Vec<Value> {
    params
        .iter()
        .map(|p| match p {
            SqlValue::Null => Value::Null,
            SqlValue::Text(s) => Value::Text(s.clone()),
            SqlValue::Int32(i) => Value::Integer(i64::from(*i)),
            SqlValue::Int64(i) => Value::Integer(*i),
            SqlValue::Float64(f) => Value::Real(*f),
            SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        })
        .collect()
}

fn value_ref_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}
