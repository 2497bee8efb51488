use std::sync::Arc;

use crate::builders::{DeleteBuilder, InsertBuilder, SelectQuery, UpdateBuilder};
use crate::config::DatabaseConfig;
use crate::dialect::Dialect;
use crate::drivers::{RusqliteDriver, TokioPostgresDriver};
use crate::error::{DbHelperError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{QueryResult, SqlValue, Statement, Values};

/// Convenience helpers over a connected driver.
///
/// Every helper builds a parameterized statement, records its rendered text
/// (see [`Database::last_sql`]) and forwards it to the driver. Failures are
/// returned as errors and their message is also kept in
/// [`Database::last_error`].
///
/// # Example
/// ```ignore
/// use dbhelper::{Database, Values};
///
/// let mut db = Database::connect(&DatabaseConfig::from_env()?).await?;
/// let id = db.insert("users", &Values::new().set("name", "Alice")).await?;
/// let rows = db
///     .select_simple("users", &["id", "name"], Some("id = ?"), &[id.into()], None)
///     .await?;
/// ```
pub struct Database {
    driver: Arc<dyn DatabaseDriver>,
    last_sql: Option<String>,
    last_error: Option<String>,
}

impl Database {
    /// Wrap an already connected driver.
    pub fn new(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self {
            driver,
            last_sql: None,
            last_error: None,
        }
    }

    /// Open the driver described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let driver: Arc<dyn DatabaseDriver> = match config {
            DatabaseConfig::Postgres { url } => Arc::new(TokioPostgresDriver::connect(url).await?),
            DatabaseConfig::Sqlite { path } if path.as_os_str() == ":memory:" => {
                Arc::new(RusqliteDriver::open_in_memory()?)
            }
            DatabaseConfig::Sqlite { path } => Arc::new(RusqliteDriver::open(path)?),
        };
        tracing::info!(driver = config.driver_name(), "connected");
        Ok(Self::new(driver))
    }

    /// The underlying driver.
    pub fn driver(&self) -> &Arc<dyn DatabaseDriver> {
        &self.driver
    }

    /// Rendered text of the most recent statement, values inlined as
    /// escaped literals. Set before the driver runs, so it is also
    /// available after a failure.
    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    /// Message of the most recent failure. A later success does not clear it.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Escape a string with the driver's rules.
    pub fn escape(&self, value: &str) -> String {
        self.driver.escape(value)
    }

    /// Driver status line.
    pub async fn stat(&mut self) -> Result<String> {
        let result = self.driver.stat().await;
        self.track(result)
    }

    /// Insert one row and return the generated id, or 0 when the driver
    /// does not report one.
    pub async fn insert(&mut self, table: &str, values: &Values) -> Result<i64> {
        let built = self.build(|d, e| InsertBuilder::new(table, values).build_escaped(d, e));
        let stmt = self.prepare(built)?;
        let result = self.driver.execute(&stmt.sql, &stmt.params).await;
        let outcome = self.track(result)?;
        Ok(outcome.last_insert_id.unwrap_or(0))
    }

    /// Update the rows matching the WHERE template and return how many
    /// changed. `None` updates every row.
    pub async fn update(
        &mut self,
        table: &str,
        values: &Values,
        where_clause: Option<&str>,
        where_args: &[SqlValue],
    ) -> Result<u64> {
        let built = self.build(|d, e| {
            UpdateBuilder::new(table, values)
                .where_(where_clause, where_args)
                .build_escaped(d, e)
        });
        let stmt = self.prepare(built)?;
        let result = self.driver.execute(&stmt.sql, &stmt.params).await;
        Ok(self.track(result)?.rows_affected)
    }

    /// Delete the rows matching the WHERE template and return how many were
    /// removed. `None` deletes every row.
    pub async fn delete(
        &mut self,
        table: &str,
        where_clause: Option<&str>,
        where_args: &[SqlValue],
    ) -> Result<u64> {
        let built = self.build(|d, e| {
            DeleteBuilder::new(table)
                .where_(where_clause, where_args)
                .build_escaped(d, e)
        });
        let stmt = self.prepare(built)?;
        let result = self.driver.execute(&stmt.sql, &stmt.params).await;
        Ok(self.track(result)?.rows_affected)
    }

    /// Run a SELECT and collect its rows.
    pub async fn select(&mut self, query: SelectQuery) -> Result<QueryResult> {
        let built = self.build(|d, e| query.build_escaped(d, e));
        let stmt = self.prepare(built)?;
        let result = self.driver.query(&stmt.sql, &stmt.params).await;
        let raw = self.track(result)?;
        Ok(QueryResult::from_raw(raw))
    }

    /// SELECT with every clause spelled out. `None` leaves a clause out;
    /// `having` only applies together with `group_by`.
    #[allow(clippy::too_many_arguments)]
    pub async fn select_full(
        &mut self,
        table: &str,
        columns: &[&str],
        where_clause: Option<&str>,
        where_args: &[SqlValue],
        group_by: Option<&str>,
        having: Option<&str>,
        order_by: Option<&str>,
        limit: Option<&str>,
        distinct: bool,
    ) -> Result<QueryResult> {
        let mut query = SelectQuery::new(table, columns.iter().copied()).distinct(distinct);
        if let Some(clause) = where_clause {
            query = query.where_(clause, where_args.iter().cloned());
        }
        if let Some(group_by) = group_by {
            query = query.group_by(group_by);
        }
        if let Some(having) = having {
            query = query.having(having);
        }
        if let Some(order_by) = order_by {
            query = query.order_by(order_by);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.select(query).await
    }

    /// SELECT with only WHERE and ORDER BY.
    pub async fn select_simple(
        &mut self,
        table: &str,
        columns: &[&str],
        where_clause: Option<&str>,
        where_args: &[SqlValue],
        order_by: Option<&str>,
    ) -> Result<QueryResult> {
        self.select_full(
            table,
            columns,
            where_clause,
            where_args,
            None,
            None,
            order_by,
            None,
            false,
        )
        .await
    }

    /// Run raw SQL as is. Nothing is escaped or bound, so `sql` must not
    /// contain untrusted input.
    pub async fn exec_sql(&mut self, sql: &str) -> Result<()> {
        tracing::debug!(sql, "executing raw SQL");
        self.last_sql = Some(sql.to_string());
        let result = self.driver.execute(sql, &[]).await;
        self.track(result).map(|_| ())
    }

    /// Build with the driver's dialect, rendering literals through the
    /// driver's own escaping.
    fn build<F>(&self, f: F) -> Result<Statement>
    where
        F: FnOnce(&Dialect, &dyn Fn(&str) -> String) -> Result<Statement>,
    {
        let dialect = self.driver.dialect();
        let escape = |value: &str| self.driver.escape(value);
        f(&dialect, &escape)
    }

    fn prepare(&mut self, built: Result<Statement>) -> Result<Statement> {
        let stmt = self.track(built)?;
        tracing::debug!(sql = %stmt.rendered, params = stmt.params.len(), "executing");
        self.last_sql = Some(stmt.rendered.clone());
        Ok(stmt)
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ref err) = result {
            tracing::warn!(error = %err, "statement failed");
            let message = match err {
                DbHelperError::QueryFailed(m) | DbHelperError::ConnectionFailed(m) => m.clone(),
                other => other.to_string(),
            };
            self.last_error = Some(message);
        }
        result
    }
}
