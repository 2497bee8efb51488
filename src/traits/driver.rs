use async_trait::async_trait;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::types::{ExecOutcome, RawQueryResult, SqlValue};

/// Trait for database driver implementations.
/// A driver wraps an already established session and is responsible for:
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
/// - Describing its SQL dialect
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Execute a statement that does not return rows.
    /// Parameters use the placeholders of [`DatabaseDriver::dialect`].
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome>;

    /// Execute a query and collect its rows.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    /// Human-readable description of the server state.
    async fn stat(&self) -> Result<String>;

    fn dialect(&self) -> Dialect {
        Dialect::mysql()
    }

    /// Escape a string for use inside a single-quoted literal.
    fn escape(&self, value: &str) -> String {
        self.dialect().escape(value)
    }
}
