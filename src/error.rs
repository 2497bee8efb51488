use thiserror::Error;

/// Error type for dbhelper operations
#[derive(Debug, Error)]
pub enum DbHelperError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("WHERE clause has {expected} placeholder(s) but {actual} argument(s) were given")]
    PlaceholderMismatch { expected: usize, actual: usize },

    #[error("No values given for table {0}")]
    EmptyValues(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for dbhelper operations
pub type Result<T> = std::result::Result<T, DbHelperError>;
