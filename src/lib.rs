//! dbhelper - SQL convenience helpers over a connected database driver
//!
//! `insert`, `update`, `delete` and `select` assemble statements from table,
//! column and value arguments and hand them to a [`DatabaseDriver`]. Values
//! and WHERE-template arguments are always bound as driver parameters; the
//! escaped literal form of each statement is kept for inspection.
//!
//! # Example
//! ```ignore
//! use dbhelper::{Database, DatabaseConfig, Values};
//!
//! let mut db = Database::connect(&DatabaseConfig::from_url("app.db")?).await?;
//! db.exec_sql("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)").await?;
//!
//! let id = db.insert("users", &Values::new().set("name", "John")).await?;
//! assert_eq!(db.last_sql(), Some("INSERT INTO users (\"name\") VALUES ('John')"));
//!
//! let row = db
//!     .select_simple("users", &["id", "name"], Some("id = ?"), &[id.into()], None)
//!     .await?
//!     .single_row()?;
//! let name = row.get("name")?;
//! ```

pub mod builders;
pub mod clauses;
pub mod config;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

mod client;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types for convenient access
pub use builders::SelectQuery;
pub use clauses::WhereClause;
pub use client::Database;
pub use config::DatabaseConfig;
pub use dialect::{Dialect, EscapeStyle, PlaceholderStyle};
pub use error::{DbHelperError, Result};
pub use traits::DatabaseDriver;
pub use types::{ExecOutcome, QueryResult, RawQueryResult, Row, SqlValue, Statement, Values};
