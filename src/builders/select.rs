use std::fmt::Display;

use crate::clauses::WhereClause;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::types::{Statement, StatementWriter};

/// A SELECT query.
///
/// Column names and the GROUP BY / HAVING / ORDER BY / LIMIT fragments are
/// written verbatim, so they may hold expressions such as `COUNT(*)` or
/// `created_at DESC`. Only WHERE arguments are bound as parameters.
///
/// # Example
/// ```
/// use dbhelper::{Dialect, SelectQuery};
///
/// let stmt = SelectQuery::new("users", ["id", "name"])
///     .where_("age > ?", [18])
///     .order_by("name")
///     .limit(10)
///     .build(&Dialect::mysql())
///     .unwrap();
///
/// assert_eq!(stmt.sql, "SELECT id,name FROM users WHERE age > ? ORDER BY name LIMIT 10");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    where_clause: Option<WhereClause>,
    group_by: Option<String>,
    having: Option<String>,
    order_by: Option<String>,
    limit: Option<String>,
    distinct: bool,
}

impl SelectQuery {
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            where_clause: None,
            group_by: None,
            having: None,
            order_by: None,
            limit: None,
            distinct: false,
        }
    }

    /// Add a WHERE clause template with its positional arguments.
    pub fn where_<I, V>(mut self, template: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<crate::types::SqlValue>,
    {
        self.where_clause = Some(WhereClause::new(template).args(args));
        self
    }

    /// Use an already built WHERE clause, or clear it with `None`.
    pub fn where_clause(mut self, clause: Option<WhereClause>) -> Self {
        self.where_clause = clause;
        self
    }

    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    /// HAVING is only emitted together with GROUP BY.
    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.having = Some(having.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Add a LIMIT. Accepts a row count or a MySQL-style `"offset, count"`.
    pub fn limit(mut self, limit: impl Display) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build the SQL statement for `dialect`.
    pub fn build(&self, dialect: &Dialect) -> Result<Statement> {
        self.build_escaped(dialect, &|s: &str| dialect.escape(s))
    }

    /// Like [`Self::build`], rendering literal values with `escape`
    /// instead of the dialect's own escaping.
    pub fn build_escaped(
        &self,
        dialect: &Dialect,
        escape: &dyn Fn(&str) -> String,
    ) -> Result<Statement> {
        let mut w = StatementWriter::new(dialect, escape);

        // SELECT clause
        w.push_str("SELECT");
        if self.distinct {
            w.push_str(" DISTINCT");
        }
        w.push_char(' ');
        if self.columns.is_empty() {
            w.push_char('*');
        } else {
            w.push_str(&self.columns.join(","));
        }

        // FROM clause
        w.push_str(" FROM ");
        w.push_str(&self.table);

        // WHERE clause
        if let Some(ref where_clause) = self.where_clause {
            where_clause.write(&mut w)?;
        }

        if let Some(ref group_by) = self.group_by {
            w.push_str(" GROUP BY ");
            w.push_str(group_by);
            if let Some(ref having) = self.having {
                w.push_str(" HAVING ");
                w.push_str(having);
            }
        }

        if let Some(ref order_by) = self.order_by {
            w.push_str(" ORDER BY ");
            w.push_str(order_by);
        }

        if let Some(ref limit) = self.limit {
            w.push_str(" LIMIT ");
            w.push_str(limit);
        }

        Ok(w.finish())
    }
}
