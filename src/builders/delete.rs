use crate::clauses::write_where;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::types::{SqlValue, Statement, StatementWriter};

/// Builds `DELETE FROM table [WHERE ...]`.
/// Without a WHERE template every row is deleted.
pub struct DeleteBuilder<'a> {
    table: &'a str,
    where_clause: Option<&'a str>,
    where_args: &'a [SqlValue],
}

impl<'a> DeleteBuilder<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            where_clause: None,
            where_args: &[],
        }
    }

    pub fn where_(mut self, clause: Option<&'a str>, args: &'a [SqlValue]) -> Self {
        self.where_clause = clause;
        self.where_args = args;
        self
    }

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
        w.push_str("DELETE FROM ");
        w.push_str(self.table);
        write_where(&mut w, self.where_clause, self.where_args)?;
        Ok(w.finish())
    }
}
