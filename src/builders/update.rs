use crate::clauses::write_where;
use crate::dialect::Dialect;
use crate::error::{DbHelperError, Result};
use crate::types::{SqlValue, Statement, StatementWriter, Values};

/// Builds `UPDATE table SET `c1`=?,`c2`=? [WHERE ...]`.
/// Without a WHERE template every row is updated.
pub struct UpdateBuilder<'a> {
    table: &'a str,
    values: &'a Values,
    where_clause: Option<&'a str>,
    where_args: &'a [SqlValue],
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(table: &'a str, values: &'a Values) -> Self {
        Self {
            table,
            values,
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
        if self.values.is_empty() {
            return Err(DbHelperError::EmptyValues(self.table.to_string()));
        }

        let mut w = StatementWriter::new(dialect, escape);
        w.push_str("UPDATE ");
        w.push_str(self.table);
        w.push_str(" SET ");
        for (i, (column, value)) in self.values.iter().enumerate() {
            if i > 0 {
                w.push_char(',');
            }
            w.push_identifier(column);
            w.push_char('=');
            w.push_param(value);
        }

        write_where(&mut w, self.where_clause, self.where_args)?;
        Ok(w.finish())
    }
}
