use crate::dialect::Dialect;
use crate::error::{DbHelperError, Result};
use crate::types::{Statement, StatementWriter, Values};

/// Builds `INSERT INTO table (`c1`,`c2`) VALUES (?,?)` for one row.
pub struct InsertBuilder<'a> {
    table: &'a str,
    values: &'a Values,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(table: &'a str, values: &'a Values) -> Self {
        Self { table, values }
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
        w.push_str("INSERT INTO ");
        w.push_str(self.table);

        w.push_str(" (");
        for (i, column) in self.values.columns().enumerate() {
            if i > 0 {
                w.push_char(',');
            }
            w.push_identifier(column);
        }

        w.push_str(") VALUES (");
        for (i, (_, value)) in self.values.iter().enumerate() {
            if i > 0 {
                w.push_char(',');
            }
            w.push_param(value);
        }
        w.push_char(')');

        Ok(w.finish())
    }
}
