use crate::dialect::{literal_with, Dialect};
use crate::types::SqlValue;

/// A statement ready for the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL with driver placeholders.
    pub sql: String,
    /// Bound values, in placeholder order.
    pub params: Vec<SqlValue>,
    /// The same statement with every value inlined as an escaped literal.
    /// Used for inspection and logging only, never executed.
    pub rendered: String,
}

/// Writes the parameterized and the rendered form of a statement side by
/// side so the two can never drift apart.
pub(crate) struct StatementWriter<'a> {
    dialect: &'a Dialect,
    escape: &'a dyn Fn(&str) -> String,
    sql: String,
    rendered: String,
    params: Vec<SqlValue>,
}

impl<'a> StatementWriter<'a> {
    /// `escape` is applied to the text of every value in the rendered form.
    pub(crate) fn new(dialect: &'a Dialect, escape: &'a dyn Fn(&str) -> String) -> Self {
        Self {
            dialect,
            escape,
            sql: String::with_capacity(256),
            rendered: String::with_capacity(256),
            params: Vec::new(),
        }
    }

    pub(crate) fn dialect(&self) -> &Dialect {
        self.dialect
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
        self.rendered.push_str(s);
    }

    pub(crate) fn push_char(&mut self, c: char) {
        self.sql.push(c);
        self.rendered.push(c);
    }

    pub(crate) fn push_identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.push_str(&quoted);
    }

    pub(crate) fn push_param(&mut self, value: &SqlValue) {
        self.params.push(value.clone());
        self.sql
            .push_str(&self.dialect.placeholder(self.params.len()));
        self.rendered.push_str(&literal_with(value, self.escape));
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
            rendered: self.rendered,
        }
    }
}
