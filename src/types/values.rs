use crate::types::SqlValue;

/// Ordered column/value pairs used by INSERT and UPDATE.
/// Columns keep the order in which they were set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    entries: Vec<(String, SqlValue)>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. Setting the same column twice replaces the
    /// earlier value in place.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// In-place variant of [`Values::set`].
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (column, value) in iter {
            values.insert(column, value);
        }
        values
    }
}
