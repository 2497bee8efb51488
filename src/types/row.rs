use indexmap::IndexMap;

use crate::error::{DbHelperError, Result};

/// Driver-agnostic raw result from a database query.
/// Values are converted to text by the driver; SQL NULL is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Row id generated by the statement, for drivers that report one.
    pub last_insert_id: Option<i64>,
}

impl ExecOutcome {
    pub fn new(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

/// A single row result from a query.
/// Values are stored as text, accessed by column name and kept in the
/// order the query selected them.
#[derive(Debug, Clone)]
pub struct Row {
    values: IndexMap<String, Option<String>>,
}

impl Row {
    /// Creates a new Row from column names and values.
    pub(crate) fn new(columns: &[String], values: Vec<Option<String>>) -> Self {
        let values = columns
            .iter()
            .zip(values)
            .map(|(col, val)| (col.clone(), val))
            .collect();
        Self { values }
    }

    /// Gets a value by column name. `Ok(None)` means the column is NULL.
    pub fn get(&self, column: &str) -> Result<Option<&str>> {
        self.values
            .get(column)
            .map(|v| v.as_deref())
            .ok_or_else(|| DbHelperError::ColumnNotFound(column.to_string()))
    }

    /// Returns all column names in this row, in select order.
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(|s| s.as_str()).collect()
    }

    /// Consumes the row into a column name → value map.
    pub fn into_map(self) -> IndexMap<String, Option<String>> {
        self.values
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a query execution, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Creates a QueryResult from a RawQueryResult.
    pub fn from_raw(raw: RawQueryResult) -> Self {
        let rows = raw
            .rows
            .into_iter()
            .map(|values| Row::new(&raw.columns, values))
            .collect();
        Self {
            columns: raw.columns,
            rows,
        }
    }

    /// Extracts a single row from the result.
    /// Returns an error if the result contains zero or more than one row.
    pub fn single_row(self) -> Result<Row> {
        let actual = self.rows.len();
        let mut rows = self.rows.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => Ok(row),
            _ => Err(DbHelperError::UnexpectedRowCount {
                expected: 1,
                actual,
            }),
        }
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_row_get() {
        let columns = vec!["id".to_string(), "name".to_string(), "note".to_string()];
        let row = Row::new(&columns, vec![text("1"), text("John"), None]);

        assert_eq!(row.get("id").unwrap(), Some("1"));
        assert_eq!(row.get("name").unwrap(), Some("John"));
        assert_eq!(row.get("note").unwrap(), None);
        assert!(matches!(
            row.get("missing"),
            Err(DbHelperError::ColumnNotFound(ref c)) if c == "missing"
        ));
    }

    #[test]
    fn test_row_into_map() {
        let columns = vec!["id".to_string()];
        let map = Row::new(&columns, vec![text("7")]).into_map();
        assert_eq!(map.get("id"), Some(&text("7")));
    }

    #[test]
    fn test_row_keeps_column_order() {
        let columns = vec!["z".to_string(), "a".to_string(), "m".to_string()];
        let row = Row::new(&columns, vec![text("1"), text("2"), None]);

        assert_eq!(row.columns(), vec!["z", "a", "m"]);
        let keys: Vec<String> = row.into_map().into_keys().collect();
        assert_eq!(keys, columns);
    }

    #[test]
    fn test_query_result_single_row() {
        let raw = RawQueryResult::new(vec!["id".to_string()], vec![vec![text("1")]]);
        let row = QueryResult::from_raw(raw).single_row().unwrap();
        assert_eq!(row.get("id").unwrap(), Some("1"));
    }

    #[test]
    fn test_query_result_single_row_error_on_empty() {
        let raw = RawQueryResult::new(vec!["id".to_string()], vec![]);
        let err = QueryResult::from_raw(raw).single_row().unwrap_err();
        match err {
            DbHelperError::UnexpectedRowCount { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            _ => panic!("Expected UnexpectedRowCount error"),
        }
    }

    #[test]
    fn test_query_result_single_row_error_on_multiple() {
        let raw = RawQueryResult::new(
            vec!["id".to_string()],
            vec![vec![text("1")], vec![text("2")]],
        );
        let err = QueryResult::from_raw(raw).single_row().unwrap_err();
        match err {
            DbHelperError::UnexpectedRowCount { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            _ => panic!("Expected UnexpectedRowCount error"),
        }
    }
}
