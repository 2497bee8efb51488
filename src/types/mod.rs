mod row;
mod sql_value;
mod statement;
mod values;

pub use row::{ExecOutcome, QueryResult, RawQueryResult, Row};
pub use sql_value::SqlValue;
pub use statement::Statement;
pub(crate) use statement::StatementWriter;
pub use values::Values;
