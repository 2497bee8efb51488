mod where_clause;

pub use where_clause::WhereClause;
pub(crate) use where_clause::write_where;
