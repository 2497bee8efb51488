mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::SelectQuery;
pub use update::UpdateBuilder;
