//! SQL text generation for rowmodel.
//!
//! [`clause`] holds the independent statement fragments (column list, WHERE,
//! ORDER BY, GROUP BY, LIMIT, JOIN); [`builder`] assembles them into complete
//! statements. Column names used in ORDER BY, GROUP BY and projections are checked
//! against the table [`Schema`](rowmodel_schema::Schema) before any SQL is produced.

pub mod builder;
pub mod clause;

pub use builder::{Select, insert_statement, update_statement};
pub use clause::{
    Direction, Limit, Order, Where, field_list, group_clause, join_clause, limit_clause,
    order_clause, set_clause, value_list,
};
