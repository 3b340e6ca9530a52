//! Runtime table introspection for rowmodel.
//!
//! Tables are not declared in Rust. Instead the column list, types, nullability,
//! defaults and primary key are read from the server once per table handle, and
//! every record operation is validated against the resulting [`Schema`].

pub mod catalog;
pub mod introspect;
pub mod schema;

pub use catalog::classify;
pub use introspect::{
    DESCRIBE_COLUMNS, decode_default, describe_statement, introspect, schema_from_rows,
};
pub use schema::{FieldMeta, KeyRole, PRIMARY, Schema};
