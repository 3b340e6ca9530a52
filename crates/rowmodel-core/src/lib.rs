//! Core types and traits for rowmodel.
//!
//! `rowmodel-core` is the foundation layer of the workspace. It defines the value
//! model and the driver contract every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Value model**: [`Value`] is the internal representation of a field;
//!   [`Representation`] selects between internal, wire (SQL literal) and external
//!   (display) forms, and [`convert`] holds the `(FieldType, Representation)` rules.
//! - **Driver contract**: [`Connector`], [`Connection`] and [`Cursor`] describe the
//!   five capabilities rowmodel needs from a driver.
//! - **Errors and events**: one [`Error`] taxonomy for the workspace, and an
//!   [`EventSink`] through which the database layer reports what it does.
//!
//! # Who Uses This Crate
//!
//! - `rowmodel-schema` classifies column types into [`FieldType`] and decodes defaults.
//! - `rowmodel-query` renders statements with [`quote_ident`] and wire literals.
//! - `rowmodel` (the facade) drives connections and records.

pub mod connection;
pub mod convert;
pub mod error;
pub mod events;
pub mod field_map;
pub mod identifiers;
pub mod row;
pub mod types;
pub mod value;

pub use connection::{Connection, Connector, Cursor};
pub use convert::{FieldSpec, parse_datetime};
pub use error::{
    ConnectionError, ConnectionErrorKind, ConsistencyError, Error, FieldError, NotFoundError,
    QueryError, Result, SchemaError, TypeError,
};
pub use events::{Event, EventSink, MemorySink, TracingSink};
pub use field_map::FieldMap;
pub use identifiers::{quote_ident, quote_string};
pub use row::Row;
pub use types::{FieldType, Representation};
pub use value::Value;

pub use chrono::NaiveDateTime;
pub use uuid::Uuid;
