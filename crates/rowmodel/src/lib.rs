//! Schema-aware record access for MySQL tables.
//!
//! rowmodel maps table rows onto [`Record`]s whose columns are discovered at runtime
//! with ``DESCRIBE `table` ``. Records track which fields changed since they were
//! loaded, so saving one writes only those fields.
//!
//! # Design Philosophy
//!
//! - **No declared models**: a [`Table`] learns its columns from the server
//! - **Three representations**: every field can be read as its internal value, as a
//!   SQL literal (wire) or in a display-oriented external form
//! - **Synchronous**: one statement per call, one connection per [`Database`]
//! - **Self-healing connection**: a server that went away is reconnected once per
//!   statement, transparently
//!
//! # Example
//!
//! ```ignore
//! let db = Database::new(connector);
//! let users = db.table("users")?;
//!
//! let mut user = users.create();
//! user.set("Name", "Alice")?;
//! user.save()?;                       // INSERT, then re-read the stored row
//!
//! let mut user = users.get(42, &GetOptions::new())?.expect("fail_if_missing");
//! user.set("Name", "Bob")?;
//! user.save()?;                       // UPDATE `users` SET `Name` = 'Bob' WHERE `Id` = 42;
//!
//! let recent = users.select(
//!     &Select::new()
//!         .filter("`Created` > NOW() - INTERVAL 1 DAY")
//!         .order_by(Order::desc("Created"))
//!         .limit(10),
//! )?;
//! ```
//!
//! Drivers plug in through [`Connector`] and [`Connection`]; `rowmodel-mysql` carries
//! the MySQL configuration and error-code mapping they need.

pub mod database;
pub mod record;
pub mod record_set;
pub mod table;

pub use database::Database;
pub use record::Record;
pub use record_set::RecordSet;
pub use table::{GetOptions, Table};

pub use rowmodel_core::{
    Connection, ConnectionErrorKind, Connector, Cursor, Error, Event, EventSink, FieldMap,
    FieldType, MemorySink, NaiveDateTime, Representation, Result, Row, TracingSink, Uuid, Value,
};
pub use rowmodel_mysql::{MySqlConfig, error_from_code};
pub use rowmodel_query::{Direction, Limit, Order, Select, Where};
pub use rowmodel_schema::{FieldMeta, KeyRole, PRIMARY, Schema};

/// MySQL configuration and dialect.
pub mod mysql {
    pub use rowmodel_mysql::*;
}

/// Everything needed for typical use.
pub mod prelude {
    pub use crate::{
        Database, Direction, Error, FieldMap, GetOptions, Order, Record, RecordSet,
        Representation, Result, Select, Table, Value, Where,
    };
    pub use rowmodel_core::{Connection, Connector, Cursor, Row};
}
