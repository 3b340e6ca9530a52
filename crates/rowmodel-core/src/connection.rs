//! The driver boundary.
//!
//! rowmodel does not speak any wire protocol itself. A driver provides a
//! [`Connector`] that opens [`Connection`]s, and each executed statement yields a
//! [`Cursor`] carrying the fetched rows, the affected-row count and the last insert id.
//!
//! Drivers must report the "server has gone away" family of failures as
//! [`Error::server_gone`](crate::Error::server_gone) so the database layer can tell it
//! apart from every other failure; everything else should be a query or connect error.

use crate::error::Result;
use crate::row::Row;

/// The outcome of one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    rows: Vec<Row>,
    affected_rows: u64,
    last_insert_id: Option<u64>,
}

impl Cursor {
    /// Cursor for a statement that returned rows.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            affected_rows: rows.len() as u64,
            rows,
            last_insert_id: None,
        }
    }

    /// Cursor for a write statement.
    pub fn with_affected(affected_rows: u64, last_insert_id: Option<u64>) -> Self {
        Self {
            rows: Vec::new(),
            affected_rows,
            last_insert_id,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Take every fetched row.
    pub fn fetch_all(self) -> Vec<Row> {
        self.rows
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// Identity generated by the last INSERT, when the driver reports a non-zero one.
    pub fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id.filter(|id| *id != 0)
    }
}

/// A live, synchronous database connection running in auto-commit mode.
pub trait Connection {
    /// Cheap liveness probe (`mysql_ping` or `SELECT 1`).
    fn ping(&mut self) -> Result<()>;

    /// Execute one statement of rendered SQL text.
    fn execute(&mut self, sql: &str) -> Result<Cursor>;
}

/// Opens connections. Called once up front and again on every reconnect.
pub trait Connector {
    type Connection: Connection;

    fn connect(&self) -> Result<Self::Connection>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn ping(&mut self) -> Result<()> {
        (**self).ping()
    }

    fn execute(&mut self, sql: &str) -> Result<Cursor> {
        (**self).execute(sql)
    }
}
