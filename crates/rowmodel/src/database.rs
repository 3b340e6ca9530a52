//! Connection ownership and statement execution.

use std::cell::RefCell;
use std::fmt;
use std::time::Instant;

use rowmodel_core::{Connection, Connector, Cursor, Error, Event, EventSink, Result, TracingSink};
use rowmodel_schema::introspect;

use crate::table::Table;

/// A handle on one database, owning at most one live connection.
///
/// The connection is opened lazily on first use. Every statement goes through
/// [`execute`](Self::execute), which probes the connection first and recovers from the
/// server going away by reconnecting once.
///
/// `Database` is not `Sync`: sharing it across threads needs external serialization.
pub struct Database<K: Connector> {
    connector: K,
    connection: RefCell<Option<K::Connection>>,
    sink: Box<dyn EventSink>,
}

impl<K: Connector> Database<K> {
    /// Create a database handle. No connection is opened yet.
    pub fn new(connector: K) -> Self {
        Self {
            connector,
            connection: RefCell::new(None),
            sink: Box::new(TracingSink),
        }
    }

    /// Route events to `sink` instead of `tracing`.
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn connector(&self) -> &K {
        &self.connector
    }

    /// Whether a connection is currently held. Does not probe it.
    pub fn is_connected(&self) -> bool {
        self.connection.borrow().is_some()
    }

    /// Open a fresh connection, replacing any existing one.
    pub fn connect(&self) -> Result<()> {
        self.connection.replace(None);
        let conn = self.open()?;
        self.connection.replace(Some(conn));
        Ok(())
    }

    /// Drop the live connection, if any.
    pub fn disconnect(&self) {
        if self.connection.replace(None).is_some() {
            tracing::debug!("Disconnected");
        }
    }

    /// Make sure a usable connection exists.
    ///
    /// Opens one when none is held; otherwise probes the current one and reconnects
    /// if the server has gone away. Other probe failures are returned as-is.
    pub fn ping(&self) -> Result<()> {
        self.ensure_live().map(|_| ())
    }

    /// Execute one statement.
    ///
    /// At most one reconnect happens per call: either after the liveness probe or after
    /// the statement itself fails with a server-gone error. A second server-gone failure
    /// is returned to the caller.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn execute(&self, sql: &str) -> Result<Cursor> {
        let mut reconnected = self.ensure_live()?;
        loop {
            let started = Instant::now();
            match self.run(sql) {
                Ok(cursor) => {
                    self.sink.emit(&Event::StatementExecuted {
                        sql: sql.to_string(),
                        rows: cursor.rows().len(),
                        affected_rows: cursor.affected_rows(),
                        elapsed: started.elapsed(),
                    });
                    return Ok(cursor);
                }
                Err(err) if err.is_transient() && !reconnected => {
                    self.reconnect(&err)?;
                    reconnected = true;
                }
                Err(err) => {
                    self.sink.emit(&Event::StatementFailed {
                        sql: sql.to_string(),
                        error: err.to_string(),
                    });
                    return Err(err.with_sql(sql));
                }
            }
        }
    }

    /// Describe `name` and return a handle on it.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn table(&self, name: &str) -> Result<Table<'_, K>> {
        let schema = introspect(name, |sql| self.execute(sql))?;
        self.sink.emit(&Event::SchemaLoaded {
            table: name.to_string(),
            fields: schema.len(),
        });
        Ok(Table::new(self, schema))
    }

    pub(crate) fn emit(&self, event: &Event) {
        self.sink.emit(event);
    }

    /// Returns whether a reconnect happened.
    fn ensure_live(&self) -> Result<bool> {
        let probe = self.connection.borrow_mut().as_mut().map(Connection::ping);
        match probe {
            None => {
                let conn = self.open()?;
                self.connection.replace(Some(conn));
                Ok(false)
            }
            Some(Ok(())) => Ok(false),
            Some(Err(err)) if err.is_transient() => {
                self.reconnect(&err)?;
                Ok(true)
            }
            Some(Err(err)) => Err(err),
        }
    }

    fn run(&self, sql: &str) -> Result<Cursor> {
        let mut slot = self.connection.borrow_mut();
        match slot.as_mut() {
            Some(conn) => conn.execute(sql),
            None => Err(Error::closed("no open connection")),
        }
    }

    fn open(&self) -> Result<K::Connection> {
        let conn = self.connector.connect()?;
        self.sink.emit(&Event::Connected);
        Ok(conn)
    }

    fn reconnect(&self, reason: &Error) -> Result<()> {
        self.connection.replace(None);
        let conn = self.connector.connect()?;
        self.connection.replace(Some(conn));
        self.sink.emit(&Event::Reconnected {
            reason: reason.to_string(),
        });
        Ok(())
    }
}

impl<K: Connector + fmt::Debug> fmt::Debug for Database<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("connector", &self.connector)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
