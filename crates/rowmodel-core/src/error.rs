//! Error types for rowmodel.
//!
//! Every fallible operation in the workspace returns [`Result`], whose error side is
//! the [`Error`] enum below. Each variant carries a small struct with the context a
//! caller needs to act on the failure (table, field, SQL text, driver code).
//!
//! Only [`ConnectionErrorKind::ServerGone`] is ever recovered internally (by the
//! database's single reconnect-and-retry); every other error reaches the caller as-is.

use std::error::Error as StdError;
use std::fmt;

/// Result alias used throughout rowmodel.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for all rowmodel operations.
#[derive(Debug)]
pub enum Error {
    /// Table metadata is missing or unusable.
    Schema(SchemaError),
    /// A field name is not part of the table's schema.
    Field(FieldError),
    /// A value could not be represented as the field's type.
    Type(TypeError),
    /// Establishing or keeping the connection failed.
    Connection(ConnectionError),
    /// A write did not affect the rows it was expected to.
    Consistency(ConsistencyError),
    /// A keyed lookup matched no row.
    NotFound(NotFoundError),
    /// The driver rejected a statement.
    Query(QueryError),
}

#[derive(Debug)]
pub struct SchemaError {
    pub table: String,
    pub message: String,
}

#[derive(Debug)]
pub struct FieldError {
    pub table: String,
    pub field: String,
}

#[derive(Debug)]
pub struct TypeError {
    pub field: String,
    /// Declared column type as reported by the server.
    pub declared_type: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Could not establish a connection. Never retried.
    Connect,
    /// The server went away under an established connection ("MySQL server has gone
    /// away" / "Lost connection"). Recovered by one reconnect-and-retry.
    ServerGone,
    /// No connection is open.
    Closed,
}

#[derive(Debug)]
pub struct ConsistencyError {
    pub table: String,
    pub message: String,
    pub sql: Option<String>,
    pub affected_rows: Option<u64>,
}

#[derive(Debug)]
pub struct NotFoundError {
    pub table: String,
    pub field: String,
    /// The key as rendered into the lookup statement.
    pub key: String,
}

#[derive(Debug)]
pub struct QueryError {
    pub message: String,
    pub sql: Option<String>,
    /// Driver-specific error number, when the driver reports one.
    pub code: Option<u16>,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema(SchemaError {
            table: table.into(),
            message: message.into(),
        })
    }

    pub fn field(table: impl Into<String>, field: impl Into<String>) -> Self {
        Error::Field(FieldError {
            table: table.into(),
            field: field.into(),
        })
    }

    pub fn type_error(
        field: impl Into<String>,
        declared_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Type(TypeError {
            field: field.into(),
            declared_type: declared_type.into(),
            message: message.into(),
        })
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Connect,
            message: message.into(),
            source: None,
        })
    }

    /// The transient "server has gone away" condition.
    pub fn server_gone(message: impl Into<String>) -> Self {
        Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::ServerGone,
            message: message.into(),
            source: None,
        })
    }

    pub fn closed(message: impl Into<String>) -> Self {
        Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Closed,
            message: message.into(),
            source: None,
        })
    }

    pub fn query(message: impl Into<String>, sql: Option<String>, code: Option<u16>) -> Self {
        Error::Query(QueryError {
            message: message.into(),
            sql,
            code,
            source: None,
        })
    }

    /// True for the one error class the database recovers from by reconnecting.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::ServerGone,
                ..
            })
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Attach the statement text to a query error that does not have one yet.
    pub fn with_sql(mut self, statement: &str) -> Self {
        if let Error::Query(QueryError { sql, .. }) = &mut self {
            if sql.is_none() {
                *sql = Some(statement.to_string());
            }
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "schema error on `{}`: {}", e.table, e.message),
            Error::Field(e) => write!(f, "field `{}` is not defined on `{}`", e.field, e.table),
            Error::Type(e) => write!(
                f,
                "type error on field `{}` ({}): {}",
                e.field, e.declared_type, e.message
            ),
            Error::Connection(e) => write!(f, "connection error: {}", e),
            Error::Consistency(e) => {
                write!(f, "consistency error on `{}`: {}", e.table, e.message)?;
                if let Some(n) = e.affected_rows {
                    write!(f, " ({} rows affected)", n)?;
                }
                Ok(())
            }
            Error::NotFound(e) => write!(
                f,
                "no row in `{}` where `{}` = {}",
                e.table, e.field, e.key
            ),
            Error::Query(e) => {
                match e.code {
                    Some(code) => write!(f, "query error {}: {}", code, e.message)?,
                    None => write!(f, "query error: {}", e.message)?,
                }
                if let Some(sql) = &e.sql {
                    write!(f, " [{}]", sql)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConnectionErrorKind::Connect => "connect failed",
            ConnectionErrorKind::ServerGone => "server has gone away",
            ConnectionErrorKind::Closed => "connection closed",
        };
        write!(f, "{}: {}", kind, self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn StdError + 'static)),
            Error::Query(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}
