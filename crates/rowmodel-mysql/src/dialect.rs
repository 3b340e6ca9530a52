//! MySQL dialect facts a driver needs to plug into rowmodel.
//!
//! Drivers report failures with the server or client error number; [`error_from_code`]
//! maps that number onto the rowmodel error taxonomy so the database layer can tell
//! the recoverable "server has gone away" family apart from everything else.

use rowmodel_core::Error;

/// Client error: the server closed the connection (`CR_SERVER_GONE_ERROR`).
pub const CR_SERVER_GONE_ERROR: u16 = 2006;
/// Client error: the connection was lost mid-query (`CR_SERVER_LOST`).
pub const CR_SERVER_LOST: u16 = 2013;
/// Client error: could not connect to the server (`CR_CONN_HOST_ERROR`).
pub const CR_CONN_HOST_ERROR: u16 = 2003;
/// Server error: the table does not exist (`ER_NO_SUCH_TABLE`).
pub const ER_NO_SUCH_TABLE: u16 = 1146;

/// True for the error numbers that mean the connection is dead and worth re-opening.
pub const fn is_server_gone(code: u16) -> bool {
    matches!(code, CR_SERVER_GONE_ERROR | CR_SERVER_LOST)
}

/// Map a MySQL error number and message onto [`Error`].
///
/// ```
/// use rowmodel_mysql::{CR_SERVER_GONE_ERROR, error_from_code};
///
/// let err = error_from_code(CR_SERVER_GONE_ERROR, "MySQL server has gone away", None);
/// assert!(err.is_transient());
/// ```
pub fn error_from_code(code: u16, message: &str, sql: Option<&str>) -> Error {
    if is_server_gone(code) {
        return Error::server_gone(format!("({}) {}", code, message));
    }
    if code == CR_CONN_HOST_ERROR {
        return Error::connect(format!("({}) {}", code, message));
    }
    Error::query(message, sql.map(str::to_string), Some(code))
}
