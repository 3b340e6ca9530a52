//! Scripted in-memory connector shared by the integration tests.
//!
//! The connector answers ``DESCRIBE `t` `` from registered table descriptions and
//! every other statement from a queue of canned results, recording each statement
//! that reached it. Server-gone failures can be injected on ping, execute or connect.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use rowmodel::mysql::{CR_CONN_HOST_ERROR, CR_SERVER_GONE_ERROR, CR_SERVER_LOST};
use rowmodel::{
    Connection, Connector, Cursor, Database, MemorySink, Result, Row, Value, error_from_code,
};

#[derive(Debug)]
enum Reply {
    Cursor(Cursor),
    Error { code: u16, message: String },
}

#[derive(Debug, Default)]
struct MockState {
    tables: HashMap<String, Vec<Row>>,
    replies: VecDeque<Reply>,
    executed: Vec<String>,
    attempts: usize,
    connects: usize,
    pings: usize,
    failing_pings: usize,
    failing_executes: usize,
    failing_connects: usize,
}

/// Connector whose connections all share one scripted state.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Rc<RefCell<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `DESCRIBE` rows for `table`.
    pub fn with_table(self, table: &str, describe: Vec<Row>) -> Self {
        self.state
            .borrow_mut()
            .tables
            .insert(table.to_string(), describe);
        self
    }

    /// Queue a result set for the next non-DESCRIBE statement.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.state
            .borrow_mut()
            .replies
            .push_back(Reply::Cursor(Cursor::with_rows(rows)));
    }

    /// Queue a write outcome for the next non-DESCRIBE statement.
    pub fn push_affected(&self, affected_rows: u64, last_insert_id: Option<u64>) {
        self.state
            .borrow_mut()
            .replies
            .push_back(Reply::Cursor(Cursor::with_affected(affected_rows, last_insert_id)));
    }

    /// Queue a MySQL error for the next non-DESCRIBE statement.
    pub fn push_error(&self, code: u16, message: &str) {
        self.state.borrow_mut().replies.push_back(Reply::Error {
            code,
            message: message.to_string(),
        });
    }

    /// The next `n` pings report that the server has gone away.
    pub fn fail_next_pings(&self, n: usize) {
        self.state.borrow_mut().failing_pings = n;
    }

    /// The next `n` statements fail with "server has gone away" before running.
    pub fn fail_next_executes(&self, n: usize) {
        self.state.borrow_mut().failing_executes = n;
    }

    /// The next `n` connection attempts are refused.
    pub fn fail_next_connects(&self, n: usize) {
        self.state.borrow_mut().failing_connects = n;
    }

    /// Statements that ran successfully, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.borrow().executed.clone()
    }

    /// The last successful statement.
    pub fn last_statement(&self) -> Option<String> {
        self.state.borrow().executed.last().cloned()
    }

    /// Every execute call, including failed ones.
    pub fn attempts(&self) -> usize {
        self.state.borrow().attempts
    }

    pub fn connects(&self) -> usize {
        self.state.borrow().connects
    }

    pub fn pings(&self) -> usize {
        self.state.borrow().pings
    }
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    fn connect(&self) -> Result<MockConnection> {
        let mut state = self.state.borrow_mut();
        if state.failing_connects > 0 {
            state.failing_connects -= 1;
            return Err(error_from_code(
                CR_CONN_HOST_ERROR,
                "Can't connect to MySQL server on 'mock'",
                None,
            ));
        }
        state.connects += 1;
        Ok(MockConnection {
            state: Rc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub struct MockConnection {
    state: Rc<RefCell<MockState>>,
}

impl Connection for MockConnection {
    fn ping(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.pings += 1;
        if state.failing_pings > 0 {
            state.failing_pings -= 1;
            return Err(error_from_code(
                CR_SERVER_GONE_ERROR,
                "MySQL server has gone away",
                None,
            ));
        }
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<Cursor> {
        let mut state = self.state.borrow_mut();
        state.attempts += 1;
        if state.failing_executes > 0 {
            state.failing_executes -= 1;
            return Err(error_from_code(
                CR_SERVER_LOST,
                "Lost connection to MySQL server during query",
                Some(sql),
            ));
        }

        let cursor = if let Some(table) = described_table(sql) {
            match state.tables.get(table) {
                Some(rows) => Cursor::with_rows(rows.clone()),
                None => {
                    return Err(error_from_code(
                        rowmodel::mysql::ER_NO_SUCH_TABLE,
                        &format!("Table 'mock.{}' doesn't exist", table),
                        Some(sql),
                    ));
                }
            }
        } else {
            match state.replies.pop_front() {
                Some(Reply::Cursor(cursor)) => cursor,
                Some(Reply::Error { code, message }) => {
                    return Err(error_from_code(code, &message, Some(sql)));
                }
                None => Cursor::with_rows(Vec::new()),
            }
        };
        state.executed.push(sql.to_string());
        Ok(cursor)
    }
}

fn described_table(sql: &str) -> Option<&str> {
    sql.strip_prefix("DESCRIBE `")?.strip_suffix('`')
}

/// One `DESCRIBE` row: Field, Type, Null, Key, Default, Extra.
pub fn describe_row(
    name: &str,
    ty: &str,
    null: &str,
    key: &str,
    default: Option<&str>,
    extra: &str,
) -> Row {
    Row::new(vec![
        Value::from(name),
        Value::from(ty),
        Value::from(null),
        Value::from(key),
        Value::from(default),
        Value::from(extra),
    ])
}

/// `users`: `Id` int auto-increment primary key, `Name` varchar, `Created` datetime.
pub fn users_describe() -> Vec<Row> {
    vec![
        describe_row("Id", "int(11)", "NO", "PRI", None, "auto_increment"),
        describe_row("Name", "varchar(64)", "YES", "", None, ""),
        describe_row("Created", "datetime", "YES", "", Some("CURRENT_TIMESTAMP"), ""),
    ]
}

/// `sessions`: client-assigned `binary(16)` UUID primary key.
pub fn sessions_describe() -> Vec<Row> {
    vec![
        describe_row("Token", "binary(16)", "NO", "PRI", None, ""),
        describe_row("UserId", "int(11)", "NO", "MUL", Some("0"), ""),
        describe_row("Expires", "datetime", "YES", "", None, ""),
    ]
}

/// `audit`: no primary key.
pub fn audit_describe() -> Vec<Row> {
    vec![
        describe_row("UserId", "int(11)", "NO", "", None, ""),
        describe_row("Action", "varchar(32)", "NO", "", None, ""),
    ]
}

/// A stored `users` row.
pub fn user_row(id: i64, name: &str, created: &str) -> Row {
    Row::new(vec![Value::Int(id), Value::from(name), Value::from(created)])
}

/// Connector with every fixture table registered.
pub fn connector() -> MockConnector {
    MockConnector::new()
        .with_table("users", users_describe())
        .with_table("sessions", sessions_describe())
        .with_table("audit", audit_describe())
}

/// A database over `conn` whose events land in the returned sink.
pub fn database(conn: &MockConnector) -> (Database<MockConnector>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let db = Database::new(conn.clone()).with_event_sink(Arc::clone(&sink));
    (db, sink)
}
