//! Structured events emitted by the database layer.
//!
//! rowmodel never writes log output itself. Everything worth observing is turned
//! into an [`Event`] and handed to an [`EventSink`]. The default [`TracingSink`]
//! forwards events to `tracing`; [`MemorySink`] keeps them for inspection.

use std::sync::Mutex;
use std::time::Duration;

/// Something observable happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A connection was opened.
    Connected,
    /// The server went away and the connection was re-established.
    Reconnected { reason: String },
    /// A statement ran to completion.
    StatementExecuted {
        sql: String,
        rows: usize,
        affected_rows: u64,
        elapsed: Duration,
    },
    /// A statement failed.
    StatementFailed { sql: String, error: String },
    /// A table's columns were described.
    SchemaLoaded { table: String, fields: usize },
    /// A record was written.
    RecordSaved {
        table: String,
        /// Wire literal of the row's key; `None` for tables without a primary key.
        identity: Option<String>,
        inserted: bool,
    },
}

/// Receiver for [`Event`]s.
pub trait EventSink {
    fn emit(&self, event: &Event);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &Event) {
        match event {
            Event::Connected => tracing::info!("Connected to database"),
            Event::Reconnected { reason } => {
                tracing::warn!(reason = %reason, "Server went away; reconnected");
            }
            Event::StatementExecuted {
                sql,
                rows,
                affected_rows,
                elapsed,
            } => tracing::debug!(
                sql = %sql,
                rows,
                affected_rows,
                elapsed_us = elapsed.as_micros(),
                "Statement executed"
            ),
            Event::StatementFailed { sql, error } => {
                tracing::debug!(sql = %sql, error = %error, "Statement failed");
            }
            Event::SchemaLoaded { table, fields } => {
                tracing::debug!(table = %table, fields, "Schema loaded");
            }
            Event::RecordSaved {
                table,
                identity,
                inserted,
            } => {
                tracing::debug!(
                    table = %table,
                    identity = identity.as_deref().unwrap_or("-"),
                    inserted,
                    "Record saved"
                );
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// SQL text of every executed statement, in order.
    pub fn statements(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::StatementExecuted { sql, .. } => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn reconnects(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Reconnected { .. }))
            .count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: &Event) {
        (**self).emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_statements() {
        let sink = MemorySink::new();
        sink.emit(&Event::Connected);
        sink.emit(&Event::StatementExecuted {
            sql: "SELECT 1;".into(),
            rows: 1,
            affected_rows: 1,
            elapsed: Duration::ZERO,
        });
        sink.emit(&Event::Reconnected {
            reason: "gone".into(),
        });
        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.statements(), vec!["SELECT 1;".to_string()]);
        assert_eq!(sink.reconnects(), 1);
    }
}
