//! Building a [`Schema`] from a live table description.
//!
//! The description comes from ``DESCRIBE `table` ``, which returns one row per column
//! in column order: `Field`, `Type`, `Null`, `Key`, `Default`, `Extra`.

use rowmodel_core::{Cursor, Error, FieldType, Result, Row, Value, parse_datetime, quote_ident};

use crate::catalog::classify;
use crate::schema::{FieldMeta, KeyRole, Schema};

/// Column names of a `DESCRIBE` result, in order.
pub const DESCRIBE_COLUMNS: [&str; 6] = ["Field", "Type", "Null", "Key", "Default", "Extra"];

/// The statement that describes `table`.
pub fn describe_statement(table: &str) -> String {
    format!("DESCRIBE {}", quote_ident(table))
}

/// Describe `table` and build its schema.
///
/// `execute` runs the `DESCRIBE` statement, typically on a live connection. Its
/// errors are returned unchanged, so a connection that cannot be opened surfaces as
/// [`Error::Connection`].
#[tracing::instrument(level = "debug", skip(execute))]
pub fn introspect<F>(table: &str, execute: F) -> Result<Schema>
where
    F: FnOnce(&str) -> Result<Cursor>,
{
    let rows = execute(&describe_statement(table))?.fetch_all();
    schema_from_rows(table, &rows)
}

/// Build a schema from already-fetched `DESCRIBE` rows.
pub fn schema_from_rows(table: &str, rows: &[Row]) -> Result<Schema> {
    let fields = rows
        .iter()
        .map(|row| field_from_row(table, row))
        .collect::<Result<Vec<_>>>()?;
    let schema = Schema::new(table, fields)?;

    tracing::debug!(
        table = table,
        fields = schema.len(),
        primary_key = schema.primary_key().unwrap_or("-"),
        "Introspected table"
    );
    Ok(schema)
}

/// Decode one `DESCRIBE` row.
pub fn field_from_row(table: &str, row: &Row) -> Result<FieldMeta> {
    if row.len() < DESCRIBE_COLUMNS.len() {
        return Err(Error::schema(
            table,
            format!(
                "describe row has {} columns, expected {}",
                row.len(),
                DESCRIBE_COLUMNS.len()
            ),
        ));
    }
    let name = cell_text(row, 0)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::schema(table, "describe row has no column name"))?;
    let declared_type = cell_text(row, 1).unwrap_or_default();
    let field_type = classify(&declared_type);
    if !field_type.is_known() {
        tracing::debug!(
            table = table,
            field = %name,
            declared_type = %declared_type,
            "Column type not recognized"
        );
    }

    let raw_default = row.get(4).cloned().unwrap_or(Value::Null);
    Ok(FieldMeta {
        default: decode_default(field_type, raw_default),
        nullable: cell_text(row, 2).is_some_and(|n| n.eq_ignore_ascii_case("YES")),
        key_role: KeyRole::from_describe(&cell_text(row, 3).unwrap_or_default()),
        extra: cell_text(row, 5).unwrap_or_default(),
        name,
        declared_type,
        field_type,
    })
}

/// Turn a textual column default into the field's internal representation.
///
/// Server-side expressions such as `CURRENT_TIMESTAMP` have no client value and
/// decode to [`Value::Null`].
pub fn decode_default(field_type: FieldType, raw: Value) -> Value {
    let text = match raw {
        Value::Null => return Value::Null,
        Value::Text(s) => s,
        Value::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
        other => return other,
    };
    match field_type {
        FieldType::Integer => text.trim().parse().map_or(Value::Null, Value::Int),
        FieldType::Float => text.trim().parse().map_or(Value::Null, Value::Float),
        FieldType::DateTime => parse_datetime(&text).map_or(Value::Null, Value::DateTime),
        FieldType::Binary => Value::Bytes(text.into_bytes()),
        FieldType::String | FieldType::Unknown => Value::Text(text),
    }
}

fn cell_text(row: &Row, idx: usize) -> Option<String> {
    match row.get(idx)? {
        Value::Text(s) => Some(s.clone()),
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
