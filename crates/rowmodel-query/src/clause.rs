//! Statement fragments.
//!
//! Each builder returns one syntactically independent piece of SQL, or an empty
//! string when the clause is absent, so a statement is assembled by joining the
//! non-empty fragments with single spaces.

use rowmodel_core::{FieldMap, Result, Value, quote_ident};
use rowmodel_schema::Schema;

/// Backtick-quoted, comma-joined column list.
pub fn field_list<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_ident(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Comma-joined wire literals, in map order.
pub fn value_list(values: &FieldMap) -> String {
    values
        .values()
        .map(wire_text)
        .collect::<Vec<_>>()
        .join(",")
}

/// `` `field` = literal `` assignments for an UPDATE.
pub fn set_clause(values: &FieldMap) -> String {
    values
        .iter()
        .map(|(name, value)| format!("{} = {}", quote_ident(name), wire_text(value)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Literal text of a wire-representation value. Wire values are text already; the
/// remaining variants only appear when a caller hands in numbers directly.
fn wire_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A conjunction of raw SQL conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Where {
    conditions: Vec<String>,
}

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// `` `field` = literal ``, with `literal` already in wire form.
    pub fn eq(field: &str, literal: &str) -> Self {
        Self::new().and(format!("{} = {}", quote_ident(field), literal))
    }

    /// Add another condition; all conditions must hold.
    pub fn and(mut self, condition: impl Into<String>) -> Self {
        let condition = condition.into();
        if !condition.trim().is_empty() {
            self.conditions.push(condition);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// `WHERE ...`, or an empty string when there are no conditions.
    ///
    /// With more than one condition each is parenthesized, so a condition containing
    /// `OR` keeps its meaning.
    pub fn to_sql(&self) -> String {
        match self.conditions.as_slice() {
            [] => String::new(),
            [only] => format!("WHERE {}", only),
            many => format!(
                "WHERE {}",
                many.iter()
                    .map(|c| format!("({})", c))
                    .collect::<Vec<_>>()
                    .join(" AND ")
            ),
        }
    }
}

impl From<&str> for Where {
    fn from(condition: &str) -> Self {
        Where::new().and(condition)
    }
}

impl From<String> for Where {
    fn from(condition: String) -> Self {
        Where::new().and(condition)
    }
}

impl<S: Into<String>> From<Vec<S>> for Where {
    fn from(conditions: Vec<S>) -> Self {
        conditions
            .into_iter()
            .fold(Where::new(), |filter, c| filter.and(c))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// ORDER BY one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

impl From<&str> for Order {
    fn from(field: &str) -> Self {
        Order::asc(field)
    }
}

impl From<(&str, Direction)> for Order {
    fn from((field, direction): (&str, Direction)) -> Self {
        Self {
            field: field.to_string(),
            direction,
        }
    }
}

/// `ORDER BY` fragment. The column must belong to the schema.
pub fn order_clause(schema: &Schema, order: Option<&Order>) -> Result<String> {
    let Some(order) = order else {
        return Ok(String::new());
    };
    schema.require(&order.field)?;
    Ok(format!(
        "ORDER BY {} {}",
        quote_ident(&order.field),
        order.direction.as_sql()
    ))
}

/// `GROUP BY` fragment. The column must belong to the schema.
pub fn group_clause(schema: &Schema, field: Option<&str>) -> Result<String> {
    let Some(field) = field else {
        return Ok(String::new());
    };
    schema.require(field)?;
    Ok(format!("GROUP BY {}", quote_ident(field)))
}

/// Row limit: a count, or an offset/count pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Range { offset: u64, count: u64 },
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Limit::Count(count)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Limit::Range { offset, count }
    }
}

/// `LIMIT` fragment.
pub fn limit_clause(limit: Option<Limit>) -> String {
    match limit {
        None => String::new(),
        Some(Limit::Count(count)) => format!("LIMIT {}", count),
        Some(Limit::Range { offset, count }) => format!("LIMIT {}, {}", offset, count),
    }
}

/// JOIN text is passed through untouched.
pub fn join_clause(join: Option<&str>) -> String {
    join.map(|j| j.trim().to_string()).unwrap_or_default()
}
