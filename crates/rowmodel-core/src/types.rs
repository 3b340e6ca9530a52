//! Semantic field types and value representations.

use serde::{Deserialize, Serialize};

/// The closed set of column types rowmodel knows how to encode.
///
/// Driver-reported type strings are folded into one of these by the type catalog in
/// `rowmodel-schema`. Anything the catalog does not recognize becomes
/// [`FieldType::Unknown`], which every non-internal conversion rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Integer,
    Float,
    DateTime,
    String,
    Binary,
    Unknown,
}

impl FieldType {
    pub const fn is_known(self) -> bool {
        !matches!(self, FieldType::Unknown)
    }

    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::DateTime => "datetime",
            FieldType::String => "string",
            FieldType::Binary => "binary",
            FieldType::Unknown => "unknown",
        }
    }
}

/// How a field value is encoded for a given consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    /// The native value as the record holds it.
    #[default]
    Internal,
    /// Text ready to be embedded in a SQL statement, quoted and escaped.
    Wire,
    /// Display-oriented value: hex text for binary, scalars for numbers.
    External,
}
