//! Per-table field metadata.

use std::collections::HashMap;

use rowmodel_core::{Error, FieldSpec, FieldType, Result, Value};
use serde::{Deserialize, Serialize};

/// Field name that stands for "the primary key, whatever it is called".
pub const PRIMARY: &str = "PRIMARY";

/// Index role of a column, as reported in the `Key` column of `DESCRIBE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyRole {
    #[default]
    None,
    /// `PRI`
    Primary,
    /// `UNI`
    Unique,
    /// `MUL`: first column of a non-unique index
    Multiple,
}

impl KeyRole {
    pub fn from_describe(key: &str) -> Self {
        match key.trim().to_ascii_uppercase().as_str() {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            "MUL" => KeyRole::Multiple,
            _ => KeyRole::None,
        }
    }
}

/// Metadata about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Column name.
    pub name: String,
    /// Type string exactly as the server reported it, e.g. `varchar(64)`.
    pub declared_type: String,
    /// Semantic type derived from `declared_type`.
    pub field_type: FieldType,
    pub nullable: bool,
    pub key_role: KeyRole,
    /// Column default, in the internal representation.
    #[serde(skip)]
    pub default: Value,
    /// The `Extra` column, e.g. `auto_increment`.
    pub extra: String,
}

impl FieldMeta {
    pub fn is_primary(&self) -> bool {
        self.key_role == KeyRole::Primary
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_ascii_lowercase().contains("auto_increment")
    }

    /// The view of this field the value conversions work with.
    pub fn spec(&self) -> FieldSpec<'_> {
        FieldSpec::new(&self.name, &self.declared_type, self.field_type)
    }
}

/// Metadata for a whole table, in column order.
#[derive(Debug, Clone)]
pub struct Schema {
    table: String,
    fields: Vec<FieldMeta>,
    index: HashMap<String, usize>,
    primary_key: Option<usize>,
}

impl Schema {
    /// Build a schema from column metadata in column order.
    ///
    /// The first column with [`KeyRole::Primary`] becomes the primary key. Fails if
    /// there are no columns or a column name repeats.
    pub fn new(table: impl Into<String>, fields: Vec<FieldMeta>) -> Result<Self> {
        let table = table.into();
        if fields.is_empty() {
            return Err(Error::schema(&table, "table has no columns"));
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), i).is_some() {
                return Err(Error::schema(
                    &table,
                    format!("column `{}` is described twice", field.name),
                ));
            }
        }
        let primary_key = fields.iter().position(FieldMeta::is_primary);

        Ok(Self {
            table,
            fields,
            index,
            primary_key,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    pub fn field_at(&self, idx: usize) -> Option<&FieldMeta> {
        self.fields.get(idx)
    }

    /// Resolve a field name, honoring the [`PRIMARY`] alias, to a column index.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        if name == PRIMARY {
            return self.primary_key_index();
        }
        self.index_of(name)
            .ok_or_else(|| Error::field(&self.table, name))
    }

    /// Fail with a field error unless `name` is a declared column.
    pub fn require(&self, name: &str) -> Result<&FieldMeta> {
        self.field(name)
            .ok_or_else(|| Error::field(&self.table, name))
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.map(|i| self.fields[i].name.as_str())
    }

    pub fn primary_key_index(&self) -> Result<usize> {
        self.primary_key
            .ok_or_else(|| Error::schema(&self.table, "table has no primary key"))
    }

    /// The primary key's metadata, or a schema error for keyless tables.
    pub fn require_primary_key(&self) -> Result<&FieldMeta> {
        self.primary_key_index().map(|i| &self.fields[i])
    }

    /// Every column's default, in column order.
    pub fn defaults(&self) -> Vec<Value> {
        self.fields.iter().map(|f| f.default.clone()).collect()
    }
}
