//! Records: one row of a table, with change tracking.

use std::fmt;

use rowmodel_core::convert::{normalize, render, to_wire};
use rowmodel_core::{Connector, FieldMap, Representation, Result, Value};
use rowmodel_schema::Schema;

use crate::table::Table;

/// One row of a [`Table`], held in the internal representation.
///
/// A record remembers the values it was loaded (or last saved) with. Writes through
/// [`set`](Self::set) only touch the current values, so [`changes`](Self::changes)
/// reports exactly the fields that would be written by [`save`](Self::save).
///
/// Field names are checked against the table schema. The name `PRIMARY` stands for
/// the primary-key column.
pub struct Record<'t, K: Connector> {
    table: &'t Table<'t, K>,
    current: Vec<Value>,
    baseline: Vec<Value>,
    identity: Option<Value>,
    loaded: bool,
}

impl<'t, K: Connector> Record<'t, K> {
    pub(crate) fn new(table: &'t Table<'t, K>, values: Vec<Value>, identity: Option<Value>) -> Self {
        Self {
            table,
            baseline: values.clone(),
            current: values,
            identity,
            loaded: false,
        }
    }

    /// Mark the record as standing for a row read from (or written to) the table.
    pub(crate) fn into_loaded(mut self) -> Self {
        self.loaded = true;
        self
    }

    pub fn table(&self) -> &'t Table<'t, K> {
        self.table
    }

    pub fn schema(&self) -> &'t Schema {
        self.table.schema()
    }

    /// Primary-key value of the stored row. `None` for new records, for records of a
    /// keyless table and for records selected without the primary key.
    pub fn identity(&self) -> Option<&Value> {
        self.identity.as_ref()
    }

    /// True for records that do not stand for any stored row yet.
    pub fn is_new(&self) -> bool {
        self.identity.is_none() && !self.loaded
    }

    /// True for records mapped from a result row or already written.
    ///
    /// A loaded record without an [`identity`](Self::identity) was selected without
    /// its primary key; it cannot be saved back.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Read a field in the requested representation.
    pub fn get(&self, field: &str, repr: Representation) -> Result<Value> {
        let idx = self.schema().resolve(field)?;
        self.get_at(idx, repr)
    }

    /// Write a field. Date/time text, Unix seconds and UUID text are normalized for
    /// the column type; anything unparseable is a type error.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.schema().resolve(field)?;
        self.set_at(idx, value.into())
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.baseline
    }

    /// Fields whose value differs from the loaded state, in column order.
    pub fn changes(&self, repr: Representation) -> Result<FieldMap> {
        let mut changes = FieldMap::new();
        for (idx, (now, then)) in self.current.iter().zip(&self.baseline).enumerate() {
            if now != then {
                changes.insert(&self.schema().fields()[idx].name, self.get_at(idx, repr)?);
            }
        }
        Ok(changes)
    }

    /// Every field, in column order.
    pub fn data(&self, repr: Representation) -> Result<FieldMap> {
        let schema = self.schema();
        let mut data = FieldMap::with_capacity(schema.len());
        for (idx, field) in schema.fields().iter().enumerate() {
            data.insert(&field.name, self.get_at(idx, repr)?);
        }
        Ok(data)
    }

    /// Write the record: INSERT when it is new, otherwise UPDATE the changed fields.
    ///
    /// See [`Table::save`].
    pub fn save(&mut self) -> Result<()> {
        let table = self.table;
        table.save(self)
    }

    /// Discard unsaved changes.
    pub fn revert(&mut self) {
        self.current.clone_from(&self.baseline);
    }

    /// The record as a JSON object of external-representation values.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let object = self
            .data(Representation::External)?
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        Ok(serde_json::Value::Object(object))
    }

    pub(crate) fn get_at(&self, idx: usize, repr: Representation) -> Result<Value> {
        render(self.schema().fields()[idx].spec(), repr, &self.current[idx])
    }

    pub(crate) fn set_at(&mut self, idx: usize, value: Value) -> Result<()> {
        let value = normalize(self.schema().fields()[idx].spec(), value)?;
        self.current[idx] = value;
        Ok(())
    }

    pub(crate) fn value_at(&self, idx: usize) -> &Value {
        &self.current[idx]
    }

    pub(crate) fn wire_literal(&self, idx: usize) -> Result<String> {
        to_wire(self.schema().fields()[idx].spec(), &self.current[idx])
    }

    /// The current values were written: they become the baseline, and the identity
    /// follows the primary key.
    pub(crate) fn mark_saved(&mut self) {
        self.baseline.clone_from(&self.current);
        self.loaded = true;
        if let Ok(pk) = self.schema().primary_key_index() {
            self.identity = Some(self.current[pk].clone()).filter(|v| !v.is_null());
        }
    }

    /// Take over the stored state of `other`, a freshly read copy of the same row.
    pub(crate) fn adopt(&mut self, other: &Record<'_, K>) {
        self.current.clone_from(&other.current);
        self.baseline.clone_from(&other.current);
        self.identity.clone_from(&other.identity);
        self.loaded = other.loaded;
    }
}

impl<K: Connector> Clone for Record<'_, K> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            current: self.current.clone(),
            baseline: self.baseline.clone(),
            identity: self.identity.clone(),
            loaded: self.loaded,
        }
    }
}

impl<K: Connector> fmt::Debug for Record<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .schema()
            .field_names()
            .zip(&self.current)
            .collect::<Vec<_>>();
        f.debug_struct("Record")
            .field("table", &self.schema().table_name())
            .field("identity", &self.identity)
            .field("fields", &fields)
            .field("modified", &self.is_modified())
            .finish()
    }
}
