//! Ordered collections of records from one table.

use std::fmt;
use std::ops::Deref;

use rowmodel_core::{Connector, Error, Result};

use crate::record::Record;

/// The records returned by a SELECT, in row order.
///
/// Every record in a set belongs to the same table.
pub struct RecordSet<'t, K: Connector> {
    records: Vec<Record<'t, K>>,
}

impl<'t, K: Connector> RecordSet<'t, K> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record, rejecting one from a different table.
    pub fn try_push(&mut self, record: Record<'t, K>) -> Result<()> {
        if let Some(first) = self.records.first() {
            let expected = first.schema().table_name();
            let actual = record.schema().table_name();
            if expected != actual {
                return Err(Error::schema(
                    expected,
                    format!("cannot add a record of `{}` to this set", actual),
                ));
            }
        }
        self.records.push(record);
        Ok(())
    }

    pub(crate) fn push(&mut self, record: Record<'t, K>) {
        self.records.push(record);
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record<'t, K>> {
        self.records.iter_mut()
    }

    pub fn into_vec(self) -> Vec<Record<'t, K>> {
        self.records
    }
}

impl<K: Connector> Default for RecordSet<'_, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t, K: Connector> Deref for RecordSet<'t, K> {
    type Target = [Record<'t, K>];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<'t, K: Connector> IntoIterator for RecordSet<'t, K> {
    type Item = Record<'t, K>;
    type IntoIter = std::vec::IntoIter<Record<'t, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, 't, K: Connector> IntoIterator for &'a RecordSet<'t, K> {
    type Item = &'a Record<'t, K>;
    type IntoIter = std::slice::Iter<'a, Record<'t, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<K: Connector> fmt::Debug for RecordSet<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.records).finish()
    }
}
