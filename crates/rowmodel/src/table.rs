//! Table handles: record creation, queries and writes.

use std::fmt;

use rowmodel_core::convert::{normalize, to_wire};
use rowmodel_core::{
    ConsistencyError, Connector, Error, Event, FieldMap, NotFoundError, Representation, Result,
    Row, Value,
};
use rowmodel_query::{Select, Where, insert_statement, update_statement};
use rowmodel_schema::{PRIMARY, Schema};

use crate::database::Database;
use crate::record::Record;
use crate::record_set::RecordSet;

/// Options for [`Table::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOptions {
    /// Column to match the key against. Defaults to the primary key.
    pub key_field: Option<String>,
    /// Return a fresh record instead of failing when nothing matches.
    pub create_if_missing: bool,
    /// Return [`Error::NotFound`] when nothing matches. When false, `get` returns `None`.
    pub fail_if_missing: bool,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            key_field: None,
            create_if_missing: false,
            fail_if_missing: true,
        }
    }
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn fail_if_missing(mut self, fail: bool) -> Self {
        self.fail_if_missing = fail;
        self
    }
}

/// One table of a [`Database`], with its introspected [`Schema`].
pub struct Table<'db, K: Connector> {
    db: &'db Database<K>,
    schema: Schema,
}

impl<'db, K: Connector> Table<'db, K> {
    pub(crate) fn new(db: &'db Database<K>, schema: Schema) -> Self {
        Self { db, schema }
    }

    pub fn name(&self) -> &str {
        self.schema.table_name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn database(&self) -> &'db Database<K> {
        self.db
    }

    /// A new, unsaved record holding the column defaults.
    pub fn create(&self) -> Record<'_, K> {
        Record::new(self, self.schema.defaults(), None)
    }

    /// A new, unsaved record with `seed` laid over the column defaults.
    ///
    /// Seed entries that are not columns of this table are ignored. The seeded state
    /// counts as unmodified.
    pub fn create_with(&self, seed: &FieldMap) -> Result<Record<'_, K>> {
        let mut values = self.schema.defaults();
        for (name, value) in seed.iter() {
            let Some(idx) = self.schema.index_of(name) else {
                tracing::trace!(table = self.name(), field = name, "Ignoring seed entry");
                continue;
            };
            values[idx] = normalize(self.schema.fields()[idx].spec(), value.clone())?;
        }
        Ok(Record::new(self, values, None))
    }

    /// Run a SELECT and map every row onto a record.
    ///
    /// Rows map positionally onto the projected fields; unprojected fields keep their
    /// defaults. Records get an identity only when the primary key is projected, and
    /// records without one cannot be saved back.
    #[tracing::instrument(level = "debug", skip(self, query), fields(table = self.name()))]
    pub fn select(&self, query: &Select) -> Result<RecordSet<'_, K>> {
        let sql = query.build(&self.schema)?;
        let indices = query
            .projected_fields(&self.schema)
            .iter()
            .map(|field| self.schema.resolve(field))
            .collect::<Result<Vec<_>>>()?;

        let rows = self.db.execute(&sql)?.fetch_all();
        let mut records = RecordSet::with_capacity(rows.len());
        for row in rows {
            records.push(self.record_from_row(&indices, row)?);
        }
        tracing::debug!(table = self.name(), rows = records.len(), "Selected records");
        Ok(records)
    }

    /// Fetch the one record whose key field equals `key`.
    ///
    /// When no single row matches, `options` decide between a fresh record,
    /// [`Error::NotFound`] and `None`. Several matching rows count as no match.
    #[tracing::instrument(level = "debug", skip(self, key, options), fields(table = self.name()))]
    pub fn get(&self, key: impl Into<Value>, options: &GetOptions) -> Result<Option<Record<'_, K>>> {
        let key_field = options.key_field.as_deref().unwrap_or(PRIMARY);
        let idx = self.schema.resolve(key_field)?;
        let field = &self.schema.fields()[idx].name;

        let mut probe = self.create();
        probe.set_at(idx, key.into())?;
        let literal = probe.wire_literal(idx)?;

        let records = self.select(&Select::new().filter(Where::eq(field, &literal)))?;
        if records.len() == 1 {
            return Ok(records.into_iter().next());
        }
        if records.len() > 1 {
            tracing::warn!(
                table = self.name(),
                field = %field,
                key = %literal,
                rows = records.len(),
                "Key matched more than one row; treating as not found"
            );
        }

        if options.create_if_missing {
            return Ok(Some(self.create()));
        }
        if options.fail_if_missing {
            return Err(Error::NotFound(NotFoundError {
                table: self.name().to_string(),
                field: field.clone(),
                key: literal,
            }));
        }
        Ok(None)
    }

    /// Insert `record` and return the stored row.
    ///
    /// The identity comes from the driver's insert id, or from the record's own
    /// primary-key value when the driver reports none. On success `record` takes the
    /// stored values, its identity is set and it is no longer modified.
    ///
    /// Rows of a table without a primary key cannot be read back: the inserted values
    /// become the record's baseline and a copy of the record is returned.
    #[tracing::instrument(level = "debug", skip(self, record), fields(table = self.name()))]
    pub fn insert(&self, record: &mut Record<'_, K>) -> Result<Record<'_, K>> {
        self.check_owner(record)?;

        let values = record.data(Representation::Wire)?;
        let sql = insert_statement(self.name(), &values);
        let cursor = self.db.execute(&sql)?;

        if cursor.affected_rows() != 1 {
            return Err(self.consistency(
                "insert did not affect exactly one row",
                &sql,
                Some(cursor.affected_rows()),
            ));
        }

        let Ok(pk_idx) = self.schema.primary_key_index() else {
            record.mark_saved();
            self.db.emit(&Event::RecordSaved {
                table: self.name().to_string(),
                identity: None,
                inserted: true,
            });
            let mut stored = self.create();
            stored.adopt(record);
            return Ok(stored);
        };

        let identity = match cursor.last_insert_id() {
            Some(id) => {
                let id = i64::try_from(id).map_err(|_| {
                    self.consistency(&format!("insert id {} out of range", id), &sql, None)
                })?;
                normalize(self.schema.fields()[pk_idx].spec(), Value::Int(id))?
            }
            None => match record.value_at(pk_idx) {
                Value::Null => {
                    return Err(self.consistency(
                        "no insert id reported and the record has no primary-key value",
                        &sql,
                        None,
                    ));
                }
                value => value.clone(),
            },
        };
        record.set_at(pk_idx, identity.clone())?;

        let stored = self
            .get(identity, &GetOptions::new().fail_if_missing(false))?
            .ok_or_else(|| self.consistency("inserted row could not be read back", &sql, None))?;
        record.adopt(&stored);

        self.db.emit(&Event::RecordSaved {
            table: self.name().to_string(),
            identity: Some(stored.wire_literal(pk_idx)?),
            inserted: true,
        });
        Ok(stored)
    }

    /// Write the modified fields of an existing record.
    ///
    /// The UPDATE targets the record's identity, so a changed primary key is written
    /// too. Records without changes issue no statement; new records are inserted.
    ///
    /// A loaded record without an identity has no row to target: saving its changes
    /// fails with [`Error::Schema`].
    #[tracing::instrument(level = "debug", skip(self, record), fields(table = self.name()))]
    pub fn save(&self, record: &mut Record<'_, K>) -> Result<()> {
        self.check_owner(record)?;
        if record.is_new() {
            return self.insert(record).map(|_| ());
        }

        let changes = record.changes(Representation::Wire)?;
        if changes.is_empty() {
            tracing::debug!(table = self.name(), "No changes to save");
            return Ok(());
        }
        let Some(identity) = record.identity().cloned() else {
            let message = if self.schema.primary_key().is_some() {
                "record was selected without its primary key"
            } else {
                "stored rows of a table without a primary key cannot be updated"
            };
            return Err(Error::schema(self.name(), message));
        };

        let pk = self.schema.require_primary_key()?;
        let literal = to_wire(pk.spec(), &identity)?;
        let sql = update_statement(self.name(), &changes, &Where::eq(&pk.name, &literal));
        let affected = self.db.execute(&sql)?.affected_rows();
        if affected == 0 {
            tracing::debug!(table = self.name(), key = %literal, "UPDATE matched no rows");
        }

        record.mark_saved();
        self.db.emit(&Event::RecordSaved {
            table: self.name().to_string(),
            identity: Some(literal),
            inserted: false,
        });
        Ok(())
    }

    /// UPDATE every row matching `filter`, returning the affected-row count.
    ///
    /// `values` are wire literals (text is inserted verbatim). An empty `values` issues
    /// no statement.
    #[tracing::instrument(level = "debug", skip(self, values, filter), fields(table = self.name()))]
    pub fn update(&self, values: &FieldMap, filter: impl Into<Where>) -> Result<u64> {
        for name in values.keys() {
            self.schema.require(name)?;
        }
        if values.is_empty() {
            return Ok(0);
        }
        let sql = update_statement(self.name(), values, &filter.into());
        Ok(self.db.execute(&sql)?.affected_rows())
    }

    fn record_from_row(&self, indices: &[usize], row: Row) -> Result<Record<'_, K>> {
        let mut values = self.schema.defaults();
        for (&idx, value) in indices.iter().zip(row.into_values()) {
            values[idx] = normalize(self.schema.fields()[idx].spec(), value)?;
        }
        let identity = self
            .schema
            .primary_key_index()
            .ok()
            .filter(|pk| indices.contains(pk))
            .map(|pk| values[pk].clone())
            .filter(|v| !v.is_null());
        Ok(Record::new(self, values, identity).into_loaded())
    }

    fn check_owner(&self, record: &Record<'_, K>) -> Result<()> {
        if record.schema().table_name() == self.name() && record.schema().len() == self.schema.len()
        {
            Ok(())
        } else {
            Err(Error::schema(
                self.name(),
                format!("record belongs to `{}`", record.schema().table_name()),
            ))
        }
    }

    fn consistency(&self, message: &str, sql: &str, affected_rows: Option<u64>) -> Error {
        Error::Consistency(ConsistencyError {
            table: self.name().to_string(),
            message: message.to_string(),
            sql: Some(sql.to_string()),
            affected_rows,
        })
    }
}

impl<K: Connector> fmt::Debug for Table<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
