//! Per-collection index store.
//!
//! The store owns at most one SQLite connection. Construction does no I/O;
//! [`IndexStore::open`] opens the database, checks the persisted layout and
//! rebuilds it from a [`ReindexSource`] when it does not match the
//! configured [`FieldSchema`].

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use kunai_core::config::IndexConfig;
use kunai_core::constants::DEFAULT_INDEX_FILE_NAME;

use crate::db::connection;
use crate::db::query::index_record;
use crate::db::query::predicate::Predicate;
use crate::db::schema::{self, FieldSchema, SchemaState};
use crate::db::transaction::{with_read_transaction, with_transaction};
use crate::error::{DbError, DbResult};
use crate::model::IndexRecord;

/// Authoritative object collection an index is rebuilt from.
pub trait ReindexSource {
    /// ## Errors
    /// Returns an error if the collection cannot be inspected.
    fn is_empty(&self) -> anyhow::Result<bool>;

    /// ## Summary
    /// Derives one record per object currently in the collection.
    ///
    /// ## Errors
    /// Returns an error if the collection cannot be read or a record cannot
    /// be derived.
    fn records(&self, schema: &FieldSchema) -> anyhow::Result<Vec<IndexRecord>>;
}

#[derive(Debug)]
pub struct IndexStore {
    path: PathBuf,
    schema: FieldSchema,
    trace_sql: bool,
    conn: Option<Connection>,
}

impl IndexStore {
    /// Creates a closed store for the collection in `folder`.
    #[must_use]
    pub fn new(folder: impl AsRef<Path>, schema: FieldSchema) -> Self {
        Self {
            path: folder.as_ref().join(DEFAULT_INDEX_FILE_NAME),
            schema,
            trace_sql: false,
            conn: None,
        }
    }

    /// ## Summary
    /// Creates a closed store configured from `config`.
    ///
    /// ## Errors
    /// Returns an error if the configured field list is not a valid schema.
    pub fn from_config(folder: impl AsRef<Path>, config: &IndexConfig) -> DbResult<Self> {
        let schema = FieldSchema::from_config(config)?;
        Ok(Self::new(folder.as_ref(), schema)
            .with_file_name(&config.file_name)
            .with_sql_trace(config.trace_sql))
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.path.set_file_name(file_name);
        self
    }

    #[must_use]
    pub const fn with_sql_trace(mut self, enabled: bool) -> Self {
        self.trace_sql = enabled;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn parts(&mut self) -> DbResult<(&mut Connection, &FieldSchema)> {
        let conn = self.conn.as_mut().ok_or(DbError::NotOpen)?;
        Ok((conn, &self.schema))
    }

    /// ## Summary
    /// Opens the database and makes sure its layout matches the schema.
    ///
    /// A new database, or one whose record table, version or field set does
    /// not match, is rebuilt from `source`. Calling `open` on an open store
    /// does nothing.
    ///
    /// ## Errors
    /// Returns an error if the database cannot be opened or the rebuild
    /// fails. The store is left closed in both cases.
    #[tracing::instrument(skip(self, source), fields(path = %self.path.display()))]
    pub fn open(&mut self, source: &dyn ReindexSource) -> DbResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let existed = self.path.exists();
        let conn = connection::open(&self.path, self.trace_sql)?;
        let state = if existed {
            schema::validate(&conn, &self.schema)
        } else {
            SchemaState::Missing
        };
        self.conn = Some(conn);

        if !state.is_valid() {
            tracing::debug!(?state, "Index layout does not match schema");
            if let Err(e) = self.rebuild(source) {
                self.conn = None;
                return Err(e);
            }
        }

        Ok(())
    }

    /// ## Summary
    /// Recreates every index table from the schema and loads one record per
    /// object in `source`.
    ///
    /// The records are derived before anything is touched, and the tables are
    /// replaced and filled in one transaction, so a failed rebuild leaves the
    /// previous database as it was.
    ///
    /// ## Errors
    /// Returns [`DbError::NotOpen`] on a closed store,
    /// [`DbError::ReindexError`] if `source` fails, or a database error.
    #[tracing::instrument(skip(self, source))]
    pub fn rebuild(&mut self, source: &dyn ReindexSource) -> DbResult<()> {
        if self.conn.is_none() {
            return Err(DbError::NotOpen);
        }

        let records = if source.is_empty().map_err(DbError::ReindexError)? {
            Vec::new()
        } else {
            tracing::warn!(path = %self.path.display(), "Reindexing collection");
            source
                .records(&self.schema)
                .map_err(DbError::ReindexError)?
        };

        let (conn, field_schema) = self.parts()?;
        let count = with_transaction(conn, |tx| {
            schema::create_tables(tx, field_schema)?;
            index_record::insert_batch(tx, field_schema, &records)
        })?;

        tracing::info!(
            version = field_schema.version(),
            fields = ?field_schema.fields(),
            count,
            "Index tables created"
        );
        Ok(())
    }

    /// ## Summary
    /// Inserts or replaces the record for `record.href`.
    ///
    /// ## Errors
    /// Returns an error if the store is closed, the record does not match
    /// the schema, or the write fails.
    #[tracing::instrument(skip(self, record), fields(href = %record.href))]
    pub fn upsert(&mut self, record: &IndexRecord) -> DbResult<()> {
        let (conn, schema) = self.parts()?;
        with_transaction(conn, |tx| index_record::upsert(tx, schema, record))
    }

    /// ## Summary
    /// Inserts or replaces many records in a single transaction.
    ///
    /// ## Errors
    /// Returns an error if the store is closed, a record does not match the
    /// schema, or the write fails; nothing is written in that case.
    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    pub fn bulk_load(&mut self, records: &[IndexRecord]) -> DbResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let (conn, schema) = self.parts()?;
        let count = with_transaction(conn, |tx| index_record::insert_batch(tx, schema, records))?;
        tracing::debug!(count, "Records loaded");
        Ok(())
    }

    /// ## Summary
    /// Returns every record, ordered by href.
    ///
    /// ## Errors
    /// Returns an error if the store is closed or the read fails.
    #[tracing::instrument(skip(self))]
    pub fn list_all(&mut self) -> DbResult<Vec<IndexRecord>> {
        let (conn, schema) = self.parts()?;
        with_read_transaction(conn, |tx| index_record::list_all(tx, schema))
    }

    /// ## Summary
    /// Returns the hrefs of records matching `predicate`, ordered by href.
    ///
    /// ## Errors
    /// Returns an error if the store is closed or the query fails.
    #[tracing::instrument(skip(self, predicate), fields(clause = predicate.clause()))]
    pub fn search(&mut self, predicate: &Predicate) -> DbResult<Vec<String>> {
        let (conn, _) = self.parts()?;
        with_read_transaction(conn, |tx| index_record::search(tx, predicate))
    }

    /// ## Summary
    /// Deletes the record for `href`, or every record when `href` is `None`.
    ///
    /// ## Errors
    /// Returns an error if the store is closed or the write fails.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, href: Option<&str>) -> DbResult<()> {
        let (conn, _) = self.parts()?;
        let deleted = with_transaction(conn, |tx| index_record::delete(tx, href))?;
        tracing::debug!(deleted, "Records deleted");
        Ok(())
    }

    /// ## Summary
    /// Releases the connection. The store can be opened again afterwards.
    ///
    /// ## Errors
    /// Returns an error if SQLite fails to close the connection; it is
    /// released regardless.
    pub fn close(&mut self) -> DbResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| DbError::from(e))?;
        }
        Ok(())
    }
}
