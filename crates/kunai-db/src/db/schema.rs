//! Field schema and persisted table layout of the index.
//!
//! The layout is one record table keyed by object href with a column per
//! configured field, plus two metadata tables recording the layout version
//! and the field names it was created with.

use std::collections::HashSet;

use rusqlite::{Connection, OptionalExtension};

use kunai_core::config::IndexConfig;
use kunai_core::constants::{DEFAULT_INDEX_FIELDS, DTEND_FIELD, DTSTART_FIELD};

use crate::error::{DbError, DbResult};

/// Version of the record layout semantics. Bump when the meaning of stored
/// values changes; every existing index is then rebuilt on open.
pub const INDEX_VERSION: &str = "1";

pub const RECORDS_TABLE: &str = "index_records";
pub const VERSION_TABLE: &str = "index_version";
pub const FIELDS_TABLE: &str = "index_fields";

pub const KEY_COLUMN: &str = "href";
pub const RECURRENT_COLUMN: &str = "recurrent";

const PROBE_RECORDS: &str =
    const_str::concat!("SELECT ", KEY_COLUMN, " FROM ", RECORDS_TABLE, " LIMIT 1");
const SELECT_VERSION: &str = const_str::concat!("SELECT version FROM ", VERSION_TABLE);
const SELECT_FIELDS: &str = const_str::concat!("SELECT field FROM ", FIELDS_TABLE);

/// Ordered, validated set of indexed field names.
///
/// Built once when a store is configured and never mutated afterwards.
/// Column order in the record table follows field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<String>,
    version: &'static str,
}

impl FieldSchema {
    /// ## Summary
    /// Builds a schema from field names, normalizing each to column form
    /// (lower-case, `-` replaced by `_`).
    ///
    /// ## Errors
    /// Returns [`DbError::InvalidFieldSchema`] if the list is empty, a name is
    /// not a plain identifier, a name is reserved, or a name repeats.
    pub fn new<I, S>(fields: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut normalized = Vec::new();

        for field in fields {
            let name = field_name_for_property(field.as_ref().trim());

            if !is_identifier(&name) {
                return Err(DbError::InvalidFieldSchema(format!(
                    "{:?} is not a valid field name",
                    field.as_ref()
                )));
            }
            if name == KEY_COLUMN || name == RECURRENT_COLUMN {
                return Err(DbError::InvalidFieldSchema(format!(
                    "{name} is a reserved column name"
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(DbError::InvalidFieldSchema(format!(
                    "{name} is listed more than once"
                )));
            }

            normalized.push(name);
        }

        if normalized.is_empty() {
            return Err(DbError::InvalidFieldSchema(
                "at least one field is required".to_string(),
            ));
        }

        Ok(Self {
            fields: normalized,
            version: INDEX_VERSION,
        })
    }

    /// ## Summary
    /// Parses a comma-separated field list such as `"dtstart, dtend, uid"`.
    ///
    /// ## Errors
    /// Returns [`DbError::InvalidFieldSchema`] under the same rules as [`FieldSchema::new`].
    pub fn parse(list: &str) -> DbResult<Self> {
        Self::new(list.split(','))
    }

    /// ## Errors
    /// Returns an error if the configured field list is malformed.
    pub fn from_config(config: &IndexConfig) -> DbResult<Self> {
        Self::new(config.field_names()?)
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub const fn version(&self) -> &'static str {
        self.version
    }

    /// Returns the column position of `field` among the schema fields.
    #[must_use]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Quoted, comma-separated field columns, in schema order.
    #[must_use]
    pub fn columns(&self) -> String {
        self.fields
            .iter()
            .map(|f| quote_identifier(f))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One `?` placeholder per field.
    #[must_use]
    pub fn placeholders(&self) -> String {
        vec!["?"; self.fields.len()].join(", ")
    }

    fn column_definitions(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                let affinity = if is_time_field(f) { "INTEGER" } else { "TEXT" };
                format!("{} {affinity}", quote_identifier(f))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn field_set(&self) -> HashSet<&str> {
        self.fields.iter().map(String::as_str).collect()
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            fields: DEFAULT_INDEX_FIELDS
                .split(',')
                .map(|f| f.trim().to_owned())
                .collect(),
            version: INDEX_VERSION,
        }
    }
}

/// Returns whether `field` holds a UTC instant rather than text.
#[must_use]
pub fn is_time_field(field: &str) -> bool {
    field == DTSTART_FIELD || field == DTEND_FIELD
}

/// Maps an iCalendar property name (`LAST-MODIFIED`) to its field name
/// (`last_modified`).
#[must_use]
pub fn field_name_for_property(property: &str) -> String {
    property.to_ascii_lowercase().replace('-', "_")
}

/// Maps a field name back to the iCalendar property it is read from.
#[must_use]
pub fn property_name_for_field(field: &str) -> String {
    field.to_ascii_uppercase().replace('_', "-")
}

/// Quotes `name` as an SQL identifier.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Outcome of comparing the persisted layout with the configured schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Tables exist and match the configured schema.
    Valid,
    /// The database is new or the record table is absent or unreadable.
    Missing,
    /// The persisted version differs or cannot be read.
    VersionMismatch,
    /// The persisted field set differs or cannot be read.
    FieldMismatch,
}

impl SchemaState {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// ## Summary
/// Probes the persisted layout against `schema`.
///
/// Checks, in order: the record table answers a trivial query, the persisted
/// version equals [`INDEX_VERSION`], and the persisted field names equal the
/// schema's as a set. A read failure in any probe yields that probe's
/// mismatch state; nothing is propagated.
#[must_use]
pub fn validate(conn: &Connection, schema: &FieldSchema) -> SchemaState {
    if let Err(e) = conn
        .query_row(PROBE_RECORDS, [], |_| Ok(()))
        .optional()
    {
        tracing::debug!(error = %e, "Record table probe failed");
        return SchemaState::Missing;
    }

    let version = conn
        .query_row(SELECT_VERSION, [], |row| row.get::<_, String>(0))
        .optional();
    match version {
        Ok(Some(version)) if version == schema.version() => {}
        Ok(other) => {
            tracing::debug!(persisted = ?other, expected = INDEX_VERSION, "Index version differs");
            return SchemaState::VersionMismatch;
        }
        Err(e) => {
            tracing::debug!(error = %e, "Version probe failed");
            return SchemaState::VersionMismatch;
        }
    }

    match persisted_fields(conn) {
        Ok(persisted) if same_fields(&persisted, schema) => SchemaState::Valid,
        Ok(persisted) => {
            tracing::debug!(?persisted, expected = ?schema.fields(), "Indexed fields differ");
            SchemaState::FieldMismatch
        }
        Err(e) => {
            tracing::debug!(error = %e, "Field probe failed");
            SchemaState::FieldMismatch
        }
    }
}

fn same_fields(persisted: &[String], schema: &FieldSchema) -> bool {
    persisted.iter().map(String::as_str).collect::<HashSet<_>>() == schema.field_set()
}

fn persisted_fields(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(SELECT_FIELDS)?;
    let fields = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(fields)
}

/// ## Summary
/// Drops every index table and recreates them for `schema`, recording the
/// version and field names.
///
/// Runs on the caller's connection; wrap it in a transaction to make the
/// switch atomic.
///
/// ## Errors
/// Returns an error if any statement fails.
pub fn create_tables(conn: &Connection, schema: &FieldSchema) -> DbResult<()> {
    conn.execute_batch(const_str::concat!(
        "DROP TABLE IF EXISTS ",
        RECORDS_TABLE,
        ";\nDROP TABLE IF EXISTS ",
        FIELDS_TABLE,
        ";\nDROP TABLE IF EXISTS ",
        VERSION_TABLE,
        ";\nCREATE TABLE ",
        VERSION_TABLE,
        " (version TEXT NOT NULL);\nCREATE TABLE ",
        FIELDS_TABLE,
        " (field TEXT NOT NULL);"
    ))?;

    conn.execute(
        const_str::concat!("INSERT INTO ", VERSION_TABLE, " (version) VALUES (?1)"),
        [schema.version()],
    )?;

    let mut insert_field =
        conn.prepare(const_str::concat!("INSERT INTO ", FIELDS_TABLE, " (field) VALUES (?1)"))?;
    for field in schema.fields() {
        insert_field.execute([field])?;
    }

    conn.execute_batch(&format!(
        "CREATE TABLE {RECORDS_TABLE} ({KEY_COLUMN} TEXT PRIMARY KEY NOT NULL, \
         {RECURRENT_COLUMN} INTEGER NOT NULL, {})",
        schema.column_definitions()
    ))?;

    Ok(())
}
