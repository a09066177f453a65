//! Models for the index record table.

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};

use crate::db::schema::FieldSchema;

/// One indexed field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexValue {
    /// The object has no such property.
    Null,
    /// UTC instant in Unix seconds (`dtstart`/`dtend`).
    Instant(i64),
    /// Property text.
    Text(String),
}

impl IndexValue {
    /// Returns the instant, if this is a time value.
    #[must_use]
    pub const fn as_instant(&self) -> Option<i64> {
        match self {
            Self::Instant(seconds) => Some(*seconds),
            _ => None,
        }
    }

    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Option<String>> for IndexValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for IndexValue {
    fn from(value: i64) -> Self {
        Self::Instant(value)
    }
}

impl ToSql for IndexValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(Value::Null),
            Self::Instant(seconds) => ToSqlOutput::Owned(Value::Integer(*seconds)),
            Self::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
        })
    }
}

impl FromSql for IndexValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Self::Null),
            ValueRef::Integer(seconds) => Ok(Self::Instant(seconds)),
            ValueRef::Text(_) => Ok(Self::Text(value.as_str()?.to_owned())),
            ValueRef::Real(_) | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// Index record.
///
/// Summary of one calendar object: its key in the object store, whether it
/// recurs, and one value per schema field in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexRecord {
    /// Key of the object in the underlying store.
    pub href: String,
    /// Whether the object carries a recurrence set.
    pub recurrent: bool,
    /// Field values, aligned with [`FieldSchema::fields`].
    pub values: Vec<IndexValue>,
}

impl IndexRecord {
    #[must_use]
    pub fn new(href: impl Into<String>, recurrent: bool, values: Vec<IndexValue>) -> Self {
        Self {
            href: href.into(),
            recurrent,
            values,
        }
    }

    /// Returns the value recorded for `field`, if the schema has that field.
    #[must_use]
    pub fn get<'a>(&'a self, schema: &FieldSchema, field: &str) -> Option<&'a IndexValue> {
        self.values.get(schema.position(field)?)
    }
}
