//! Statements over the record table.
//!
//! Every function runs on the connection it is given; callers choose the
//! transaction it belongs to.

use rusqlite::types::ToSql;
use rusqlite::{Connection, Row, params_from_iter};

use crate::db::query::predicate::Predicate;
use crate::db::schema::{FieldSchema, KEY_COLUMN, RECORDS_TABLE, RECURRENT_COLUMN};
use crate::error::{DbError, DbResult};
use crate::model::{IndexRecord, IndexValue};

fn insert_sql(schema: &FieldSchema) -> String {
    format!(
        "INSERT OR REPLACE INTO {RECORDS_TABLE} ({KEY_COLUMN}, {RECURRENT_COLUMN}, {}) \
         VALUES (?, ?, {})",
        schema.columns(),
        schema.placeholders()
    )
}

fn check_shape(schema: &FieldSchema, record: &IndexRecord) -> DbResult<()> {
    if record.values.len() == schema.len() {
        Ok(())
    } else {
        Err(DbError::RecordShape {
            href: record.href.clone(),
            expected: schema.len(),
            actual: record.values.len(),
        })
    }
}

fn record_params(record: &IndexRecord) -> Vec<&dyn ToSql> {
    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(record.values.len() + 2);
    params.push(&record.href);
    params.push(&record.recurrent);
    params.extend(record.values.iter().map(|value| value as &dyn ToSql));
    params
}

/// ## Summary
/// Inserts `record`, replacing any record with the same href.
///
/// ## Errors
/// Returns [`DbError::RecordShape`] if the record does not match the schema,
/// or a database error if the statement fails.
pub fn upsert(conn: &Connection, schema: &FieldSchema, record: &IndexRecord) -> DbResult<()> {
    check_shape(schema, record)?;
    conn.execute(&insert_sql(schema), record_params(record).as_slice())?;
    Ok(())
}

/// ## Summary
/// Inserts every record with one reused prepared statement.
///
/// ## Errors
/// Returns the first shape or database error; records before it have
/// already been written on `conn`.
pub fn insert_batch(
    conn: &Connection,
    schema: &FieldSchema,
    records: &[IndexRecord],
) -> DbResult<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn.prepare_cached(&insert_sql(schema))?;
    for record in records {
        check_shape(schema, record)?;
        stmt.execute(record_params(record).as_slice())?;
    }

    Ok(records.len())
}

fn read_record(schema: &FieldSchema, row: &Row<'_>) -> rusqlite::Result<IndexRecord> {
    let values = (0..schema.len())
        .map(|i| row.get::<_, IndexValue>(i + 2))
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(IndexRecord {
        href: row.get(0)?,
        recurrent: row.get(1)?,
        values,
    })
}

/// ## Summary
/// Loads every record, ordered by href.
///
/// ## Errors
/// Returns a database error if the query fails or a row cannot be decoded.
pub fn list_all(conn: &Connection, schema: &FieldSchema) -> DbResult<Vec<IndexRecord>> {
    let sql = format!(
        "SELECT {KEY_COLUMN}, {RECURRENT_COLUMN}, {} FROM {RECORDS_TABLE} ORDER BY {KEY_COLUMN}",
        schema.columns()
    );

    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([], |row| read_record(schema, row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(records)
}

/// ## Summary
/// Returns the hrefs of records satisfying `predicate`, ordered by href.
///
/// ## Errors
/// Returns a database error if the query fails, including when the predicate
/// names a column the table does not have.
pub fn search(conn: &Connection, predicate: &Predicate) -> DbResult<Vec<String>> {
    let sql = format!(
        "SELECT {KEY_COLUMN} FROM {RECORDS_TABLE} WHERE {} ORDER BY {KEY_COLUMN}",
        predicate.clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let hrefs = stmt
        .query_map(params_from_iter(predicate.params()), |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(hrefs)
}

/// ## Summary
/// Deletes the record for `href`, or every record when `href` is `None`.
///
/// Returns the number of deleted records.
///
/// ## Errors
/// Returns a database error if the statement fails.
pub fn delete(conn: &Connection, href: Option<&str>) -> DbResult<usize> {
    let deleted = match href {
        Some(href) => conn.execute(
            const_str::concat!("DELETE FROM ", RECORDS_TABLE, " WHERE ", KEY_COLUMN, " = ?1"),
            [href],
        )?,
        None => conn.execute(const_str::concat!("DELETE FROM ", RECORDS_TABLE), [])?,
    };
    Ok(deleted)
}
