use std::path::Path;

use rusqlite::Connection;

use crate::error::DbResult;

/// ## Summary
/// Opens (creating if needed) the index database at `path`.
///
/// Missing parent directories are created. With `trace_sql` set, every
/// statement executed on the connection is logged at trace level.
///
/// ## Errors
/// Returns an error if the directory cannot be created or the database
/// cannot be opened.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn open(path: &Path, trace_sql: bool) -> DbResult<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = Connection::open(path)?;
    if trace_sql {
        conn.trace(Some(trace_statement));
    }

    tracing::debug!("Index database opened");

    Ok(conn)
}

fn trace_statement(sql: &str) {
    tracing::trace!(target: "kunai_db::sql", sql, "Executing statement");
}
