//! Transaction helpers for index operations.
//!
//! Writes take the database write lock up front so that concurrent writers
//! queue instead of failing half-way. Reads run in a deferred transaction
//! that is always rolled back, so no read lock outlives the call.
//!
//! ```rust,ignore
//! use crate::db::transaction::with_transaction;
//!
//! with_transaction(&mut conn, |tx| {
//!     query::index_record::delete(tx, Some(href))?;
//!     query::index_record::upsert(tx, schema, &record)?;
//!     Ok(())
//! })?;
//! ```

use rusqlite::{Connection, DropBehavior, Transaction, TransactionBehavior};

use crate::error::{DbError, DbResult};

/// ## Summary
/// Runs `callback` inside an immediate transaction and commits on success.
///
/// ## Errors
/// Returns any error produced by the closure, or errors raised while starting
/// or committing the transaction. The transaction is rolled back on error.
pub fn with_transaction<T, F>(conn: &mut Connection, callback: F) -> DbResult<T>
where
    F: FnOnce(&Transaction<'_>) -> DbResult<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = callback(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// ## Summary
/// Runs `callback` inside a read-only deferred transaction and rolls it back
/// afterwards, releasing every lock the read acquired.
///
/// Results must be fully materialized by the closure; nothing borrowed from
/// the transaction can escape it.
///
/// ## Errors
/// Returns the closure's error if it failed, otherwise any error raised while
/// starting or ending the transaction.
pub fn with_read_transaction<T, F>(conn: &mut Connection, callback: F) -> DbResult<T>
where
    F: FnOnce(&Transaction<'_>) -> DbResult<T>,
{
    let mut tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
    tx.set_drop_behavior(DropBehavior::Rollback);

    let result = callback(&tx);
    let ended = tx.rollback().map_err(DbError::from);

    match result {
        Ok(value) => ended.map(|()| value),
        Err(e) => {
            if let Err(rollback) = ended {
                tracing::warn!(error = %rollback, "Rollback after failed read did not complete");
            }
            Err(e)
        }
    }
}
