use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Index store is not open")]
    NotOpen,

    #[error("Invalid field schema: {0}")]
    InvalidFieldSchema(String),

    #[error("No VEVENT, VTODO or VJOURNAL component in object {0}")]
    NoIndexableComponent(String),

    #[error("Record {href} has {actual} field values, schema has {expected}")]
    RecordShape {
        href: String,
        expected: usize,
        actual: usize,
    },

    #[error("Reindex source failed: {0:#}")]
    ReindexError(anyhow::Error),

    #[error(transparent)]
    RfcError(#[from] kunai_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
