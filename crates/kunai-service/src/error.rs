use thiserror::Error;

/// Errors of collection operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] kunai_db::error::DbError),

    #[error("Object store error: {0:#}")]
    StoreError(anyhow::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
