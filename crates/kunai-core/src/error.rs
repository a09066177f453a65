use thiserror::Error;

/// Errors raised while interpreting settings.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
