use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{DEFAULT_INDEX_FIELDS, DEFAULT_INDEX_FILE_NAME, ENV_PREFIX};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub index: IndexConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Comma-separated list of indexed fields, in column order.
    pub fields: String,
    pub file_name: String,
    /// Forward every executed SQL statement to `tracing` at trace level.
    pub trace_sql: bool,
}

impl IndexConfig {
    /// ## Summary
    /// Splits the configured field list into trimmed field names.
    ///
    /// ## Errors
    /// Returns an error if the list contains an empty entry or no entries at all.
    pub fn field_names(&self) -> CoreResult<Vec<String>> {
        let names: Vec<String> = self
            .fields
            .split(',')
            .map(|field| field.trim().to_owned())
            .collect();

        if names.iter().any(String::is_empty) {
            return Err(CoreError::InvalidSetting {
                key: "index.fields",
                reason: format!("empty entry in {:?}", self.fields),
            });
        }

        Ok(names)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            fields: DEFAULT_INDEX_FIELDS.to_owned(),
            file_name: DEFAULT_INDEX_FILE_NAME.to_owned(),
            trace_sql: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

impl Settings {
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("index.fields", DEFAULT_INDEX_FIELDS)?
            .set_default("index.file_name", DEFAULT_INDEX_FILE_NAME)?
            .set_default("index.trace_sql", false)?
            .set_default("logging.level", "info")?)
    }

    /// ## Summary
    /// Layers `config.toml` and `KUNAI_*` environment variables over the defaults.
    /// Environment variables take precedence over `config.toml` values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds a `Settings` from TOML text layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the text is not valid TOML or does not deserialize.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(Self::builder()?
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Reads a `.env` file if present, then loads [`Settings`].
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(fields = %settings.index.fields, "Configuration loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests;
