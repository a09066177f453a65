/// Index field names shared across crates.
///
/// Field names are iCalendar property names in column form: lower-case with
/// `-` replaced by `_`.
pub const DTSTART_FIELD: &str = "dtstart";
pub const DTEND_FIELD: &str = "dtend";
pub const UID_FIELD: &str = "uid";

/// Field list used when the configuration does not name one.
pub const DEFAULT_INDEX_FIELDS: &str =
    const_str::concat!(DTSTART_FIELD, ", ", DTEND_FIELD, ", ", UID_FIELD);

/// Name of the index database file inside a collection folder.
pub const DEFAULT_INDEX_FILE_NAME: &str = ".Kunai.index.db";

/// Prefix for environment variable overrides (`KUNAI_INDEX__FIELDS`, ...).
pub const ENV_PREFIX: &str = "KUNAI";
