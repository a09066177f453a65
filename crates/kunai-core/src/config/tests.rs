//! Tests for configuration module.

use super::*;

#[test_log::test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.index.fields, "dtstart, dtend, uid");
    assert_eq!(settings.index.file_name, ".Kunai.index.db");
    assert!(!settings.index.trace_sql);
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_field_names_are_trimmed() {
    let config = IndexConfig {
        fields: "dtstart,  dtend ,uid, summary, organizer".to_string(),
        ..IndexConfig::default()
    };

    let names = config.field_names().unwrap();
    assert_eq!(names, vec!["dtstart", "dtend", "uid", "summary", "organizer"]);
}

#[test]
fn test_field_names_rejects_empty_entry() {
    let config = IndexConfig {
        fields: "dtstart,,uid".to_string(),
        ..IndexConfig::default()
    };

    let err = config.field_names().unwrap_err();
    assert!(matches!(err, CoreError::InvalidSetting { key: "index.fields", .. }));
}

#[test]
fn test_field_names_rejects_blank_list() {
    let config = IndexConfig {
        fields: "   ".to_string(),
        ..IndexConfig::default()
    };

    assert!(config.field_names().is_err());
}

#[test_log::test]
fn test_from_toml_overrides_defaults() {
    let settings = Settings::from_toml(
        r#"
        [index]
        fields = "dtstart, dtend, uid, summary"
        trace_sql = true
        "#,
    )
    .unwrap();

    assert_eq!(settings.index.fields, "dtstart, dtend, uid, summary");
    assert!(settings.index.trace_sql);
    // Untouched keys keep their defaults
    assert_eq!(settings.index.file_name, ".Kunai.index.db");
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_from_toml_rejects_invalid_text() {
    assert!(Settings::from_toml("[index\nfields = ").is_err());
}

#[test_log::test]
fn test_load_config_without_sources_uses_defaults() {
    let settings = load_config().unwrap();

    assert_eq!(settings.index.file_name, ".Kunai.index.db");
    assert!(settings.index.field_names().is_ok());
}
