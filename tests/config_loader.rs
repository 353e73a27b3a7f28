mod common;

use std::time::Duration;

use common::temp_config;
use listsync::config::{Config, ConfigError, SectioningMode};
use listsync::Sectioning;

/// Test that Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.debounce.delay_ms, 250);
    assert_eq!(config.debounce.delay(), Duration::from_millis(250));
    assert_eq!(config.source.page_size, 100);
    assert_eq!(config.source.sectioning, SectioningMode::SourceOrder);
    assert!(config.validate().is_ok());
}

/// Test that a missing file falls back to defaults.
#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

/// Test loading a complete file.
#[test]
fn test_load_full_file() {
    let (_dir, path) = temp_config(
        r#"[debounce]
delay_ms = 400

[source]
page_size = 25
sectioning = "sorted"
"#,
    );

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.debounce.delay_ms, 400);
    assert_eq!(config.source.page_size, 25);
    assert_eq!(config.source.sectioning, SectioningMode::Sorted);
    assert!(matches!(
        config.source.sectioning.sectioning::<&str>(),
        Sectioning::Sorted(_)
    ));
}

/// Test that omitted fields keep their defaults.
#[test]
fn test_partial_file_keeps_defaults() {
    let (_dir, path) = temp_config("[source]\npage_size = 10\n");

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.debounce.delay_ms, 250);
    assert_eq!(config.source.page_size, 10);
    assert_eq!(config.source.sectioning, SectioningMode::SourceOrder);
}

/// Test validation of the debounce upper bound.
#[test]
fn test_excessive_delay_is_rejected() {
    let (_dir, path) = temp_config("[debounce]\ndelay_ms = 60001\n");

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains("delay_ms"));
}

/// Test that malformed TOML reports the file path.
#[test]
fn test_parse_error_names_file() {
    let (_dir, path) = temp_config("[debounce\ndelay_ms = 1\n");

    let err = Config::load_from(&path).unwrap_err();
    match &err {
        ConfigError::ParseError { path: reported, .. } => assert_eq!(reported, &path),
        other => panic!("expected ParseError, got {:?}", other),
    }
}

/// Test that a directory in place of the file is a read error.
#[test]
fn test_unreadable_path_is_read_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let err = Config::load_from(temp_dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}
