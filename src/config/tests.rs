//! Tests for config functionality.

use crate::config::{Config, PathFilter, CONFIG_FILE_NAME};
use crate::shell::DEFAULT_MAX_OUTPUT_BYTES;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.git_binary, "git");
    assert_eq!(config.max_output_bytes, 800 * 1024);
    assert_eq!(config.command_timeout_secs, None);
    assert!(config.exclude.is_empty());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
command_timeout_secs: 30
exclude:
  - "*.min.js"
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.command_timeout_secs, Some(30));
    assert_eq!(config.exclude, vec!["*.min.js"]);

    // Unspecified values should use defaults
    assert_eq!(config.git_binary, "git");
    assert_eq!(config.max_output_bytes, DEFAULT_MAX_OUTPUT_BYTES);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
git_binary: /usr/local/bin/git
future_option: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.git_binary, "/usr/local/bin/git");
}

#[test]
fn test_validation_rejects_zero_limits() {
    let err = Config::from_yaml("max_output_bytes: 0").unwrap_err();
    assert!(err.to_string().contains("max_output_bytes"));

    let err = Config::from_yaml("command_timeout_secs: 0").unwrap_err();
    assert!(err.to_string().contains("command_timeout_secs"));

    let err = Config::from_yaml("git_binary: ''").unwrap_err();
    assert!(err.to_string().contains("git_binary"));
}

#[test]
fn test_validation_rejects_bad_globs() {
    let err = Config::from_yaml("exclude: ['src/[unclosed']").unwrap_err();
    assert!(err.to_string().contains("invalid glob pattern"));
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("exclude: [unterminated").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_exec_options_from_config() {
    let config = Config {
        max_output_bytes: 1024,
        command_timeout_secs: Some(5),
        ..Config::default()
    };

    let options = config.exec_options();
    assert_eq!(options.max_output_bytes, 1024);
    assert_eq!(options.timeout, Some(Duration::from_secs(5)));
}

#[test]
fn test_path_filter() {
    let filter = PathFilter::new(&["*.lock".to_string(), "vendor/**".to_string()]).unwrap();

    assert!(filter.is_excluded("Cargo.lock"));
    assert!(filter.is_excluded("vendor/lib/a.js"));
    assert!(!filter.is_excluded("src/lib.rs"));

    assert!(!PathFilter::empty().is_excluded("anything"));
}

#[test]
fn test_yaml_roundtrip_keeps_values() {
    let config = Config {
        command_timeout_secs: Some(12),
        exclude: vec!["dist/**".to_string()],
        ..Config::default()
    };

    let yaml = config.to_yaml().unwrap();
    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_load_from_root() {
    let dir = TempDir::new().unwrap();
    assert_eq!(Config::load_from_root(dir.path()).unwrap(), Config::default());

    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "max_output_bytes: 2048\n").unwrap();
    let config = Config::load_from_root(dir.path()).unwrap();
    assert_eq!(config.max_output_bytes, 2048);
}
