//! Config file discovery and loading tests
//!
//! Tests that set environment variables are marked #[serial].

use serial_test::serial;
use shelter_common::config::{load_or_default, load_toml_config, locate_config_file, TomlConfig};
use shelter_common::Error;
use std::io::Write;
use tempfile::NamedTempFile;

const TEST_ENV_VAR: &str = "SHELTER_COMMON_TEST_CONFIG";

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config_file_loads() {
    // tc_cfg_001: every section populated
    let file = write_config(
        r#"
        [remote]
        base_url = "https://shelter.example.org"
        username = "importer"
        password = "secret"
        timeout_secs = 10
        request_interval_ms = 200
        care_logs_path = "/v2/care-logs"

        [provenance]
        source_tag = "week45_scan"
        recorder_label = "night sheet"

        [logging]
        level = "debug"
        "#,
    );

    let config = load_toml_config(file.path()).unwrap();

    assert_eq!(config.remote.base_url, "https://shelter.example.org");
    assert_eq!(config.remote.username.as_deref(), Some("importer"));
    assert_eq!(config.remote.password.as_deref(), Some("secret"));
    assert_eq!(config.remote.timeout_secs, 10);
    assert_eq!(config.remote.request_interval_ms, 200);
    assert_eq!(config.remote.care_logs_path, "/v2/care-logs");
    assert_eq!(config.remote.animals_path, "/api/animals");
    assert_eq!(config.provenance.source_tag, "week45_scan");
    assert_eq!(config.provenance.recorder_label, "night sheet");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_missing_file_degrades_to_defaults() {
    // tc_cfg_002: missing file is not fatal
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config = load_or_default(Some(&path)).unwrap();
    assert_eq!(config, TomlConfig::default());

    let config = load_or_default(None).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_broken_file_is_an_error() {
    // tc_cfg_003: a file that exists but does not parse
    let file = write_config("[remote\nbase_url = ");

    let err = load_or_default(Some(file.path())).unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("Parse TOML failed")));
}

#[test]
#[serial]
fn test_env_var_locates_config() {
    // tc_cfg_004: environment path used when no CLI path
    let file = write_config("");
    std::env::set_var(TEST_ENV_VAR, file.path());

    let located = locate_config_file(None, TEST_ENV_VAR);
    assert_eq!(located.as_deref(), Some(file.path()));

    std::env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_path_beats_env_var() {
    // tc_cfg_005: explicit path wins
    let env_file = write_config("");
    let cli_file = write_config("");
    std::env::set_var(TEST_ENV_VAR, env_file.path());

    let located = locate_config_file(Some(cli_file.path()), TEST_ENV_VAR);
    assert_eq!(located.as_deref(), Some(cli_file.path()));

    std::env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    // tc_cfg_006: blank value falls through to the platform default
    std::env::set_var(TEST_ENV_VAR, "  ");

    let located = locate_config_file(None, TEST_ENV_VAR);
    assert_ne!(located.as_deref().map(|p| p.to_string_lossy().into_owned()), Some("  ".to_string()));

    std::env::remove_var(TEST_ENV_VAR);
}
