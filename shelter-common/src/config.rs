//! Configuration loading and config-file discovery
//!
//! Bootstrap configuration lives in a TOML file. Every section and field is
//! optional: a missing or partial file degrades to built-in defaults with a
//! warning rather than aborting startup.
//!
//! # Config file priority
//!
//! 1. Explicit path (command-line argument)
//! 2. Environment variable (caller-chosen name)
//! 3. Platform config directory: `<config_dir>/shelter/ingest.toml`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default remote store base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default HTTP timeout applied to every remote call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default source tag stamped on imported records
pub const DEFAULT_SOURCE_TAG: &str = "paper_ocr_import";

/// Default recorder label stamped on imported records
pub const DEFAULT_RECORDER_LABEL: &str = "paper import";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Remote record store connection settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Provenance values stamped on every imported record
    #[serde(default)]
    pub provenance: ProvenanceSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote record store connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// Base URL of the record store API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Login name used for batch authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password used for batch authentication
    ///
    /// Prefer the environment variable; a password in TOML triggers a
    /// multiple-sources warning when both are set.
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum spacing between registration calls (0 = unlimited)
    #[serde(default)]
    pub request_interval_ms: u64,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_animals_path")]
    pub animals_path: String,

    #[serde(default = "default_care_logs_path")]
    pub care_logs_path: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            request_interval_ms: 0,
            login_path: default_login_path(),
            animals_path: default_animals_path(),
            care_logs_path: default_care_logs_path(),
        }
    }
}

/// Provenance values stamped by the importer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvenanceSection {
    #[serde(default = "default_source_tag")]
    pub source_tag: String,

    #[serde(default = "default_recorder_label")]
    pub recorder_label: String,
}

impl Default for ProvenanceSection {
    fn default() -> Self {
        Self {
            source_tag: default_source_tag(),
            recorder_label: default_recorder_label(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_login_path() -> String {
    "/api/auth/login".to_string()
}

fn default_animals_path() -> String {
    "/api/animals".to_string()
}

fn default_care_logs_path() -> String {
    "/api/care-logs".to_string()
}

fn default_source_tag() -> String {
    DEFAULT_SOURCE_TAG.to_string()
}

fn default_recorder_label() -> String {
    DEFAULT_RECORDER_LABEL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform default config file path (`<config_dir>/shelter/ingest.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shelter").join("ingest.toml"))
}

/// Locate the config file following the priority order in the module docs
///
/// Explicit and environment paths are returned even if they do not exist,
/// so the caller can report the missing file. The platform default is only
/// returned when it exists.
pub fn locate_config_file(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load config with graceful degradation
///
/// A missing file yields defaults plus a warning. A file that exists but
/// does not parse is still an error: silently ignoring a broken config
/// would send records to the wrong store.
pub fn load_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            load_toml_config(path)
        }
        Some(path) => {
            warn!(
                "Config file not found at {}, using built-in defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            debug!("No config file located, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
