//! Run settings resolution for shelter-ingest
//!
//! Connection settings and credentials are resolved with
//! CLI → ENV → TOML → built-in default priority. The password is never
//! accepted on the command line.

use crate::models::ProvenanceConfig;
use crate::services::Credentials;
use shelter_common::config::{RemoteConfig, TomlConfig, DEFAULT_BASE_URL};
use shelter_common::{Error, Result};
use tracing::{info, warn};

/// Config file path override
pub const ENV_CONFIG: &str = "SHELTER_INGEST_CONFIG";
pub const ENV_BASE_URL: &str = "SHELTER_INGEST_BASE_URL";
pub const ENV_USERNAME: &str = "SHELTER_INGEST_USERNAME";
pub const ENV_PASSWORD: &str = "SHELTER_INGEST_PASSWORD";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub username: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub remote: RemoteConfig,
    pub credentials: Credentials,
    pub provenance: ProvenanceConfig,
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Pick one setting from its tiers, warning when several are set
///
/// Returns the value and the name of the tier it came from.
fn resolve_setting(
    label: &str,
    cli: Option<&str>,
    env_var: &str,
    toml: Option<&str>,
) -> Option<(String, &'static str)> {
    let env = std::env::var(env_var).ok();

    let tiers = [
        ("command line", cli),
        ("environment", env.as_deref()),
        ("TOML", toml),
    ];

    let sources: Vec<&str> = tiers
        .iter()
        .filter(|(_, value)| value.is_some_and(is_valid_value))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            label,
            sources.join(", "),
            sources[0]
        );
    }

    // Bound before returning: the iterator borrows `env`
    let found = tiers.into_iter().find_map(|(source, value)| {
        value
            .filter(|v| is_valid_value(v))
            .map(|v| (v.trim().to_string(), source))
    });
    found
}

/// Resolve the record store base URL
pub fn resolve_base_url(cli: Option<&str>, toml_config: &TomlConfig) -> String {
    // The TOML default is indistinguishable from an explicit value equal to it
    let toml_url = Some(toml_config.remote.base_url.as_str()).filter(|url| *url != DEFAULT_BASE_URL);

    match resolve_setting("Base URL", cli, ENV_BASE_URL, toml_url) {
        Some((url, source)) => {
            info!(base_url = %url, "Base URL loaded from {}", source);
            url
        }
        None => DEFAULT_BASE_URL.to_string(),
    }
}

/// Resolve batch credentials
///
/// Username: CLI → ENV → TOML. Password: ENV → TOML.
pub fn resolve_credentials(cli_username: Option<&str>, toml_config: &TomlConfig) -> Result<Credentials> {
    let username = resolve_setting(
        "Username",
        cli_username,
        ENV_USERNAME,
        toml_config.remote.username.as_deref(),
    );
    let password = resolve_setting(
        "Password",
        None,
        ENV_PASSWORD,
        toml_config.remote.password.as_deref(),
    );

    match (username, password) {
        (Some((username, user_source)), Some((password, pass_source))) => {
            info!(
                username = %username,
                "Credentials loaded (username from {}, password from {})",
                user_source,
                pass_source
            );
            Ok(Credentials { username, password })
        }
        (None, _) => Err(Error::Config(format!(
            "Username not configured. Please configure using one of:\n\
             1. Command line: --username <name>\n\
             2. Environment: {}=<name>\n\
             3. TOML config: [remote] username = \"<name>\"",
            ENV_USERNAME
        ))),
        (Some(_), None) => Err(Error::Config(format!(
            "Password not configured. Please configure using one of:\n\
             1. Environment: {}=<password>\n\
             2. TOML config: [remote] password = \"<password>\"",
            ENV_PASSWORD
        ))),
    }
}

/// Resolve everything a run needs
pub fn resolve_settings(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<IngestSettings> {
    let remote = RemoteConfig {
        base_url: resolve_base_url(cli.base_url.as_deref(), toml_config),
        ..toml_config.remote.clone()
    };
    let credentials = resolve_credentials(cli.username.as_deref(), toml_config)?;

    Ok(IngestSettings {
        remote,
        credentials,
        provenance: ProvenanceConfig::from(&toml_config.provenance),
    })
}
