//! Tracing subscriber initialization
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to
//! every target. The subscriber is installed before the config file is read,
//! so the level is applied afterwards through a [`LogLevelHandle`].

use crate::config::LoggingConfig;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Build the env filter for the given logging config
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Swaps the active filter once the real config is known
#[derive(Clone)]
pub struct LogLevelHandle(reload::Handle<EnvFilter, Registry>);

impl LogLevelHandle {
    pub fn apply(&self, config: &LoggingConfig) -> crate::Result<()> {
        self.0
            .reload(env_filter(config))
            .map_err(|e| crate::Error::Internal(format!("Failed to apply log level: {}", e)))
    }
}

/// Install the global fmt subscriber
///
/// Returns an error if a global subscriber is already set (e.g. in tests).
pub fn init_tracing(config: &LoggingConfig) -> crate::Result<LogLevelHandle> {
    let (filter, handle) = reload::Layer::new(env_filter(config));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| crate::Error::Internal(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(LogLevelHandle(handle))
}
