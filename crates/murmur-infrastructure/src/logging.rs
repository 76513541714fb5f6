//! Tracing subscriber setup.

use anyhow::Context;
use murmur_core::config::LogSettings;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "MURMUR_LOG";

/// Builds the filter for a configured directive such as `info` or
/// `murmur_application=debug,warn`.
pub fn filter_for(level: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("invalid log filter '{level}'"))
}

/// Installs the global fmt subscriber.
///
/// `MURMUR_LOG` wins over `settings.level` when set. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => filter_for(&settings.level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_accepts_directives() {
        assert!(filter_for("info").is_ok());
        assert!(filter_for("murmur_application=debug,warn").is_ok());
    }
}
