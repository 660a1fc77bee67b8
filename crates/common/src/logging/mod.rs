//! Tracing subscriber setup shared by the gateway and the harvester

use crate::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set, otherwise the configured level
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install the global subscriber, JSON or plain text
pub fn init_tracing(config: &ObservabilityConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_falls_back_to_configured_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let mut config = ObservabilityConfig::default();
        config.log_level = "warn".into();
        assert_eq!(env_filter(&config).to_string(), "warn");
    }
}
