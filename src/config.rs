//! Runtime configuration read from the environment.

use crate::constants;

/// Environment variable holding the geometry service base URL.
pub const SERVICE_URL_VAR: &str = "PILLAR_PREVIEW_URL";
/// Environment variable overriding the debounce window in milliseconds.
pub const DEBOUNCE_VAR: &str = "PILLAR_PREVIEW_DEBOUNCE_MS";
/// Environment variable overriding the settle delay in milliseconds.
pub const SETTLE_VAR: &str = "PILLAR_PREVIEW_SETTLE_MS";
/// Environment variable overriding the preview request timeout in milliseconds.
pub const TIMEOUT_VAR: &str = "PILLAR_PREVIEW_TIMEOUT_MS";
/// Environment variable overriding the STL generation timeout in milliseconds.
pub const GENERATE_TIMEOUT_VAR: &str = "PILLAR_PREVIEW_GENERATE_TIMEOUT_MS";

/// Settings that can differ between deployments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the geometry service, without a trailing slash
    pub service_url: String,
    /// Quiet period before a preview request is issued (seconds)
    pub debounce_secs: f64,
    /// Delay before a pending cycle re-runs (seconds)
    pub settle_secs: f64,
    /// Deadline for a preview request (seconds)
    pub preview_timeout_secs: f64,
    /// Deadline for an STL generation request (seconds)
    pub generate_timeout_secs: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: constants::DEFAULT_SERVICE_URL.to_string(),
            debounce_secs: constants::DEBOUNCE_SECS,
            settle_secs: constants::SETTLE_SECS,
            preview_timeout_secs: constants::PREVIEW_TIMEOUT_SECS,
            generate_timeout_secs: constants::GENERATE_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let service_url = lookup(SERVICE_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.service_url);

        let millis = |key: &str, default: f64| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => ms as f64 / 1000.0,
                Err(e) => {
                    log::warn!("Ignoring {}={:?}: {}", key, raw, e);
                    default
                }
            },
        };

        let config = Self {
            service_url,
            debounce_secs: millis(DEBOUNCE_VAR, defaults.debounce_secs),
            settle_secs: millis(SETTLE_VAR, defaults.settle_secs),
            preview_timeout_secs: millis(TIMEOUT_VAR, defaults.preview_timeout_secs),
            generate_timeout_secs: millis(GENERATE_TIMEOUT_VAR, defaults.generate_timeout_secs),
        };
        log::info!(
            "Using geometry service at {} (debounce {:.0} ms, settle {:.0} ms, timeout {:.0} ms)",
            config.service_url,
            config.debounce_secs * 1000.0,
            config.settle_secs * 1000.0,
            config.preview_timeout_secs * 1000.0
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.service_url, "http://localhost:5000");
        assert_eq!(config.debounce_secs, 0.010);
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (SERVICE_URL_VAR, "http://geometry:8000/"),
            (DEBOUNCE_VAR, "25"),
            (SETTLE_VAR, "100"),
            (TIMEOUT_VAR, "2500"),
        ]));
        assert_eq!(config.service_url, "http://geometry:8000");
        assert_eq!(config.debounce_secs, 0.025);
        assert_eq!(config.settle_secs, 0.1);
        assert_eq!(config.preview_timeout_secs, 2.5);
        assert_eq!(config.generate_timeout_secs, constants::GENERATE_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[(DEBOUNCE_VAR, "soon")]));
        assert_eq!(config.debounce_secs, constants::DEBOUNCE_SECS);
    }
}
