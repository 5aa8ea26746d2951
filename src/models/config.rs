//! Runtime configuration model and validation

use crate::defaults;
use crate::types::{AppError, ConfigSource, NetworkPreset, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variables understood by [`Config::merge_from_lookup`]
pub const ENV_TIMEOUT_MS: &str = "ADNLCTL_TIMEOUT_MS";
pub const ENV_DEADLINE_SECS: &str = "ADNLCTL_DEADLINE_SECS";
pub const ENV_CONCURRENCY: &str = "ADNLCTL_CONCURRENCY";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "ADNLCTL_FETCH_TIMEOUT_SECS";
pub const ENV_COLOR: &str = "ADNLCTL_COLOR";
pub const ENV_NO_COLOR: &str = "NO_COLOR";

/// Settings of one `status` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network whose preset is used when no config document is given
    pub network: NetworkPreset,

    /// Path or URL of a config document overriding the preset
    #[serde(default)]
    pub config_source: Option<String>,

    /// Per-probe timeout in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Aggregate deadline for all probes in seconds, 0 disables it
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Maximum concurrent probes, 0 means one per endpoint
    #[serde(default)]
    pub concurrency: usize,

    /// Timeout for fetching a remote config document
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Binary-search the archive depth instead of the quick offset check
    #[serde(default)]
    pub exact_archive_depth: bool,

    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkPreset::Mainnet,
            config_source: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            deadline_secs: default_deadline_secs(),
            concurrency: defaults::DEFAULT_CONCURRENCY,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            exact_archive_depth: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Where the endpoint list comes from
    pub fn source(&self) -> ConfigSource {
        ConfigSource::from_args(self.network, self.config_source.as_deref())
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout_ms == 0 {
            return Err(AppError::validation("Probe timeout must be greater than 0"));
        }

        if self.probe_timeout_ms > defaults::MAX_PROBE_TIMEOUT_MS {
            return Err(AppError::validation(format!(
                "Probe timeout cannot exceed {} ms",
                defaults::MAX_PROBE_TIMEOUT_MS
            )));
        }

        if self.deadline_secs > defaults::MAX_DEADLINE_SECS {
            return Err(AppError::validation(format!(
                "Deadline cannot exceed {} seconds",
                defaults::MAX_DEADLINE_SECS
            )));
        }

        if self.concurrency > defaults::MAX_CONCURRENCY {
            return Err(AppError::validation(format!(
                "Concurrency cannot exceed {}",
                defaults::MAX_CONCURRENCY
            )));
        }

        if self.fetch_timeout_secs == 0 || self.fetch_timeout_secs > defaults::MAX_FETCH_TIMEOUT_SECS {
            return Err(AppError::validation(format!(
                "Fetch timeout must be between 1 and {} seconds",
                defaults::MAX_FETCH_TIMEOUT_SECS
            )));
        }

        if let Some(source) = &self.config_source {
            if let ConfigSource::RemoteUrl(url) = ConfigSource::from_args(self.network, Some(source)) {
                url::Url::parse(&url)
                    .map_err(|e| AppError::validation(format!("Invalid config URL '{}': {}", url, e)))?;
            }
        }

        Ok(())
    }

    /// Merge settings from an arbitrary key lookup
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.probe_timeout_ms = parse_env(ENV_TIMEOUT_MS, &value)?;
        }

        if let Some(value) = lookup(ENV_DEADLINE_SECS) {
            self.deadline_secs = parse_env(ENV_DEADLINE_SECS, &value)?;
        }

        if let Some(value) = lookup(ENV_CONCURRENCY) {
            self.concurrency = parse_env(ENV_CONCURRENCY, &value)?;
        }

        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_SECS) {
            self.fetch_timeout_secs = parse_env(ENV_FETCH_TIMEOUT_SECS, &value)?;
        }

        if let Some(value) = lookup(ENV_COLOR) {
            self.enable_color = parse_env(ENV_COLOR, &value)?;
        }

        // https://no-color.org: presence disables color regardless of value
        if lookup(ENV_NO_COLOR).is_some() {
            self.enable_color = false;
        }

        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid {} value '{}': {}", key, value, e)))
}

// Default value functions for serde
fn default_probe_timeout_ms() -> u64 {
    defaults::DEFAULT_PROBE_TIMEOUT.as_millis() as u64
}

fn default_deadline_secs() -> u64 {
    defaults::DEFAULT_DEADLINE.as_secs()
}

fn default_fetch_timeout_secs() -> u64 {
    defaults::DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probe_timeout(), Duration::from_millis(1000));
        assert_eq!(config.deadline(), Some(Duration::from_secs(120)));
        assert_eq!(config.source(), ConfigSource::Preset(NetworkPreset::Mainnet));
    }

    #[test]
    fn test_zero_deadline_disables_it() {
        let mut config = Config::default();
        config.deadline_secs = 0;
        assert_eq!(config.deadline(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let mut config = Config::default();
        config.probe_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_excessive_concurrency_invalid() {
        let mut config = Config::default();
        config.concurrency = defaults::MAX_CONCURRENCY + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_config_url_invalid() {
        let mut config = Config::default();
        config.config_source = Some("https://".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_from_lookup() {
        let mut config = Config::default();
        config
            .merge_from_lookup(lookup(&[
                (ENV_TIMEOUT_MS, "2500"),
                (ENV_DEADLINE_SECS, "30"),
                (ENV_CONCURRENCY, "4"),
                (ENV_COLOR, "false"),
            ]))
            .unwrap();

        assert_eq!(config.probe_timeout_ms, 2500);
        assert_eq!(config.deadline_secs, 30);
        assert_eq!(config.concurrency, 4);
        assert!(!config.enable_color);
    }

    #[test]
    fn test_no_color_presence_disables_color() {
        let mut config = Config::default();
        config.merge_from_lookup(lookup(&[(ENV_NO_COLOR, "")])).unwrap();
        assert!(!config.enable_color);
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let mut config = Config::default();
        let err = config
            .merge_from_lookup(lookup(&[(ENV_TIMEOUT_MS, "fast")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_MS));
    }
}
