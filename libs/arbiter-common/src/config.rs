use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_JUDGE_URL: &str = "http://localhost:2358";

/// Judge orchestration configuration
/// Provides defaults with environment variable overrides
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeConfig {
    pub judge_url: String,
    pub poll_interval_ms: u64,
    pub overall_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_concurrency: usize,
    pub language_config_path: Option<PathBuf>,
}

impl JudgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparseable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            judge_url: lookup("JUDGE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_JUDGE_URL.to_string()),
            poll_interval_ms: number("JUDGE_POLL_INTERVAL_MS", 1000),
            overall_timeout_ms: number("JUDGE_TIMEOUT_MS", 20_000),
            request_timeout_ms: number("JUDGE_REQUEST_TIMEOUT_MS", 5000),
            max_concurrency: number("JUDGE_MAX_CONCURRENCY", 4) as usize,
            language_config_path: lookup("LANGUAGE_CONFIG_PATH").map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.judge_url.starts_with("http://") || self.judge_url.starts_with("https://")) {
            bail!("JUDGE_URL must be an http(s) URL, got '{}'", self.judge_url);
        }
        if self.poll_interval_ms == 0 {
            bail!("JUDGE_POLL_INTERVAL_MS must be greater than zero");
        }
        if self.overall_timeout_ms < self.poll_interval_ms {
            bail!(
                "JUDGE_TIMEOUT_MS ({}) must be at least one poll interval ({})",
                self.overall_timeout_ms,
                self.poll_interval_ms
            );
        }
        if self.request_timeout_ms == 0 {
            bail!("JUDGE_REQUEST_TIMEOUT_MS must be greater than zero");
        }
        if self.max_concurrency == 0 {
            bail!("JUDGE_MAX_CONCURRENCY must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> JudgeConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        JudgeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = JudgeConfig::default();
        assert_eq!(config.judge_url, "http://localhost:2358");
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.overall_timeout_ms, 20_000);
        assert_eq!(config.max_concurrency, 4);
        assert!(config.language_config_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides() {
        let config = from_map(&[
            ("JUDGE_URL", "https://judge.internal:2358/"),
            ("JUDGE_POLL_INTERVAL_MS", "250"),
            ("JUDGE_MAX_CONCURRENCY", "16"),
        ]);
        assert_eq!(config.judge_url, "https://judge.internal:2358");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.max_concurrency, 16);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = from_map(&[("JUDGE_TIMEOUT_MS", "soon")]);
        assert_eq!(config.overall_timeout_ms, 20_000);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(from_map(&[("JUDGE_URL", "localhost:2358")]).validate().is_err());
        assert!(from_map(&[("JUDGE_POLL_INTERVAL_MS", "0")]).validate().is_err());
        assert!(from_map(&[("JUDGE_MAX_CONCURRENCY", "0")]).validate().is_err());
        assert!(from_map(&[
            ("JUDGE_POLL_INTERVAL_MS", "5000"),
            ("JUDGE_TIMEOUT_MS", "1000"),
        ])
        .validate()
        .is_err());
    }
}
