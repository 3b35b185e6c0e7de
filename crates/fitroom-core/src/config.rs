//! Process-wide configuration snapshot.
//!
//! Read once from the environment at startup and passed by reference
//! into each component constructor; no ambient lookups inside business
//! logic, and no dynamic change during a request lifecycle.

use crate::error::{FitroomError, Result};
use std::time::Duration;

/// Which try-on backend handles synthesis requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Local deterministic compositor, no network
    Mock,
    /// The remote DashScope synthesis/tagging services
    Remote,
}

/// Immutable per-process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Synthesis backend selector
    pub provider: Provider,

    /// API key for the remote provider (may be empty when mock)
    pub api_key: String,

    /// Externally reachable address at which this service's uploaded
    /// files can be fetched by the remote provider
    pub public_base_url: String,

    /// Vision-language model identifier for tagging/recommendation
    pub model: String,

    /// TCP connect timeout for every remote call
    pub connect_timeout: Duration,

    /// Read timeout for every remote call
    pub read_timeout: Duration,

    /// Wall-clock budget for the synthesis poll loop
    pub max_wait: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::Mock,
            api_key: String::new(),
            public_base_url: "http://127.0.0.1:8000/".to_string(),
            model: "qwen-vl-plus".to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(180),
            max_wait: Duration::from_secs(120),
        }
    }
}

impl Config {
    /// Build the configuration snapshot from the environment.
    ///
    /// Unset or blank variables fall back to defaults; a malformed
    /// numeric value is a hard `Config` error rather than a silent
    /// default.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let provider = match env_or("TRYON_PROVIDER", "mock").as_str() {
            "dashscope" | "remote" => Provider::Remote,
            _ => Provider::Mock,
        };

        Ok(Self {
            provider,
            api_key: env_or("DASHSCOPE_API_KEY", ""),
            public_base_url: env_or("PUBLIC_BASE_URL", &defaults.public_base_url),
            model: env_or("VL_MODEL", &defaults.model),
            connect_timeout: env_secs(
                "DASHSCOPE_CONNECT_TIMEOUT_SECONDS",
                defaults.connect_timeout,
            )?,
            read_timeout: env_secs("DASHSCOPE_READ_TIMEOUT_SECONDS", defaults.read_timeout)?,
            max_wait: env_secs("TRYON_MAX_WAIT_SECONDS", defaults.max_wait)?,
        })
    }

    /// Fail fast when a remote call is about to be made without a key.
    pub fn require_api_key(&self) -> Result<&str> {
        if self.api_key.trim().is_empty() {
            return Err(FitroomError::config(
                "DASHSCOPE_API_KEY is not set; remote provider calls are unavailable",
            ));
        }
        Ok(self.api_key.trim())
    }
}

fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

fn env_secs(name: &str, default: Duration) -> Result<Duration> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => parse_secs(name, &value),
        _ => Ok(default),
    }
}

/// Parse a duration from a seconds string. Negative and non-finite
/// values are rejected alongside non-numbers; nothing here may panic.
fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            FitroomError::config(format!(
                "{name} must be a non-negative number of seconds, got `{value}`"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.provider, Provider::Mock);
        assert_eq!(config.public_base_url, "http://127.0.0.1:8000/");
        assert_eq!(config.model, "qwen-vl-plus");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_secs(180));
        assert_eq!(config.max_wait, Duration::from_secs(120));
    }

    #[test]
    fn test_parse_secs_accepts_plain_and_fractional() {
        assert_eq!(
            parse_secs("T", "120").unwrap(),
            Duration::from_secs(120)
        );
        assert_eq!(
            parse_secs("T", " 1.5 ").unwrap(),
            Duration::from_secs_f64(1.5)
        );
    }

    #[test]
    fn test_parse_secs_rejects_bad_values_without_panicking() {
        for value in ["-1", "inf", "-inf", "NaN", "ten", ""] {
            let err = parse_secs("TRYON_MAX_WAIT_SECONDS", value).unwrap_err();
            assert!(
                matches!(err, FitroomError::Config { .. }),
                "for `{value}`"
            );
        }
    }

    #[test]
    fn test_require_api_key_rejects_blank() {
        let config = Config::default();
        assert!(config.require_api_key().is_err());

        let config = Config {
            api_key: "  sk-test  ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }
}
