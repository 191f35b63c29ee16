//! Host configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONVERT_POLL_MS: u64 = 2000;
pub const DEFAULT_CONVERT_MAX_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL `{0}`: expected http:// or https://")]
    InvalidBaseUrl(String),
}

/// Everything the host needs to reach the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonemapConfig {
    /// Collaborator base URL, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Delay between conversion status checks.
    pub convert_poll_ms: u64,
    pub convert_max_attempts: u32,
}

impl Default for ZonemapConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            convert_poll_ms: DEFAULT_CONVERT_POLL_MS,
            convert_max_attempts: DEFAULT_CONVERT_MAX_ATTEMPTS,
        }
    }
}

impl ZonemapConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `ZONEMAP_API_BASE_URL`: default `http://localhost:8080`
    /// - `ZONEMAP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `ZONEMAP_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ZONEMAP_CONVERT_POLL_MS`: default 2000
    /// - `ZONEMAP_CONVERT_MAX_ATTEMPTS`: default 30
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = std::env::var("ZONEMAP_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self {
            api_base_url: normalize_base_url(&api_base_url)?,
            request_timeout_secs: env_parse("ZONEMAP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse("ZONEMAP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            convert_poll_ms: env_parse("ZONEMAP_CONVERT_POLL_MS", DEFAULT_CONVERT_POLL_MS),
            convert_max_attempts: env_parse("ZONEMAP_CONVERT_MAX_ATTEMPTS", DEFAULT_CONVERT_MAX_ATTEMPTS),
        }
        .validated()
    }

    /// Replace the base URL, e.g. from a CLI flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is not http(s).
    pub fn with_base_url(self, base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { api_base_url: normalize_base_url(base_url)?, ..self })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn convert_poll_interval(&self) -> Duration {
        Duration::from_millis(self.convert_poll_ms)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        Ok(Self { convert_max_attempts: self.convert_max_attempts.max(1), ..self })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidBaseUrl(raw.to_string())),
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
