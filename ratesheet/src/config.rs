//! Application configuration.
//!
//! Resolved once at start-up from the environment (a `.env` file is loaded
//! first when present):
//!
//! | Variable                        | Meaning                                   |
//! |---------------------------------|-------------------------------------------|
//! | `RATESHEET_BASE_URL`            | Base URL of the upload service (required) |
//! | `RATESHEET_UPLOAD_TIMEOUT_SECS` | Upload timeout in seconds (optional)      |

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the upload service base URL.
pub const BASE_URL_VAR: &str = "RATESHEET_BASE_URL";

/// Environment variable holding the optional upload timeout.
pub const TIMEOUT_VAR: &str = "RATESHEET_UPLOAD_TIMEOUT_SECS";

/// Rows shown by default when previewing a file.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL without trailing slash; uploads go to `{base_url}/upload`.
    pub base_url: String,
    /// No timeout when `None`.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Build a config from an explicit base URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Config::from_env`], with an explicit base URL taking priority.
    pub fn from_env_with_base_url(base_url: Option<&str>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| match (key, base_url) {
            (BASE_URL_VAR, Some(url)) => Some(url.to_string()),
            _ => env::var(key).ok(),
        })
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl(BASE_URL_VAR))?;

        let mut config = Self::new(&base_url)?;

        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Full URL of the upload endpoint.
    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = Config::new("https://rates.example.com/api/").unwrap();
        assert_eq!(config.upload_url(), "https://rates.example.com/api/upload");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            Config::new("rates.example.com"),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_missing_base_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(BASE_URL_VAR));
    }

    #[test]
    fn test_timeout_parsing() {
        let config = Config::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://localhost:8080"),
            (TIMEOUT_VAR, "30"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));

        let err = Config::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://localhost:8080"),
            (TIMEOUT_VAR, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }

    #[test]
    fn test_no_timeout_by_default() {
        let config = Config::from_lookup(lookup(&[(BASE_URL_VAR, "http://localhost:8080")])).unwrap();
        assert_eq!(config.timeout, None);
    }
}
