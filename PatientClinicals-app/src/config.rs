//! Runtime configuration, read from the environment

use std::time::Duration;

use patient_clinicals_data::DEFAULT_BASE_URL;
use thiserror::Error;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("REQUEST_TIMEOUT_SECS must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),

    #[error("PATIENT_SERVICES_URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

/// Settings of the terminal client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Root of the patient services API
    pub base_url: String,
    pub request_timeout: Duration,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Read `PATIENT_SERVICES_URL`, `REQUEST_TIMEOUT_SECS` and `RUST_LOG`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("PATIENT_SERVICES_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidBaseUrl(url));
            }
            config.base_url = url;
        }

        if let Some(raw) = get("REQUEST_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(filter) = get("RUST_LOG") {
            config.log_filter = filter;
        }

        Ok(config)
    }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/patientservices");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PATIENT_SERVICES_URL", "https://clinic.example.org/patientservices"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("RUST_LOG", "patient_clinicals_domain=debug"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://clinic.example.org/patientservices");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.log_filter, "patient_clinicals_domain=debug");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[("PATIENT_SERVICES_URL", "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidTimeout("0".to_string()))
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidTimeout("soon".to_string()))
        );
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PATIENT_SERVICES_URL", "localhost:8080")])),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }
}
