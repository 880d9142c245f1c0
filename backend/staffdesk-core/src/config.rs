// src/config.rs

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{Result, StaffdeskError};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5042/api";
pub const DEFAULT_SESSION_FILE: &str = "./staffdesk_session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_file: default_session_file(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Reads `STAFFDESK_API_BASE_URL`, `STAFFDESK_SESSION_FILE` and
    /// `STAFFDESK_REQUEST_TIMEOUT_SECS`, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let settings = envy::prefixed("STAFFDESK_")
            .from_env::<Settings>()
            .map_err(|e| StaffdeskError::ConfigError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url).map_err(|e| {
            StaffdeskError::ConfigError(format!(
                "Invalid API base URL '{}': {}",
                self.api_base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StaffdeskError::ConfigError(format!(
                "API base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(StaffdeskError::ConfigError(
                "Request timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://localhost:5042/api");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_envy_reads_prefixed_values() {
        let vars = vec![
            ("STAFFDESK_API_BASE_URL".to_string(), "https://hr.example.com/api".to_string()),
            ("STAFFDESK_REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
        ];
        let settings: Settings = envy::prefixed("STAFFDESK_").from_iter(vars).unwrap();
        assert_eq!(settings.api_base_url, "https://hr.example.com/api");
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
    }

    #[test]
    fn test_rejects_bad_values() {
        let settings = Settings {
            api_base_url: "ftp://hr.example.com".to_string(),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(StaffdeskError::ConfigError(_))));

        let settings = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(StaffdeskError::ConfigError(_))));
    }
}
