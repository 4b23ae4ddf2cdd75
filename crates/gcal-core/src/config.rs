use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable overriding `account.email`.
pub const EMAIL_ENV: &str = "GCAL_EMAIL";
/// Environment variable holding the account password. Never read from disk.
pub const PASSWORD_ENV: &str = "GCAL_PASSWORD";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Endpoints and transport settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Account used to sign in
    #[serde(default)]
    pub account: AccountConfig,

    /// Event query defaults
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// ClientLogin endpoint
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Base URL of the calendar feeds
    #[serde(default = "default_feeds_url")]
    pub feeds_url: String,

    /// Client identifier sent at login
    #[serde(default = "default_source")]
    pub source: String,

    /// Request timeout in seconds (unset: no client-side timeout)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Allow invalid/self-signed certificates
    ///
    /// WARNING: This is a security risk. Only for legacy or local endpoints.
    #[serde(default)]
    pub allow_invalid_certs: bool,
}

fn default_login_url() -> String {
    "https://www.google.com/accounts/ClientLogin".to_string()
}

fn default_feeds_url() -> String {
    "https://www.google.com/calendar/feeds".to_string()
}

fn default_source() -> String {
    "gcal-rs-1.0".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            feeds_url: default_feeds_url(),
            source: default_source(),
            timeout_secs: None,
            allow_invalid_certs: false,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Google account email. The password is only taken from the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AccountConfig {
    /// `GCAL_EMAIL` if set, else the configured email.
    pub fn resolved_email(&self) -> Option<String> {
        std::env::var(EMAIL_ENV)
            .ok()
            .filter(|e| !e.is_empty())
            .or_else(|| self.email.clone())
    }

    pub fn password_from_env() -> Option<String> {
        std::env::var(PASSWORD_ENV).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Page size for event queries (default: 25)
    #[serde(default = "default_max_results")]
    pub default_max_results: u32,

    /// IANA zone for dates given without an offset
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_max_results() -> u32 {
    25
}

fn default_timezone() -> String {
    "Europe/Stockholm".to_string()
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            timezone: default_timezone(),
        }
    }
}

impl EventsConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone: {}", self.timezone)))
    }
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails; warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load_validated_from(&Self::config_path()?)
    }

    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.service.login_url, "service.login_url", &mut result);
        self.validate_url(&self.service.feeds_url, "service.feeds_url", &mut result);

        if self.service.source.trim().is_empty() {
            result.add_error("service.source", "Client identifier must not be empty");
        }

        if self.service.timeout_secs == Some(0) {
            result.add_error("service.timeout_secs", "Timeout must be greater than 0");
        }

        if self.service.allow_invalid_certs {
            result.add_warning(
                "service.allow_invalid_certs",
                "TLS certificate verification is disabled",
            );
        }

        if self.account.resolved_email().is_none() {
            result.add_warning(
                "account.email",
                format!("No account email configured (set it here or via {})", EMAIL_ENV),
            );
        }

        if self.events.default_max_results == 0 {
            result.add_error(
                "events.default_max_results",
                "Page size must be greater than 0",
            );
        }

        if let Err(e) = self.events.tz() {
            result.add_error("events.timezone", e.to_string());
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                } else if url.scheme() == "http" {
                    result.add_warning(field_name, "URL is not encrypted (http)");
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Write configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("gcal");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.service.feeds_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "service.feeds_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.service.login_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_unknown_timezone() {
        let mut config = Config::default();
        config.events.timezone = "Mars/Olympus_Mons".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "events.timezone"));
    }

    #[test]
    fn test_zero_page_size_and_timeout() {
        let mut config = Config::default();
        config.events.default_max_results = 0;
        config.service.timeout_secs = Some(0);
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "events.default_max_results"));
        assert!(result.errors.iter().any(|e| e.field == "service.timeout_secs"));
    }

    #[test]
    fn test_insecure_tls_is_warning() {
        let mut config = Config::default();
        config.service.allow_invalid_certs = true;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "service.allow_invalid_certs"));
    }

    #[test]
    fn test_missing_email_is_warning() {
        if std::env::var(EMAIL_ENV).is_ok() {
            return;
        }
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "account.email"));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        // First load writes the defaults.
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.events.default_max_results, 25);

        let mut config = config;
        config.account.email = Some("me@example.com".to_string());
        config.service.timeout_secs = Some(30);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.account.email.as_deref(), Some("me@example.com"));
        assert_eq!(loaded.service.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[events]\ntimezone = \"UTC\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.events.timezone, "UTC");
        assert_eq!(config.events.default_max_results, 25);
        assert_eq!(config.service.feeds_url, "https://www.google.com/calendar/feeds");
        assert_eq!(config.events.tz().unwrap(), Tz::UTC);
    }

    #[test]
    fn test_load_validated_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[events]\ndefault_max_results = 0\n").unwrap();

        let err = Config::load_validated_from(&path).unwrap_err();
        assert!(err.to_string().contains("events.default_max_results"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
