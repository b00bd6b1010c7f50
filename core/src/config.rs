//! Transport configuration: the three socket timeouts and the base endpoint.
//!
//! `TransportConfig` can only hold valid values. Untrusted input (a TOML file
//! or any signed millisecond value) goes through `TransportSettings`, which
//! rejects negative timeouts when converted.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated transport configuration, consumed by `ApiClient::builder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    base_url: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Load settings from a TOML file and validate them.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: TransportSettings = toml::from_str(content)?;
        Self::try_from(settings)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }
}

/// Builder for `TransportConfig`. `Duration` cannot be negative, so the
/// builder never fails.
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    pub fn build(self) -> TransportConfig {
        let mut config = self.config;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config
    }
}

/// Raw, unvalidated settings as they appear in a config file.
///
/// ```toml
/// base_url = "http://localhost:3000"
/// connect_timeout_ms = 5000
/// read_timeout_ms = 10000
/// write_timeout_ms = 10000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout_ms: i64,
    pub read_timeout_ms: i64,
    pub write_timeout_ms: i64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        let default_ms = DEFAULT_TIMEOUT.as_millis() as i64;
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_ms: default_ms,
            read_timeout_ms: default_ms,
            write_timeout_ms: default_ms,
        }
    }
}

impl TryFrom<TransportSettings> for TransportConfig {
    type Error = ConfigError;

    fn try_from(settings: TransportSettings) -> Result<Self, Self::Error> {
        Ok(TransportConfig::builder()
            .base_url(settings.base_url)
            .connect_timeout(non_negative("connect_timeout", settings.connect_timeout_ms)?)
            .read_timeout(non_negative("read_timeout", settings.read_timeout_ms)?)
            .write_timeout(non_negative("write_timeout", settings.write_timeout_ms)?)
            .build())
    }
}

fn non_negative(field: &'static str, value_ms: i64) -> Result<Duration, ConfigError> {
    u64::try_from(value_ms)
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::NegativeTimeout { field, value_ms })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_finite() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
        assert_eq!(config.write_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn default_base_url_has_no_trailing_slash() {
        assert!(!TransportConfig::default().base_url().ends_with('/'));
        assert_eq!(TransportConfig::default(), TransportConfig::builder().build());
    }

    #[test]
    fn builder_strips_trailing_slash() {
        let config = TransportConfig::builder()
            .base_url("http://localhost:3000/")
            .build();
        assert_eq!(config.base_url(), "http://localhost:3000");
    }

    #[test]
    fn timeouts_are_independent() {
        let config = TransportConfig::builder()
            .connect_timeout(Duration::from_millis(100))
            .read_timeout(Duration::from_millis(200))
            .write_timeout(Duration::from_millis(300))
            .build();
        assert_eq!(config.connect_timeout(), Duration::from_millis(100));
        assert_eq!(config.read_timeout(), Duration::from_millis(200));
        assert_eq!(config.write_timeout(), Duration::from_millis(300));
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = TransportConfig::from_toml_str(
            r#"
            base_url = "http://localhost:3000/"
            read_timeout_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000");
        assert_eq!(config.read_timeout(), Duration::from_millis(1500));
        assert_eq!(config.connect_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn zero_timeout_is_accepted() {
        let config = TransportConfig::from_toml_str("write_timeout_ms = 0").unwrap();
        assert_eq!(config.write_timeout(), Duration::ZERO);
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let err = TransportConfig::from_toml_str("connect_timeout_ms = -1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NegativeTimeout {
                field: "connect_timeout",
                value_ms: -1
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = TransportConfig::from_toml_str("read_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TransportConfig::from_file(Path::new("/nonexistent/post-client.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
