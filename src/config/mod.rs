mod credential;
mod loader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use credential::Credential;
pub use loader::load_config;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Proxy server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Route the proxy handler is mounted on
    #[serde(default = "default_path")]
    pub path: String,
    /// Upper bound on the inbound request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_path() -> String {
    "/api/gemini-proxy".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            path: default_path(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Upstream Gemini API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// API root, e.g. "https://generativelanguage.googleapis.com/v1beta"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used when the request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_seconds: default_timeout(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl UpstreamConfig {
    /// Returns the base URL with trailing slash stripped
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns true if the URL uses HTTPS
    pub fn is_tls(&self) -> bool {
        self.base_url.to_lowercase().starts_with("https://")
    }

    /// Read the credential from the configured environment variable
    pub fn load_credential(&self) -> Option<Credential> {
        Credential::from_env(&self.api_key_env)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// The file `load_or_default` would read: the explicit path, else the first default path that exists
    pub fn resolve_path(config_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.to_path_buf());
        }
        ["config.yaml", "config.yml", "./config/config.yaml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    /// Load configuration with fallback to default paths, then built-in defaults
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::resolve_path(config_path) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
        }
        if !self.server.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "server.path must start with '/': {}",
                self.server.path
            )));
        }
        if self.upstream.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "upstream.timeout_seconds must be non-zero".to_string(),
            ));
        }

        let url = url::Url::parse(self.upstream.base_url()).map_err(|e| {
            ConfigError::Validation(format!("upstream.base_url is not a valid URL: {}", e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "upstream.base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        if crate::api::normalize_model_id(&self.upstream.default_model).is_none() {
            return Err(ConfigError::Validation(format!(
                "upstream.default_model is not a valid model identifier: {}",
                self.upstream.default_model
            )));
        }
        if self.upstream.api_key_env.trim().is_empty() {
            return Err(ConfigError::Validation(
                "upstream.api_key_env must name an environment variable".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.path, "/api/gemini-proxy");
        assert_eq!(config.upstream.default_model, "gemini-2.5-flash");
        assert_eq!(config.upstream.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.upstream.timeout_seconds, 120);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upstream_base_url_trailing_slash() {
        let config = UpstreamConfig {
            base_url: "http://localhost:8080/v1beta/".to_string(),
            ..UpstreamConfig::default()
        };
        assert_eq!(config.base_url(), "http://localhost:8080/v1beta");
        assert!(!config.is_tls());
    }

    #[test]
    fn test_upstream_is_tls() {
        assert!(UpstreamConfig::default().is_tls());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.base_url, default_base_url());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig = serde_yaml::from_str("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.path, "/api/gemini-proxy");
        assert_eq!(config.server.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_log_format_serde() {
        assert_eq!(serde_json::to_string(&LogFormat::Pretty).unwrap(), "\"pretty\"");
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
        let compact: LogFormat = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(compact, LogFormat::Compact);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_bad_path() {
        let mut config = AppConfig::default();
        config.server.path = "api/gemini-proxy".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.path"));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.upstream.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.upstream.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_bad_default_model() {
        let mut config = AppConfig::default();
        config.upstream.default_model = "../secrets".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_model"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.upstream.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound("test.yaml".to_string());
        assert!(err.to_string().contains("test.yaml"));

        let err = ConfigError::Parse(serde_yaml::from_str::<AppConfig>("server: [").unwrap_err());
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_load_or_default_with_missing_path() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/config.yaml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let explicit = Path::new("/nonexistent/config.yaml");
        assert_eq!(AppConfig::resolve_path(Some(explicit)), Some(explicit.to_path_buf()));
    }
}
