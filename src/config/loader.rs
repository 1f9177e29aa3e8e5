use std::path::Path;

use super::{AppConfig, ConfigError};

/// Load and validate configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_missing_config() {
        let result = load_config("/nonexistent/config.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let file = write_config("invalid: yaml: content: [");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let file = write_config(
            r#"
server:
  port: 8066
  host: "127.0.0.1"
  path: "/proxy"

upstream:
  base_url: "http://localhost:9090/v1beta/"
  default_model: "gemini-2.5-flash-preview-05-20"
  timeout_seconds: 30
  api_key_env: "MY_GEMINI_KEY"

logging:
  format: "json"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.port, 8066);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.path, "/proxy");
        assert_eq!(config.upstream.base_url(), "http://localhost:9090/v1beta");
        assert_eq!(config.upstream.default_model, "gemini-2.5-flash-preview-05-20");
        assert_eq!(config.upstream.timeout_seconds, 30);
        assert_eq!(config.upstream.api_key_env, "MY_GEMINI_KEY");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_config_minimal() {
        let file = write_config("upstream:\n  timeout_seconds: 10\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.upstream.timeout_seconds, 10);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_config_fails_validation() {
        let file = write_config("upstream:\n  base_url: \"gopher://example.com\"\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_config_from_file() {
        let result = AppConfig::from_file("/nonexistent/path.yaml");
        assert!(result.is_err());
    }
}
