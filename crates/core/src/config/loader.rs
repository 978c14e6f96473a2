use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("ANDROSCALER_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[remote]
base_url = "http://images.example.com:9000"
request_timeout_secs = 120

[engine]
folder_tag = "batch-a"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.remote.base_url, "http://images.example.com:9000");
        assert_eq!(config.remote.request_timeout_secs, Some(120));
        assert_eq!(config.engine.folder_tag, "batch-a");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.remote.base_url, "http://localhost:8000");
        assert!(config.engine.stage_timeout_secs.is_none());
    }

    #[test]
    fn test_load_config_from_str_invalid() {
        let result = load_config_from_str("remote = \"not a table\"");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[remote]
base_url = "http://10.0.0.5:8000"

[engine]
stage_timeout_secs = 300
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.remote.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.engine.stage_timeout_secs, Some(300));
    }
}
