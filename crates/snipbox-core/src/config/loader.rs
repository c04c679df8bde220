//! File-based configuration loading

use super::SnipboxConfig;
use crate::error::{SnipError, SnipResult};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load configuration from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> SnipResult<SnipboxConfig> {
    if !path.exists() {
        debug!("Config file {} not found, using defaults", path.display());
        return Ok(SnipboxConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        SnipError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config: SnipboxConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            SnipError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            SnipError::config_with_context(
                format!("Failed to parse YAML config: {}", e),
                format!("Deserializing YAML configuration from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            SnipError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

/// Load the full configuration: file (explicit path or the default
/// location), then environment overrides, then validation.
pub fn load(path: Option<&Path>) -> SnipResult<SnipboxConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => match super::defaults::config_file() {
            Some(default_path) => load_from_file(&default_path)?,
            None => SnipboxConfig::default(),
        },
    };

    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("snipbox.toml");
        fs::write(
            &config_path,
            r#"
work_dir = "/var/tmp/snip"
base_timeout = "10s"
max_output_bytes = 4096
cleanup_max_age = "1h"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.work_dir, Path::new("/var/tmp/snip"));
        assert_eq!(config.base_timeout, Duration::from_secs(10));
        assert_eq!(config.max_output_bytes, 4096);
        assert_eq!(config.cleanup_max_age, Some(Duration::from_secs(3600)));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        // untouched fields keep defaults
        assert_eq!(config.temp_prefix, "tmp_");
    }

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("snipbox.json");
        fs::write(
            &config_path,
            r#"{ "max_concurrent_executions": 3, "base_timeout": "2m" }"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.max_concurrent_executions, 3);
        assert_eq!(config.base_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("snipbox.yaml");
        fs::write(&config_path, "max_file_size_bytes: 512\ntemp_prefix: snip_\n").unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.max_file_size_bytes, 512);
        assert_eq!(config.temp_prefix, "snip_");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.max_output_bytes, 1024 * 1024);
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "base_timeout = [").unwrap();

        let err = load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("TOML"));
        assert!(err.context().unwrap().contains("bad.toml"));
    }
}
