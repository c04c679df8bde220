//! Runtime configuration
//!
//! Values come from compiled-in defaults, then an optional config file,
//! then `SNIPBOX_*` environment variables.

pub mod defaults;
mod loader;

pub use loader::{load, load_from_file};

use crate::error::{SnipError, SnipResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, compact, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnipboxConfig {
    /// Shared working directory for staged and temporary files
    pub work_dir: PathBuf,

    /// Run budget for interpreted languages; compiled ones get double
    #[serde(with = "humantime_serde")]
    pub base_timeout: Duration,

    /// Stdout cap in bytes
    pub max_output_bytes: usize,

    /// Largest source file accepted
    pub max_file_size_bytes: u64,

    /// Executions admitted at once
    pub max_concurrent_executions: usize,

    /// Prefix for files eligible for cleanup
    pub temp_prefix: String,

    /// Only remove temporary files older than this during cleanup
    #[serde(with = "humantime_serde")]
    pub cleanup_max_age: Option<Duration>,

    pub logging: LoggingConfig,
}

impl Default for SnipboxConfig {
    fn default() -> Self {
        Self {
            work_dir: defaults::work_dir(),
            base_timeout: defaults::base_timeout(),
            max_output_bytes: defaults::MAX_OUTPUT_BYTES,
            max_file_size_bytes: defaults::MAX_FILE_SIZE_BYTES,
            max_concurrent_executions: defaults::MAX_CONCURRENT_EXECUTIONS,
            temp_prefix: defaults::TEMP_PREFIX.to_string(),
            cleanup_max_age: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl SnipboxConfig {
    /// Set working directory
    pub fn with_work_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_dir = path.into();
        self
    }

    /// Set the base run timeout
    pub fn with_base_timeout(mut self, timeout: Duration) -> Self {
        self.base_timeout = timeout;
        self
    }

    /// Set output size limit
    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    /// Set file size limit
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    /// Set the concurrency bound
    pub fn with_max_concurrent(mut self, permits: usize) -> Self {
        self.max_concurrent_executions = permits;
        self
    }

    /// Apply `SNIPBOX_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) -> SnipResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> SnipResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SNIPBOX_WORK_DIR") {
            self.work_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("SNIPBOX_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| SnipError::config("Invalid SNIPBOX_TIMEOUT_SECS value"))?;
            self.base_timeout = Duration::from_secs(secs);
        }

        if let Some(bytes) = lookup("SNIPBOX_MAX_OUTPUT_BYTES") {
            self.max_output_bytes = bytes
                .parse()
                .map_err(|_| SnipError::config("Invalid SNIPBOX_MAX_OUTPUT_BYTES value"))?;
        }

        if let Some(permits) = lookup("SNIPBOX_MAX_CONCURRENCY") {
            self.max_concurrent_executions = permits
                .parse()
                .map_err(|_| SnipError::config("Invalid SNIPBOX_MAX_CONCURRENCY value"))?;
        }

        if let Some(level) = lookup("SNIPBOX_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> SnipResult<()> {
        if self.base_timeout.is_zero() {
            return Err(SnipError::config("base_timeout must be greater than zero"));
        }
        if self.max_output_bytes == 0 {
            return Err(SnipError::config("max_output_bytes must be greater than zero"));
        }
        if self.max_file_size_bytes == 0 {
            return Err(SnipError::config("max_file_size_bytes must be greater than zero"));
        }
        if self.max_concurrent_executions == 0 {
            return Err(SnipError::config(
                "max_concurrent_executions must be at least 1",
            ));
        }
        if self.temp_prefix.is_empty() || self.temp_prefix.contains('/') {
            return Err(SnipError::config_with_context(
                "temp_prefix must be a non-empty file name prefix",
                format!("got '{}'", self.temp_prefix),
            ));
        }
        Ok(())
    }
}
