//! Error types for snipbox
//!
//! Only infrastructure problems and request validation surface as `SnipError`.
//! Compile failures, non-zero exits, timeouts and output overflow are
//! reported as data inside [`crate::executor::ExecutionResult`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for snipbox operations
pub type SnipResult<T> = Result<T, SnipError>;

/// A single file that could not be removed during a cleanup pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Main error type for snipbox
#[derive(Error, Debug, Clone)]
pub enum SnipError {
    /// Extension or language name is not in the registry
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Submitted file does not exist
    #[error("File does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File refused by the size/extension screening
    #[error("File rejected: {}: {reason}", path.display())]
    SecurityRejected { path: PathBuf, reason: String },

    /// Staging, copy or working-directory failure
    #[error("IO error: {message}")]
    Io {
        message: String,
        context: Option<String>,
    },

    /// Configuration loading or validation failure
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// One or more temporary files could not be removed
    #[error("Cleanup removed {removed} file(s) but failed on {}: {}", failures.len(), join_failures(failures))]
    Cleanup {
        removed: usize,
        failures: Vec<CleanupFailure>,
    },

    /// Internal invariant broken
    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_failures(failures: &[CleanupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SnipError {
    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            context: None,
        }
    }

    /// Create an IO error with context
    pub fn io_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage(_) => "SNIP_UNSUPPORTED_LANGUAGE",
            Self::FileNotFound(_) => "SNIP_FILE_NOT_FOUND",
            Self::SecurityRejected { .. } => "SNIP_SECURITY_REJECTED",
            Self::Io { .. } => "SNIP_IO",
            Self::Config { .. } => "SNIP_CONFIG",
            Self::Cleanup { .. } => "SNIP_CLEANUP",
            Self::Internal(_) => "SNIP_INTERNAL",
        }
    }

    /// Get optional context about the error
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Io { context, .. } | Self::Config { context, .. } => context.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SnipError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for SnipError {
    fn from(error: serde_json::Error) -> Self {
        Self::config(format!("JSON error: {}", error))
    }
}

impl From<toml::de::Error> for SnipError {
    fn from(error: toml::de::Error) -> Self {
        Self::config(format!("TOML error: {}", error))
    }
}
