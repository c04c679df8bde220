//! Compile step results

use crate::languages::LanguageProfile;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Output of a successful compile step
#[derive(Debug, Clone)]
pub struct CompiledArtifact {
    /// Runnable file: the binary, or the source for interpreted languages
    pub path: PathBuf,

    /// Whether `path` is a freshly produced binary owned by the request
    pub produced_binary: bool,

    /// Time spent in the compiler or checker
    pub duration: Duration,
}

/// Why a compile step failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileFailureReason {
    /// Compiler exited non-zero
    ExitCode { code: i32 },
    /// Compiler was killed by a signal it did not get from us
    Signal { signal: i32 },
    /// Compile budget exceeded; compiler group killed
    Timeout {
        #[serde(with = "humantime_serde")]
        limit: Duration,
    },
    /// Compiler diagnostics went over the output cap
    OutputExceeded,
    /// Compiler exited 0 but left no artifact
    ArtifactMissing,
    /// Compiler binary could not be started
    LaunchFailed,
}

impl std::fmt::Display for CompileFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExitCode { code } => write!(f, "exit code {}", code),
            Self::Signal { signal } => write!(f, "killed by signal {}", signal),
            Self::Timeout { .. } => write!(f, "timeout"),
            Self::OutputExceeded => write!(f, "output limit exceeded"),
            Self::ArtifactMissing => write!(f, "artifact missing"),
            Self::LaunchFailed => write!(f, "compiler not available"),
        }
    }
}

/// A failed compile or syntax check, carried as data
#[derive(Debug, Clone, Serialize)]
pub struct CompileFailure {
    pub reason: CompileFailureReason,
    pub language: String,
    /// Registered message for the compiler's exit code, if known
    pub known_message: Option<String>,
    /// Raw compiler diagnostics
    pub diagnostics: String,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl CompileFailure {
    pub(crate) fn launch_failed(profile: &LanguageProfile, error: String) -> Self {
        Self {
            reason: CompileFailureReason::LaunchFailed,
            language: profile.name.clone(),
            known_message: None,
            diagnostics: format!("failed to start `{}`: {}", profile.command, error),
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn artifact_missing(profile: &LanguageProfile, duration: Duration) -> Self {
        Self {
            reason: CompileFailureReason::ArtifactMissing,
            language: profile.name.clone(),
            known_message: None,
            diagnostics: "compiler reported success but produced no output file".to_string(),
            duration,
        }
    }

    /// Human-readable message with the known exit-code text prefixed
    pub fn message(&self) -> String {
        match (&self.reason, &self.known_message) {
            (CompileFailureReason::ExitCode { code }, Some(known)) => {
                format!("{} (exit code {}): {}", known, code, self.diagnostics)
            }
            (CompileFailureReason::ExitCode { code }, None) => {
                format!("compilation failed (exit code {}): {}", code, self.diagnostics)
            }
            (CompileFailureReason::Timeout { limit }, _) => {
                format!("compilation exceeded the {:?} time limit", limit)
            }
            (CompileFailureReason::OutputExceeded, _) => {
                format!("compiler output exceeded the limit: {}", self.diagnostics)
            }
            _ => self.diagnostics.clone(),
        }
    }
}

impl std::fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}
