//! Types for bounded execution

use crate::compiler::CompileFailure;
use serde::Serialize;
use std::time::Duration;

/// Terminal state of one request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Process exited by itself (zero or non-zero)
    Completed,

    /// Wall-clock budget exceeded; process group killed
    TimedOut {
        #[serde(with = "humantime_serde")]
        limit: Duration,
    },

    /// Stdout went over the cap; process group killed
    OutputExceeded { limit_bytes: usize },

    /// Interpreter or binary could not be started
    LaunchFailed { reason: String },

    /// Compile step failed; nothing was run
    CompileFailed { failure: CompileFailure },
}

/// Failure taxonomy used by reports and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    RuntimeFailure,
    Timeout,
    OutputExceeded,
    LaunchFailed,
    CompileFailure,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::RuntimeFailure => "runtime failure",
            Self::Timeout => "timeout",
            Self::OutputExceeded => "output exceeded",
            Self::LaunchFailed => "launch failed",
            Self::CompileFailure => "compile failure",
        };
        f.write_str(text)
    }
}

/// Result of one execution request.
///
/// Constructed once at the end of the pipeline and handed to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// True only for a completed run with exit code 0
    pub success: bool,

    /// Captured stdout, never longer than the output cap
    pub stdout: String,

    /// Captured stderr, bounded by the same cap
    pub stderr: String,

    /// Exit code; `None` when killed, timed out or never started
    pub exit_code: Option<i32>,

    /// Terminating signal if the process died from one
    pub signal: Option<i32>,

    /// How the request ended
    pub status: ExecutionStatus,

    /// Run-phase wall-clock time (zero if the run never started)
    #[serde(with = "humantime_serde")]
    pub execute_duration: Duration,

    /// Compile-phase time, when a compile or check step ran
    #[serde(with = "humantime_serde")]
    pub compile_duration: Option<Duration>,

    /// Whether a binary was produced by a compiler
    pub compiled: bool,

    /// Canonical language name
    pub language: String,
}

impl ExecutionResult {
    /// Result for a request whose compile step failed
    pub fn compile_failed(
        language: impl Into<String>,
        needs_compile: bool,
        failure: CompileFailure,
    ) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: failure.diagnostics.clone(),
            exit_code: None,
            signal: None,
            execute_duration: Duration::ZERO,
            compile_duration: Some(failure.duration),
            compiled: needs_compile,
            language: language.into(),
            status: ExecutionStatus::CompileFailed { failure },
        }
    }

    /// Attach compile-phase information before handing the result out
    pub(crate) fn with_compile_phase(mut self, duration: Duration, produced_binary: bool) -> Self {
        self.compile_duration = Some(duration);
        self.compiled = produced_binary;
        self
    }

    pub fn kind(&self) -> OutcomeKind {
        match &self.status {
            ExecutionStatus::Completed if self.success => OutcomeKind::Success,
            ExecutionStatus::Completed => OutcomeKind::RuntimeFailure,
            ExecutionStatus::TimedOut { .. } => OutcomeKind::Timeout,
            ExecutionStatus::OutputExceeded { .. } => OutcomeKind::OutputExceeded,
            ExecutionStatus::LaunchFailed { .. } => OutcomeKind::LaunchFailed,
            ExecutionStatus::CompileFailed { .. } => OutcomeKind::CompileFailure,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.status, ExecutionStatus::TimedOut { .. })
    }

    /// The compile failure, if the request stopped there
    pub fn compile_failure(&self) -> Option<&CompileFailure> {
        match &self.status {
            ExecutionStatus::CompileFailed { failure } => Some(failure),
            _ => None,
        }
    }

    /// Get combined output (stdout + stderr)
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}
