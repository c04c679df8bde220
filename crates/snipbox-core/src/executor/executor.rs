//! Run phase: launch an artifact under the time and output bounds

use super::types::{ExecutionResult, ExecutionStatus};
use crate::languages::LanguageProfile;
use crate::process::{ProcessOutcome, ProcessSpec, run_bounded};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Runs compiled or interpreted artifacts
#[derive(Debug, Clone)]
pub struct Executor {
    work_dir: PathBuf,
    max_output_bytes: usize,
}

impl Executor {
    pub fn new(work_dir: impl Into<PathBuf>, max_output_bytes: usize) -> Self {
        Self {
            work_dir: work_dir.into(),
            max_output_bytes,
        }
    }

    /// Run `artifact` with the profile's interpreter (or directly) and
    /// return the terminal result. Never fails: a launch error is reported
    /// as [`ExecutionStatus::LaunchFailed`].
    pub async fn run(&self, artifact: &Path, profile: &LanguageProfile) -> ExecutionResult {
        self.run_with_timeout(artifact, profile, profile.timeout).await
    }

    /// Same as [`Executor::run`] with an explicit wall-clock budget
    pub async fn run_with_timeout(
        &self,
        artifact: &Path,
        profile: &LanguageProfile,
        timeout: Duration,
    ) -> ExecutionResult {
        info!("Executing {} ({})", artifact.display(), profile.name);

        let mut spec = ProcessSpec::new(profile.run_command_for(artifact), &self.work_dir)
            .timeout(timeout)
            .max_output_bytes(self.max_output_bytes);
        for (key, value) in &profile.env {
            spec = spec.env(key, value);
        }

        let output = match run_bounded(&spec).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to start {}: {}", spec.command.program, e);
                return ExecutionResult {
                    success: false,
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: None,
                    signal: None,
                    status: ExecutionStatus::LaunchFailed {
                        reason: format!("failed to start `{}`: {}", spec.command.program, e),
                    },
                    execute_duration: Duration::ZERO,
                    compile_duration: None,
                    compiled: false,
                    language: profile.name.clone(),
                };
            }
        };

        let (status, exit_code, signal) = match output.outcome {
            ProcessOutcome::Exited { code, signal } => (ExecutionStatus::Completed, code, signal),
            ProcessOutcome::TimedOut => {
                warn!("{} timed out after {:?}", artifact.display(), timeout);
                (ExecutionStatus::TimedOut { limit: timeout }, None, None)
            }
            ProcessOutcome::OutputExceeded => {
                warn!(
                    "{} exceeded the {} byte output limit",
                    artifact.display(),
                    self.max_output_bytes
                );
                (
                    ExecutionStatus::OutputExceeded {
                        limit_bytes: self.max_output_bytes,
                    },
                    None,
                    None,
                )
            }
        };

        let success = matches!(status, ExecutionStatus::Completed) && exit_code == Some(0);

        info!(
            "Execution completed: success={}, exit_code={:?}, time={:?}",
            success, exit_code, output.duration
        );

        ExecutionResult {
            success,
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code,
            signal,
            status,
            execute_duration: output.duration,
            compile_duration: None,
            compiled: false,
            language: profile.name.clone(),
        }
    }
}
