//! Compile and syntax-check step
//!
//! Natively compiled languages produce a binary next to the source; for
//! interpreted languages the compile step is a syntax check and the source
//! itself stays the artifact.

mod types;

#[cfg(test)]
mod tests;

pub use types::{CompileFailure, CompileFailureReason, CompiledArtifact};

use crate::languages::{CommandTemplate, LanguageProfile};
use crate::process::{ProcessOutcome, ProcessOutput, ProcessSpec, run_bounded};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives compiler and syntax-checker processes
#[derive(Debug, Clone)]
pub struct Compiler {
    work_dir: PathBuf,
    max_output_bytes: usize,
}

impl Compiler {
    pub fn new(work_dir: impl Into<PathBuf>, max_output_bytes: usize) -> Self {
        Self {
            work_dir: work_dir.into(),
            max_output_bytes,
        }
    }

    /// Compile `source` according to `profile`.
    ///
    /// For `needs_compile` profiles the artifact is the deterministically
    /// named binary, which must exist and be executable afterwards. Otherwise
    /// the profile's checker runs and the source is returned as the artifact.
    pub async fn compile(
        &self,
        source: &Path,
        profile: &LanguageProfile,
    ) -> Result<CompiledArtifact, CompileFailure> {
        info!("Compiling {} as {}", source.display(), profile.name);

        let artifact = if profile.needs_compile {
            let artifact = profile.artifact_path(source);
            // A stale binary would hide a compiler that exits 0 without output
            remove_stale(&artifact).await;
            artifact
        } else {
            source.to_path_buf()
        };

        let command = profile.compile_command(source, &artifact);
        let output = self
            .run_tool(command, profile)
            .await
            .map_err(|e| CompileFailure::launch_failed(profile, e.to_string()))?;
        let duration = output.duration;

        check_outcome(&output, profile)?;

        if profile.needs_compile {
            if let Err(e) = make_executable(&artifact).await {
                warn!(
                    "Compiler for {} exited 0 but {} is unusable: {}",
                    profile.name,
                    artifact.display(),
                    e
                );
                return Err(CompileFailure::artifact_missing(profile, duration));
            }
        }

        info!(
            "Compiled {} in {:?} -> {}",
            source.display(),
            duration,
            artifact.display()
        );

        Ok(CompiledArtifact {
            path: artifact,
            produced_binary: profile.needs_compile,
            duration,
        })
    }

    /// Check syntax only, without producing an artifact.
    ///
    /// Uses `go vet` for Go, `-fsyntax-only` for C/C++ and the checker
    /// command for interpreted languages. Returns the check duration.
    pub async fn check_syntax(
        &self,
        source: &Path,
        profile: &LanguageProfile,
    ) -> Result<Duration, CompileFailure> {
        debug!("Checking syntax of {}", source.display());

        let command = CommandTemplate {
            program: profile.syntax_check.program.clone(),
            args: profile.syntax_check.args_with(source),
        };
        let output = self
            .run_tool(command, profile)
            .await
            .map_err(|e| CompileFailure::launch_failed(profile, e.to_string()))?;

        check_outcome(&output, profile)?;
        Ok(output.duration)
    }

    async fn run_tool(
        &self,
        command: CommandTemplate,
        profile: &LanguageProfile,
    ) -> std::io::Result<ProcessOutput> {
        let mut spec = ProcessSpec::new(command, &self.work_dir)
            .timeout(profile.compile_timeout)
            .max_output_bytes(self.max_output_bytes);
        for (key, value) in &profile.env {
            spec = spec.env(key, value);
        }
        run_bounded(&spec).await
    }
}

/// Map a finished tool process to success or a [`CompileFailure`]
fn check_outcome(output: &ProcessOutput, profile: &LanguageProfile) -> Result<(), CompileFailure> {
    let diagnostics = if output.stderr.trim().is_empty() {
        output.stdout.clone()
    } else {
        output.stderr.clone()
    };

    let reason = match output.outcome {
        ProcessOutcome::Exited { code: Some(0), .. } => return Ok(()),
        ProcessOutcome::Exited {
            code: Some(code), ..
        } => CompileFailureReason::ExitCode { code },
        ProcessOutcome::Exited { signal, .. } => CompileFailureReason::Signal {
            signal: signal.unwrap_or_default(),
        },
        ProcessOutcome::TimedOut => CompileFailureReason::Timeout {
            limit: profile.compile_timeout,
        },
        ProcessOutcome::OutputExceeded => CompileFailureReason::OutputExceeded,
    };

    let known_message = match reason {
        CompileFailureReason::ExitCode { code } => {
            profile.known_exit_message(code).map(str::to_string)
        }
        _ => None,
    };

    Err(CompileFailure {
        reason,
        language: profile.name.clone(),
        known_message,
        diagnostics,
        duration: output.duration,
    })
}

async fn remove_stale(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed stale artifact {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove stale artifact {}: {}", path.display(), e),
    }
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "artifact is not a regular file",
        ));
    }
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn make_executable(path: &Path) -> std::io::Result<()> {
    tokio::fs::metadata(path).await.map(|_| ())
}
