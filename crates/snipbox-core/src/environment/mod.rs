//! Public facade: stage, screen, compile, run and report

mod report;
mod staging;

#[cfg(test)]
mod tests;

pub use report::{Report, SyntaxReport};
pub use staging::ScratchFile;

use crate::cleanup::{self, CleanupSummary};
use crate::compiler::Compiler;
use crate::config::SnipboxConfig;
use crate::error::{SnipError, SnipResult};
use crate::executor::{ExecutionResult, Executor};
use crate::languages::{LanguageProfile, LanguageRegistry};
use crate::screening::{self, ScreeningReport};
use crate::telemetry::ExecutionMetrics;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Code execution environment.
///
/// Cheap to clone; clones share the registry, the concurrency bound and
/// the metrics.
#[derive(Debug, Clone)]
pub struct Environment {
    config: Arc<SnipboxConfig>,
    registry: Arc<LanguageRegistry>,
    compiler: Compiler,
    executor: Executor,
    permits: Arc<Semaphore>,
    metrics: Arc<ExecutionMetrics>,
}

impl Environment {
    /// Validate `config`, create the working directory and build the
    /// language table.
    pub fn new(mut config: SnipboxConfig) -> SnipResult<Self> {
        config.validate()?;

        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            SnipError::io_with_context(
                format!("Failed to create working directory: {}", e),
                format!("Creating '{}'", config.work_dir.display()),
            )
        })?;
        // Child processes run inside work_dir, so every path handed to them
        // must be absolute.
        config.work_dir = std::fs::canonicalize(&config.work_dir)?;

        let registry = LanguageRegistry::with_defaults(config.base_timeout);
        info!(
            "Initialized sandbox environment in {} ({} languages, {} concurrent)",
            config.work_dir.display(),
            registry.len(),
            config.max_concurrent_executions
        );

        Ok(Self {
            compiler: Compiler::new(&config.work_dir, config.max_output_bytes),
            executor: Executor::new(&config.work_dir, config.max_output_bytes),
            permits: Arc::new(Semaphore::new(config.max_concurrent_executions)),
            metrics: Arc::new(ExecutionMetrics::new()),
            registry: Arc::new(registry),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SnipboxConfig {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &ExecutionMetrics {
        &self.metrics
    }

    /// Executions that could start right now without waiting
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Execute a file.
    ///
    /// The file is copied into the working directory; the original is never
    /// touched and the staged copy is kept for the periodic cleanup.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn execute(&self, path: &Path) -> SnipResult<Report> {
        let profile = self.registry.resolve_path(path)?;
        let screening = self.check_file_security(path).await?;

        let _permit = self.acquire().await?;
        let staged = staging::stage_copy(
            path,
            &self.config.work_dir,
            &self.config.temp_prefix,
            true,
        )
        .await
        .inspect_err(|e| error!("Failed to stage {}: {}", path.display(), e))?;

        let result = self.run_pipeline(staged.path(), &profile).await;
        Ok(Report::new(result, screening.findings))
    }

    /// Execute inline code in `language` (name, alias or extension).
    ///
    /// The temporary source is deleted when the request ends, whatever the
    /// outcome.
    #[instrument(skip(self, code), fields(bytes = code.len()))]
    pub async fn execute_code(&self, code: &str, language: &str) -> SnipResult<Report> {
        let profile = self.registry.resolve(language)?;

        if code.len() as u64 > self.config.max_file_size_bytes {
            return Err(SnipError::SecurityRejected {
                path: PathBuf::from(format!("<inline {}>", profile.name)),
                reason: format!(
                    "code is {} bytes, limit is {} bytes",
                    code.len(),
                    self.config.max_file_size_bytes
                ),
            });
        }

        let findings = screening::scan_content(code);
        if !findings.is_empty() {
            for finding in &findings {
                warn!(
                    "Suspicious inline {} code line {}: {} ({})",
                    profile.name, finding.line, finding.category, finding.matched
                );
            }
            self.metrics.record_suspicious();
        }

        let _permit = self.acquire().await?;
        let source = staging::write_inline(
            code,
            &profile.extension,
            &self.config.work_dir,
            &self.config.temp_prefix,
        )
        .await
        .inspect_err(|e| error!("Failed to write inline {} source: {}", profile.name, e))?;

        let result = self.run_pipeline(source.path(), &profile).await;
        Ok(Report::new(result, findings))
    }

    /// Same as [`Environment::execute`], returning only the structured result
    pub async fn execute_file_result(&self, path: &Path) -> SnipResult<ExecutionResult> {
        self.execute(path).await.map(|report| report.result)
    }

    /// Same as [`Environment::execute_code`], returning only the structured result
    pub async fn execute_code_result(
        &self,
        code: &str,
        language: &str,
    ) -> SnipResult<ExecutionResult> {
        self.execute_code(code, language)
            .await
            .map(|report| report.result)
    }

    /// Check syntax without running anything
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn check_syntax(&self, path: &Path) -> SnipResult<SyntaxReport> {
        let profile = self.registry.resolve_path(path)?;
        self.check_file_security(path).await?;

        let _permit = self.acquire().await?;
        let staged = staging::stage_copy(
            path,
            &self.config.work_dir,
            &self.config.temp_prefix,
            false,
        )
        .await?;

        Ok(match self.compiler.check_syntax(staged.path(), &profile).await {
            Ok(duration) => SyntaxReport {
                language: profile.name.clone(),
                duration,
                failure: None,
            },
            Err(failure) => SyntaxReport {
                language: profile.name.clone(),
                duration: failure.duration,
                failure: Some(failure),
            },
        })
    }

    /// Size, extension and content screening for a file.
    ///
    /// Oversized files and unknown extensions are rejected. Suspicious
    /// content is logged and counted but never blocks execution.
    pub async fn check_file_security(&self, path: &Path) -> SnipResult<ScreeningReport> {
        let report =
            screening::check_file(path, self.config.max_file_size_bytes, &self.registry).await?;
        if report.is_suspicious() {
            self.metrics.record_suspicious();
        }
        Ok(report)
    }

    /// Remove prefixed temporary files, optionally only those older than
    /// `older_than` (falls back to the configured `cleanup_max_age`)
    pub async fn cleanup(&self, older_than: Option<Duration>) -> SnipResult<CleanupSummary> {
        cleanup::sweep(
            &self.config.work_dir,
            &self.config.temp_prefix,
            older_than.or(self.config.cleanup_max_age),
        )
        .await
    }

    /// Start a background sweep every `period` until `cancel` fires.
    ///
    /// Files younger than `cleanup_max_age` (or one `period` when unset)
    /// are kept so in-flight requests never lose their sources.
    pub fn spawn_cleanup(&self, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        cleanup::spawn_periodic(
            self.config.work_dir.clone(),
            self.config.temp_prefix.clone(),
            period,
            Some(self.config.cleanup_max_age.unwrap_or(period)),
            cancel,
        )
    }

    async fn acquire(&self) -> SnipResult<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|_| SnipError::Internal("execution semaphore closed".to_string()))
    }

    /// Compile (or check) then run. Compile failures short-circuit the run
    /// phase. Produced binaries are removed when this returns.
    async fn run_pipeline(&self, source: &Path, profile: &LanguageProfile) -> ExecutionResult {
        let result = match self.compiler.compile(source, profile).await {
            Ok(artifact) => {
                let _binary = artifact
                    .produced_binary
                    .then(|| ScratchFile::owned(artifact.path.clone()));
                self.executor
                    .run(&artifact.path, profile)
                    .await
                    .with_compile_phase(artifact.duration, artifact.produced_binary)
            }
            Err(failure) => {
                warn!("Compile step failed for {}: {}", source.display(), failure);
                ExecutionResult::compile_failed(&profile.name, profile.needs_compile, failure)
            }
        };

        self.metrics.record(result.kind());
        result
    }
}
