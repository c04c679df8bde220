//! Human-readable reports

use crate::compiler::CompileFailure;
use crate::executor::{ExecutionResult, ExecutionStatus};
use crate::screening::Finding;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

/// Result of one `execute`/`execute_code` request plus screening notes
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub result: ExecutionResult,
    /// Advisory screening findings; never block execution
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn new(result: ExecutionResult, findings: Vec<Finding>) -> Self {
        Self { result, findings }
    }

    pub fn success(&self) -> bool {
        self.result.success
    }

    /// Text shown to users and agents
    pub fn render(&self) -> String {
        let r = &self.result;
        let mut out = String::new();

        match &r.status {
            ExecutionStatus::Completed if r.success => {
                let _ = writeln!(out, "Execution completed in {:.2?}\n", r.execute_duration);
                out.push_str(&r.stdout);
                if !r.stderr.is_empty() {
                    let _ = write!(out, "\nErrors:\n{}", r.stderr);
                }
            }
            ExecutionStatus::Completed => {
                match (r.exit_code, r.signal) {
                    (Some(code), _) => {
                        let _ = writeln!(out, "Execution failed (exit code {}):", code);
                    }
                    (None, Some(signal)) => {
                        let _ = writeln!(out, "Execution failed (killed by signal {}):", signal);
                    }
                    (None, None) => out.push_str("Execution failed:\n"),
                }
                append_output(&mut out, r);
            }
            ExecutionStatus::TimedOut { limit } => {
                let _ = writeln!(out, "Execution timed out after {:.2?}", limit);
                append_output(&mut out, r);
            }
            ExecutionStatus::OutputExceeded { limit_bytes } => {
                let _ = writeln!(
                    out,
                    "Execution stopped: output exceeded {} bytes",
                    limit_bytes
                );
                append_output(&mut out, r);
            }
            ExecutionStatus::LaunchFailed { reason } => {
                let _ = writeln!(out, "Program could not be started: {}", reason);
            }
            ExecutionStatus::CompileFailed { failure } => {
                let _ = writeln!(out, "Compilation failed: {}", failure.message());
            }
        }

        if !self.findings.is_empty() {
            let _ = write!(
                out,
                "\n\nWarning: {} suspicious construct(s) found:",
                self.findings.len()
            );
            for finding in &self.findings {
                let _ = write!(
                    out,
                    "\n  line {}: {} ({})",
                    finding.line, finding.category, finding.matched
                );
            }
        }

        out
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn append_output(out: &mut String, r: &ExecutionResult) {
    if !r.stderr.is_empty() {
        out.push_str(&r.stderr);
        if !r.stderr.ends_with('\n') {
            out.push('\n');
        }
    }
    if !r.stdout.is_empty() {
        let _ = write!(out, "\nProgram output:\n{}", r.stdout);
    }
}

/// Result of a syntax-only check
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxReport {
    pub language: String,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub failure: Option<CompileFailure>,
}

impl SyntaxReport {
    pub fn ok(&self) -> bool {
        self.failure.is_none()
    }

    pub fn render(&self) -> String {
        match &self.failure {
            None => format!(
                "Syntax check passed ({}, {:.2?})",
                self.language, self.duration
            ),
            Some(failure) => format!("Syntax check failed: {}", failure.message()),
        }
    }
}
