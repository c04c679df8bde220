//! Snipbox Core Library
//!
//! Runs untrusted code snippets in several languages: look up the language
//! profile, compile or syntax-check, run under a wall-clock timeout and an
//! output cap, and report what happened. Timeouts and output overflow kill
//! the whole process group. There is no OS-level isolation.

pub mod cleanup;
pub mod compiler;
pub mod config;
pub mod environment;
pub mod error;
pub mod executor;
pub mod languages;
pub mod process;
pub mod screening;
pub mod telemetry;

// Re-export commonly used types
pub use cleanup::CleanupSummary;
pub use compiler::{CompileFailure, CompileFailureReason, CompiledArtifact, Compiler};
pub use config::{LoggingConfig, SnipboxConfig};
pub use environment::{Environment, Report, SyntaxReport};
pub use error::{CleanupFailure, SnipError, SnipResult};
pub use executor::{ExecutionResult, ExecutionStatus, Executor, OutcomeKind};
pub use languages::{LanguageProfile, LanguageRegistry};
pub use screening::{Finding, FindingCategory, ScreeningReport};
pub use telemetry::{ExecutionMetrics, MetricsSnapshot};
