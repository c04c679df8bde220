//! Execution counters

use crate::error::SnipResult;
use crate::executor::OutcomeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counter (monotonically increasing)
#[derive(Debug, Default)]
struct Counter(AtomicU64);

impl Counter {
    fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Process-wide execution counters, shared by every request
#[derive(Debug)]
pub struct ExecutionMetrics {
    executions: Counter,
    successes: Counter,
    runtime_failures: Counter,
    compile_failures: Counter,
    timeouts: Counter,
    output_exceeded: Counter,
    launch_failures: Counter,
    suspicious_files: Counter,
    started_at: DateTime<Utc>,
    started: Instant,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub executions: u64,
    pub successes: u64,
    pub runtime_failures: u64,
    pub compile_failures: u64,
    pub timeouts: u64,
    pub output_exceeded: u64,
    pub launch_failures: u64,
    pub suspicious_files: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            executions: Counter::default(),
            successes: Counter::default(),
            runtime_failures: Counter::default(),
            compile_failures: Counter::default(),
            timeouts: Counter::default(),
            output_exceeded: Counter::default(),
            launch_failures: Counter::default(),
            suspicious_files: Counter::default(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Count one finished request under its outcome
    pub fn record(&self, kind: OutcomeKind) {
        self.executions.inc();
        match kind {
            OutcomeKind::Success => self.successes.inc(),
            OutcomeKind::RuntimeFailure => self.runtime_failures.inc(),
            OutcomeKind::CompileFailure => self.compile_failures.inc(),
            OutcomeKind::Timeout => self.timeouts.inc(),
            OutcomeKind::OutputExceeded => self.output_exceeded.inc(),
            OutcomeKind::LaunchFailed => self.launch_failures.inc(),
        }
    }

    pub fn record_suspicious(&self) {
        self.suspicious_files.inc();
    }

    pub fn executions(&self) -> u64 {
        self.executions.get()
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            executions: self.executions.get(),
            successes: self.successes.get(),
            runtime_failures: self.runtime_failures.get(),
            compile_failures: self.compile_failures.get(),
            timeouts: self.timeouts.get(),
            output_exceeded: self.output_exceeded.get(),
            launch_failures: self.launch_failures.get(),
            suspicious_files: self.suspicious_files.get(),
            started_at: self.started_at,
            uptime_secs: self.uptime().as_secs(),
        }
    }

    /// Pretty-printed JSON of the current snapshot
    pub fn to_json(&self) -> SnipResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_by_kind() {
        let metrics = ExecutionMetrics::new();
        metrics.record(OutcomeKind::Success);
        metrics.record(OutcomeKind::Success);
        metrics.record(OutcomeKind::Timeout);
        metrics.record(OutcomeKind::CompileFailure);
        metrics.record_suspicious();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.executions, 4);
        assert_eq!(snapshot.successes, 2);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.compile_failures, 1);
        assert_eq!(snapshot.runtime_failures, 0);
        assert_eq!(snapshot.suspicious_files, 1);
    }

    #[test]
    fn test_to_json() {
        let metrics = ExecutionMetrics::new();
        metrics.record(OutcomeKind::OutputExceeded);

        let json: serde_json::Value = serde_json::from_str(&metrics.to_json().unwrap()).unwrap();
        assert_eq!(json["executions"], 1);
        assert_eq!(json["output_exceeded"], 1);
        assert!(json["started_at"].is_string());
    }

    #[tokio::test]
    async fn test_concurrent_increments() {
        let metrics = Arc::new(ExecutionMetrics::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                tokio::spawn(async move { metrics.record(OutcomeKind::LaunchFailed) })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(metrics.executions(), 16);
        assert_eq!(metrics.snapshot().launch_failures, 16);
    }
}
