//! Bounded child-process runner
//!
//! Both the compile and run phases go through [`run_bounded`]: the child is
//! launched as the leader of a fresh process group, its pipes are drained
//! into capped buffers, and the wait is raced against a wall-clock deadline
//! and an output-overflow signal. Losing the race kills the whole group, and
//! so does dropping the future before it completes.

mod capture;
mod group;


pub use group::{kill_process_group, process_group_alive};

use crate::languages::CommandTemplate;
use capture::{Captured, capture_limited};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How long to wait for the pipe readers after the group has been killed.
/// Output read before this runs out is kept.
pub const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Everything needed to launch one bounded process
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub command: CommandTemplate,
    pub working_dir: PathBuf,
    pub timeout: Duration,
    pub max_output_bytes: usize,
    pub env: Vec<(String, String)>,
}

impl ProcessSpec {
    pub fn new(command: CommandTemplate, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            working_dir: working_dir.into(),
            timeout: Duration::from_secs(30),
            max_output_bytes: 1024 * 1024,
            env: Vec::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// How a bounded process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Exited on its own; `code` is `None` when killed by a signal
    Exited {
        code: Option<i32>,
        signal: Option<i32>,
    },
    /// Deadline reached, group killed
    TimedOut,
    /// Stdout went over the cap, group killed
    OutputExceeded,
}

impl ProcessOutcome {
    fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self::Exited {
            code: status.code(),
            signal,
        }
    }
}

/// Captured result of a bounded process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub outcome: ProcessOutcome,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub pid: Option<u32>,
}

impl ProcessOutput {
    /// Exit code when the process exited by itself
    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            ProcessOutcome::Exited { code, .. } => code,
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code() == Some(0)
    }
}

enum Race {
    Exited(std::io::Result<ExitStatus>),
    Overflow,
    Deadline,
}

/// Launch `spec` and wait for it under the time and output bounds.
///
/// The only error is a failure to start or wait on the process; every other
/// ending is reported through [`ProcessOutcome`].
pub async fn run_bounded(spec: &ProcessSpec) -> std::io::Result<ProcessOutput> {
    let mut cmd = Command::new(&spec.command.program);
    cmd.args(&spec.command.args)
        .current_dir(&spec.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    #[cfg(unix)]
    cmd.process_group(0);

    debug!(
        program = %spec.command.program,
        args = ?spec.command.args,
        timeout = ?spec.timeout,
        "spawning bounded process"
    );

    let mut child = cmd.spawn()?;
    let start = Instant::now();
    let pid = child.id();
    let mut guard = GroupGuard { pgid: pid };

    let cap = spec.max_output_bytes;
    let overflow = CancellationToken::new();
    let stop = CancellationToken::new();
    let mut stdout_task = tokio::spawn(capture_limited(
        child.stdout.take(),
        cap,
        Some(overflow.clone()),
        stop.clone(),
    ));
    let mut stderr_task = tokio::spawn(capture_limited(
        child.stderr.take(),
        cap,
        None,
        stop.clone(),
    ));

    let race = tokio::select! {
        biased;
        status = child.wait() => Race::Exited(status),
        _ = overflow.cancelled() => Race::Overflow,
        _ = tokio::time::sleep(spec.timeout) => Race::Deadline,
    };

    let mut outcome = match race {
        Race::Exited(Ok(status)) => {
            // Leader is gone; make sure nothing it forked outlives the request
            if let Some(pgid) = pid {
                kill_process_group(pgid);
            }
            ProcessOutcome::from_status(status)
        }
        Race::Exited(Err(e)) => {
            terminate(&mut child, pid).await;
            guard.disarm();
            stdout_task.abort();
            stderr_task.abort();
            return Err(e);
        }
        Race::Overflow => {
            terminate(&mut child, pid).await;
            ProcessOutcome::OutputExceeded
        }
        Race::Deadline => {
            terminate(&mut child, pid).await;
            ProcessOutcome::TimedOut
        }
    };
    guard.disarm();
    let duration = start.elapsed();

    let drain_deadline = tokio::time::Instant::now() + DRAIN_GRACE;
    let stdout = drain(&mut stdout_task, &stop, drain_deadline).await;
    let stderr = drain(&mut stderr_task, &stop, drain_deadline).await;
    if stdout.stopped || stderr.stopped {
        warn!(
            pid = ?pid,
            "a process outside the group kept the output pipe open; output cut at {:?}",
            DRAIN_GRACE
        );
    }

    // Fast writers can exit before the overflow branch is polled
    if stdout.exceeded && matches!(outcome, ProcessOutcome::Exited { .. }) {
        outcome = ProcessOutcome::OutputExceeded;
    }

    debug!(?outcome, ?duration, pid = ?pid, "bounded process finished");

    Ok(ProcessOutput {
        outcome,
        stdout: stdout.into_text(cap),
        stderr: stderr.into_text(cap),
        duration,
        pid,
    })
}

async fn terminate(child: &mut Child, pid: Option<u32>) {
    let signalled = pid.map(kill_process_group).unwrap_or(false);
    if !signalled {
        let _ = child.start_kill();
    }
    let _ = child.wait().await;
}

/// Wait for a pipe reader until `deadline`, then stop it and keep what it
/// has read so far.
async fn drain(
    task: &mut JoinHandle<Captured>,
    stop: &CancellationToken,
    deadline: tokio::time::Instant,
) -> Captured {
    if let Ok(joined) = tokio::time::timeout_at(deadline, &mut *task).await {
        return joined.unwrap_or_default();
    }
    // A descendant left the group and still holds the write end
    stop.cancel();
    (&mut *task).await.unwrap_or_default()
}

/// Kills the process group if `run_bounded` is dropped before it has
/// signalled the group itself. `kill_on_drop` only reaches the leader.
struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}
