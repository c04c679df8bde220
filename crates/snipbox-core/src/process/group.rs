//! Process-group termination

use tracing::{debug, warn};

/// Send SIGKILL to every process in the group led by `pgid`.
///
/// Returns `true` when the signal was delivered. A group that no longer
/// exists is not an error.
#[cfg(unix)]
pub fn kill_process_group(pgid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        warn!("Process group id {} out of range", pgid);
        return false;
    };
    // pgid 0 or 1 would target our own group or init
    if raw <= 1 {
        warn!("Refusing to signal process group {}", raw);
        return false;
    }

    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => {
            debug!("Sent SIGKILL to process group {}", raw);
            true
        }
        Err(Errno::ESRCH) => false,
        Err(e) => {
            warn!("Failed to SIGKILL process group {}: {}", raw, e);
            false
        }
    }
}

/// No process groups outside Unix; the caller falls back to killing the child
#[cfg(not(unix))]
pub fn kill_process_group(_pgid: u32) -> bool {
    false
}

/// Whether any live (non-zombie) process still belongs to the group
#[cfg(target_os = "linux")]
pub fn process_group_alive(pgid: u32) -> bool {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return false;
    };

    entries.flatten().any(|entry| {
        let is_pid = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.bytes().all(|b| b.is_ascii_digit()));
        is_pid
            && std::fs::read_to_string(entry.path().join("stat"))
                .ok()
                .and_then(|stat| parse_stat(&stat))
                .is_some_and(|(state, pgrp)| pgrp == pgid && state != 'Z' && state != 'X')
    })
}

/// State and process group from `/proc/<pid>/stat`
#[cfg(target_os = "linux")]
fn parse_stat(stat: &str) -> Option<(char, u32)> {
    // comm is parenthesised and may itself contain spaces
    let rest = stat.get(stat.rfind(')')? + 2..)?;
    let mut fields = rest.split_whitespace();
    let state = fields.next()?.chars().next()?;
    let _ppid = fields.next()?;
    let pgrp = fields.next()?.parse().ok()?;
    Some((state, pgrp))
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn process_group_alive(pgid: u32) -> bool {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    match i32::try_from(pgid) {
        Ok(raw) if raw > 1 => killpg(Pid::from_raw(raw), None::<Signal>).is_ok(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub fn process_group_alive(_pgid: u32) -> bool {
    false
}
