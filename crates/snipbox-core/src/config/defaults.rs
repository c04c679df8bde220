//! Default configuration values

use std::path::PathBuf;
use std::time::Duration;

/// Run budget for interpreted languages; compiled ones get twice this
pub const BASE_TIMEOUT_SECS: u64 = 30;

/// Stdout cap before the process group is killed (1 MiB)
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Largest source file accepted by screening (1 MiB)
pub const MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024;

/// Simultaneous executions admitted by the environment
pub const MAX_CONCURRENT_EXECUTIONS: usize = 8;

/// Prefix carried by every file the sandbox creates
pub const TEMP_PREFIX: &str = "tmp_";

/// Name of the working directory under the system temp dir
pub const WORK_DIR_NAME: &str = "snipbox";

pub fn base_timeout() -> Duration {
    Duration::from_secs(BASE_TIMEOUT_SECS)
}

pub fn work_dir() -> PathBuf {
    std::env::temp_dir().join(WORK_DIR_NAME)
}

/// `~/.config/snipbox/config.toml` when a config dir exists
pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("snipbox").join("config.toml"))
}
