//! Advisory content screening
//!
//! Size and extension checks reject a file outright. Pattern matches never
//! block anything: they are logged and counted. This is not an isolation
//! boundary.

use crate::error::{SnipError, SnipResult};
use crate::languages::LanguageRegistry;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

/// Process spawning from inside a snippet
static PROCESS_SPAWN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(os\.system|os\.popen|os\.exec\w*|subprocess|child_process|execve?|execvp|popen|fork)\s*\(|\bimport\s+subprocess\b|require\(\s*['"]child_process['"]\s*\)|"os/exec"|\bsystem\s*\("#,
    )
    .unwrap()
});

/// Network libraries and tools
static NETWORK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bimport\s+(socket|urllib\w*|requests|http\.client|httpx|aiohttp)\b|\bfrom\s+(socket|urllib\w*|requests|http)\b|require\(\s*['"](net|http|https|dgram)['"]\s*\)|"net(/http)?"|#include\s*<(sys/socket\.h|netdb\.h|arpa/inet\.h)>|\b(curl|wget|nc|netcat|ncat)\s"#,
    )
    .unwrap()
});

/// Destructive shell commands
static DESTRUCTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\brm\s+-[a-zA-Z]*[rf][a-zA-Z]*\s+/|\b(mkfs(\.\w+)?|wipefs|shred)\b|\bdd\s+if=|:\(\)\s*\{\s*:\|:&\s*\};:|\bchmod\s+-R\s+777\s+/|shutil\.rmtree"#,
    )
    .unwrap()
});

/// What a suspicious line looks like it is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    ProcessSpawn,
    NetworkAccess,
    DestructiveCommand,
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::ProcessSpawn => "process spawning",
            Self::NetworkAccess => "network access",
            Self::DestructiveCommand => "destructive command",
        };
        f.write_str(text)
    }
}

/// A single suspicious match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: FindingCategory,
    /// 1-based line number
    pub line: usize,
    pub matched: String,
}

/// Result of screening one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningReport {
    pub size_bytes: u64,
    pub findings: Vec<Finding>,
}

impl ScreeningReport {
    pub fn is_suspicious(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Scan source text for suspicious constructs
pub fn scan_content(content: &str) -> Vec<Finding> {
    let patterns: [(FindingCategory, &Regex); 3] = [
        (FindingCategory::ProcessSpawn, &PROCESS_SPAWN_PATTERN),
        (FindingCategory::NetworkAccess, &NETWORK_PATTERN),
        (FindingCategory::DestructiveCommand, &DESTRUCTIVE_PATTERN),
    ];

    let mut findings = Vec::new();
    for (index, line) in content.lines().enumerate() {
        for (category, pattern) in &patterns {
            if let Some(m) = pattern.find(line) {
                findings.push(Finding {
                    category: *category,
                    line: index + 1,
                    matched: m.as_str().trim().to_string(),
                });
            }
        }
    }
    findings
}

/// Check a file before it enters the pipeline.
///
/// Missing files, files over `max_size` and unrecognized extensions are
/// errors. Suspicious content only produces warnings in the returned
/// report.
pub async fn check_file(
    path: &Path,
    max_size: u64,
    registry: &LanguageRegistry,
) -> SnipResult<ScreeningReport> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SnipError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(SnipError::io_with_context(
                e.to_string(),
                format!("Reading metadata of '{}'", path.display()),
            ));
        }
    };

    if !metadata.is_file() {
        return Err(SnipError::SecurityRejected {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }

    if metadata.len() > max_size {
        return Err(SnipError::SecurityRejected {
            path: path.to_path_buf(),
            reason: format!(
                "file is {} bytes, limit is {} bytes",
                metadata.len(),
                max_size
            ),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !registry.is_supported_extension(extension) {
        return Err(SnipError::SecurityRejected {
            path: path.to_path_buf(),
            reason: format!("unrecognized extension '{}'", extension),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        SnipError::io_with_context(e.to_string(), format!("Reading '{}'", path.display()))
    })?;
    let findings = scan_content(&String::from_utf8_lossy(&bytes));

    for finding in &findings {
        warn!(
            "Suspicious content in {} line {}: {} ({})",
            path.display(),
            finding.line,
            finding.category,
            finding.matched
        );
    }

    Ok(ScreeningReport {
        size_bytes: metadata.len(),
        findings,
    })
}
