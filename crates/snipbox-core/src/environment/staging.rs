//! Per-request files in the shared working directory

use crate::error::{SnipError, SnipResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A file owned by one request.
///
/// Owned files are removed when the guard drops, whatever happened to the
/// request. Retained files are left for the periodic cleanup.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    remove_on_drop: bool,
}

impl ScratchFile {
    pub fn owned(path: PathBuf) -> Self {
        Self {
            path,
            remove_on_drop: true,
        }
    }

    pub fn retained(path: PathBuf) -> Self {
        Self {
            path,
            remove_on_drop: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.remove_on_drop {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// Copy a caller's file into `work_dir` under a collision-free name.
///
/// The source is never moved or modified.
pub async fn stage_copy(
    source: &Path,
    work_dir: &Path,
    prefix: &str,
    retain: bool,
) -> SnipResult<ScratchFile> {
    let base = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SnipError::io(format!("'{}' has no file name", source.display())))?;
    let dest = work_dir.join(format!("{}{}_{}", prefix, Uuid::new_v4().simple(), base));

    tokio::fs::copy(source, &dest).await.map_err(|e| {
        SnipError::io_with_context(
            format!("Failed to copy file: {}", e),
            format!("Staging '{}' into '{}'", source.display(), work_dir.display()),
        )
    })?;
    debug!("Staged {} as {}", source.display(), dest.display());

    Ok(if retain {
        ScratchFile::retained(dest)
    } else {
        ScratchFile::owned(dest)
    })
}

/// Write inline code to a uniquely named source file that is removed on drop
pub async fn write_inline(
    code: &str,
    extension: &str,
    work_dir: &Path,
    prefix: &str,
) -> SnipResult<ScratchFile> {
    let path = work_dir.join(format!("{}{}{}", prefix, Uuid::new_v4().simple(), extension));
    let guard = ScratchFile::owned(path);

    tokio::fs::write(guard.path(), code).await.map_err(|e| {
        SnipError::io_with_context(
            format!("Failed to write source: {}", e),
            format!("Creating '{}'", guard.path().display()),
        )
    })?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_inline_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = {
            let guard = write_inline("print(1)\n", ".py", dir.path(), "tmp_")
                .await
                .unwrap();
            let name = guard.path().file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("tmp_"));
            assert!(name.ends_with(".py"));
            assert_eq!(std::fs::read_to_string(guard.path()).unwrap(), "print(1)\n");
            guard.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_inline_names_are_unique() {
        let dir = TempDir::new().unwrap();
        let a = write_inline("x", ".sh", dir.path(), "tmp_").await.unwrap();
        let b = write_inline("x", ".sh", dir.path(), "tmp_").await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_stage_copy_keeps_source() {
        let dir = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let source = dir.path().join("main.go");
        std::fs::write(&source, "package main\n").unwrap();

        let staged_path = {
            let staged = stage_copy(&source, work.path(), "tmp_", true).await.unwrap();
            let name = staged.path().file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("tmp_"));
            assert!(name.ends_with("_main.go"));
            staged.path().to_path_buf()
        };

        assert!(source.exists());
        assert!(staged_path.exists());
    }

    #[tokio::test]
    async fn test_stage_copy_owned_is_removed() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("check.c");
        std::fs::write(&source, "int main(void){return 0;}\n").unwrap();

        let staged = stage_copy(&source, dir.path(), "tmp_", false).await.unwrap();
        let staged_path = staged.path().to_path_buf();
        drop(staged);

        assert!(!staged_path.exists());
        assert!(source.exists());
    }
}
