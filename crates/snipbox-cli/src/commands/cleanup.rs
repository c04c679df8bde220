//! Cleanup command implementation

use crate::console::CliConsole;
use anyhow::Result;
use snipbox_core::{Environment, SnipError};
use std::time::Duration;

/// Remove temporary files; partial failures are listed and reported as an error
pub async fn cleanup(env: &Environment, older_than: Option<Duration>, json: bool) -> Result<()> {
    let console = CliConsole::new(true);

    match env.cleanup(older_than).await {
        Ok(summary) => {
            if json {
                let value = serde_json::json!({
                    "removed": summary.removed,
                    "kept": summary.kept,
                    "work_dir": env.work_dir(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                console.success(&format!(
                    "Removed {} temporary file(s) from {}",
                    summary.removed,
                    env.work_dir().display()
                ));
                if summary.kept > 0 {
                    console.info(&format!("Kept {} file(s) younger than the age limit", summary.kept));
                }
            }
            Ok(())
        }
        Err(SnipError::Cleanup { removed, failures }) => {
            console.warn(&format!("Removed {} file(s)", removed));
            for failure in &failures {
                console.error(&failure.to_string());
            }
            Err(SnipError::Cleanup { removed, failures }.into())
        }
        Err(e) => Err(e.into()),
    }
}
