//! Runs the `snipbox` binary end to end

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn snipbox(work_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snipbox"))
        .arg("--work-dir")
        .arg(work_dir)
        .args(args)
        .env("SNIPBOX_CONFIG", work_dir.join("absent.toml"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_code_json_output() {
    let dir = TempDir::new().unwrap();
    let output = snipbox(dir.path(), &["--json", "code", "bash", "echo", "hi"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stdout"], "hi\n");
    assert_eq!(json["status"]["kind"], "completed");
}

#[test]
fn test_failing_program_sets_exit_status() {
    let dir = TempDir::new().unwrap();
    let output = snipbox(dir.path(), &["code", "sh", "exit 4"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("exit code 4"));
}

#[test]
fn test_unsupported_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.xyz");
    std::fs::write(&source, "hello").unwrap();

    let output = snipbox(dir.path(), &["run", source.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported language"));
}

#[test]
fn test_languages_json() {
    let dir = TempDir::new().unwrap();
    let output = snipbox(dir.path(), &["--json", "languages"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["bash", "c", "cpp", "go", "javascript", "python"]);
}

#[test]
fn test_cleanup_command() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tmp_leftover.py"), "print(1)").unwrap();

    let output = snipbox(dir.path(), &["--json", "cleanup"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["removed"], 1);
    assert!(!dir.path().join("tmp_leftover.py").exists());
}
