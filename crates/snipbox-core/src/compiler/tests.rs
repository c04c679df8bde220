//! Tests for the compile step

use super::*;
use crate::languages::{LanguageProfile, LanguageRegistry};
use std::collections::BTreeMap;
use tempfile::TempDir;

/// A "compiler" implemented as a shell script.
///
/// Arguments arrive as `$1=-o $2=<artifact> $3=<source>`.
fn scripted_profile(script: &str, timeout: Duration) -> LanguageProfile {
    LanguageProfile {
        name: "scripted".to_string(),
        extension: ".scr".to_string(),
        aliases: vec![],
        command: "sh".to_string(),
        compile_args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        output_flag: Some("-o".to_string()),
        run_command: None,
        needs_compile: true,
        artifact_suffix: Some(".out".to_string()),
        syntax_check: CommandTemplate::new("sh", &["-n"]),
        timeout,
        compile_timeout: timeout,
        known_exit_codes: BTreeMap::from([(1, "Scripted compilation error".to_string())]),
        env: BTreeMap::new(),
    }
}

fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_successful_compile_produces_executable_artifact() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "prog.scr", "#!/bin/sh\necho hi\n");
    let profile = scripted_profile(r#"cp "$3" "$2""#, Duration::from_secs(10));

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    let artifact = compiler.compile(&source, &profile).await.unwrap();

    assert_eq!(artifact.path, dir.path().join("prog.out"));
    assert!(artifact.produced_binary);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&artifact.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

#[tokio::test]
async fn test_known_exit_code_prefixes_diagnostics() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "bad.scr", "broken");
    let profile = scripted_profile(
        "echo 'bad.scr:1: expected ;' >&2; exit 1",
        Duration::from_secs(10),
    );

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    let failure = compiler.compile(&source, &profile).await.unwrap_err();

    assert_eq!(failure.reason, CompileFailureReason::ExitCode { code: 1 });
    assert_eq!(
        failure.known_message.as_deref(),
        Some("Scripted compilation error")
    );
    assert!(failure.diagnostics.contains("expected ;"));
    assert!(failure.message().starts_with("Scripted compilation error (exit code 1): "));
}

#[tokio::test]
async fn test_unknown_exit_code_keeps_raw_diagnostics() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "bad.scr", "broken");
    let profile = scripted_profile("echo raw-text >&2; exit 4", Duration::from_secs(10));

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    let failure = compiler.compile(&source, &profile).await.unwrap_err();

    assert_eq!(failure.reason, CompileFailureReason::ExitCode { code: 4 });
    assert!(failure.known_message.is_none());
    assert_eq!(failure.message(), "compilation failed (exit code 4): raw-text\n");
}

#[tokio::test]
async fn test_success_without_artifact_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "ghost.scr", "x");
    let profile = scripted_profile("exit 0", Duration::from_secs(10));

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    let failure = compiler.compile(&source, &profile).await.unwrap_err();
    assert_eq!(failure.reason, CompileFailureReason::ArtifactMissing);
}

#[tokio::test]
async fn test_stale_artifact_does_not_mask_missing_output() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "stale.scr", "x");
    std::fs::write(dir.path().join("stale.out"), "old binary").unwrap();
    let profile = scripted_profile("exit 0", Duration::from_secs(10));

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    let failure = compiler.compile(&source, &profile).await.unwrap_err();
    assert_eq!(failure.reason, CompileFailureReason::ArtifactMissing);
}

#[tokio::test]
async fn test_compile_timeout() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "slow.scr", "x");
    let profile = scripted_profile("sleep 10", Duration::from_millis(200));

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    let failure = compiler.compile(&source, &profile).await.unwrap_err();

    assert!(matches!(failure.reason, CompileFailureReason::Timeout { .. }));
    assert!(failure.duration < Duration::from_secs(5));
    assert_eq!(failure.reason.to_string(), "timeout");
}

#[tokio::test]
async fn test_missing_compiler_is_launch_failure() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "a.scr", "x");
    let mut profile = scripted_profile("exit 0", Duration::from_secs(10));
    profile.command = "/no/such/compiler".to_string();

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    let failure = compiler.compile(&source, &profile).await.unwrap_err();
    assert_eq!(failure.reason, CompileFailureReason::LaunchFailed);
    assert!(failure.diagnostics.contains("/no/such/compiler"));
}

#[tokio::test]
async fn test_bash_syntax_check() {
    let dir = TempDir::new().unwrap();
    let registry = LanguageRegistry::with_defaults(Duration::from_secs(10));
    let bash = registry.resolve("bash").unwrap();
    let compiler = Compiler::new(dir.path(), 1024 * 1024);

    let good = write_source(&dir, "good.sh", "echo ok\n");
    let artifact = compiler.compile(&good, &bash).await.unwrap();
    assert_eq!(artifact.path, good);
    assert!(!artifact.produced_binary);

    let bad = write_source(&dir, "bad.sh", "if then fi (\n");
    let failure = compiler.check_syntax(&bad, &bash).await.unwrap_err();
    assert!(matches!(failure.reason, CompileFailureReason::ExitCode { .. }));
    assert!(!failure.diagnostics.is_empty());
}

#[tokio::test]
async fn test_gcc_syntax_error_reports_raw_diagnostics() {
    if which::which("gcc").is_err() {
        eprintln!("gcc not installed, skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let registry = LanguageRegistry::with_defaults(Duration::from_secs(30));
    let c = registry.resolve(".c").unwrap();
    let compiler = Compiler::new(dir.path(), 1024 * 1024);

    let source = write_source(&dir, "broken.c", "int main( { return 0 }\n");
    let failure = compiler.compile(&source, &c).await.unwrap_err();

    assert_eq!(failure.reason, CompileFailureReason::ExitCode { code: 1 });
    assert!(failure.message().starts_with("C compilation error"));
    assert!(failure.diagnostics.contains("error"));
    assert!(!dir.path().join("broken.out").exists());
}

#[tokio::test]
async fn test_profile_environment_reaches_compiler() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "prog.scr", "#!/bin/sh\necho hi\n");
    let mut profile = scripted_profile(
        r#"test "$SNIP_MODE" = release || exit 1; cp "$3" "$2""#,
        Duration::from_secs(10),
    );

    let compiler = Compiler::new(dir.path(), 1024 * 1024);
    assert!(compiler.compile(&source, &profile).await.is_err());

    profile.env.insert("SNIP_MODE".to_string(), "release".to_string());
    let artifact = compiler.compile(&source, &profile).await.unwrap();
    assert!(artifact.produced_binary);
}
