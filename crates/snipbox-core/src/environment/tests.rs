//! Tests for the environment facade

use super::*;
use crate::executor::OutcomeKind;
use tempfile::TempDir;

fn environment(dir: &TempDir) -> Environment {
    let config = SnipboxConfig::default()
        .with_work_dir(dir.path().join("work"))
        .with_base_timeout(Duration::from_secs(10))
        .with_max_output_bytes(4096);
    Environment::new(config).unwrap()
}

fn prefixed_files(env: &Environment) -> Vec<PathBuf> {
    std::fs::read_dir(env.work_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("tmp_"))
        })
        .collect()
}

#[test]
fn test_new_creates_absolute_work_dir() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    assert!(env.work_dir().is_absolute());
    assert!(env.work_dir().is_dir());
    assert_eq!(env.available_permits(), 8);
}

#[test]
fn test_new_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let config = SnipboxConfig::default()
        .with_work_dir(dir.path())
        .with_max_concurrent(0);
    assert!(matches!(
        Environment::new(config),
        Err(SnipError::Config { .. })
    ));
}

#[tokio::test]
async fn test_execute_code_removes_source() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);

    let report = env.execute_code("echo hi\n", "sh").await.unwrap();

    assert!(report.success());
    assert_eq!(report.result.stdout, "hi\n");
    assert_eq!(report.result.language, "bash");
    assert!(report.result.compile_duration.is_some());
    assert!(prefixed_files(&env).is_empty());
    assert_eq!(env.metrics().snapshot().successes, 1);
}

#[tokio::test]
async fn test_execute_copies_and_keeps_original() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    let source = dir.path().join("greet.sh");
    std::fs::write(&source, "echo \"from file\"\n").unwrap();

    let report = env.execute(&source).await.unwrap();

    assert!(report.success());
    assert_eq!(report.result.stdout, "from file\n");
    assert!(source.exists());
    assert_eq!(prefixed_files(&env).len(), 1);
    assert!(report.render().contains("from file"));
}

#[tokio::test]
async fn test_unknown_extension_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    let source = dir.path().join("data.xyz");
    std::fs::write(&source, "whatever").unwrap();

    let err = env.execute(&source).await.unwrap_err();

    assert!(matches!(err, SnipError::UnsupportedLanguage(_)));
    assert_eq!(env.metrics().executions(), 0);
    assert!(prefixed_files(&env).is_empty());
}

#[tokio::test]
async fn test_unknown_language_name_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    let err = env.execute_code("print 1", "cobol").await.unwrap_err();
    assert!(matches!(err, SnipError::UnsupportedLanguage(_)));
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    let err = env.execute(&dir.path().join("nope.sh")).await.unwrap_err();
    assert!(matches!(err, SnipError::FileNotFound(_)));
}

#[tokio::test]
async fn test_inline_code_over_size_limit() {
    let dir = TempDir::new().unwrap();
    let config = SnipboxConfig::default()
        .with_work_dir(dir.path())
        .with_max_file_size(16);
    let env = Environment::new(config).unwrap();

    let err = env
        .execute_code("echo 'this is longer than sixteen bytes'", "bash")
        .await
        .unwrap_err();
    assert!(matches!(err, SnipError::SecurityRejected { .. }));
}

#[tokio::test]
async fn test_syntax_error_short_circuits_run() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);

    let result = env
        .execute_code_result("echo start\nif then fi (\n", "bash")
        .await
        .unwrap();

    assert_eq!(result.kind(), OutcomeKind::CompileFailure);
    assert_eq!(result.execute_duration, Duration::ZERO);
    assert!(result.stdout.is_empty());
    assert!(!result.compile_failure().unwrap().diagnostics.is_empty());
    assert_eq!(env.metrics().snapshot().compile_failures, 1);
}

#[tokio::test]
async fn test_suspicious_code_still_runs() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);

    let report = env
        .execute_code("true || rm -rf /nonexistent-snipbox-path\necho ran\n", "bash")
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(report.result.stdout, "ran\n");
    assert_eq!(report.findings.len(), 1);
    assert_eq!(env.metrics().snapshot().suspicious_files, 1);
}

#[tokio::test]
async fn test_check_syntax_leaves_no_files() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    let good = dir.path().join("good.sh");
    let bad = dir.path().join("bad.sh");
    std::fs::write(&good, "echo ok\n").unwrap();
    std::fs::write(&bad, "if then\n").unwrap();

    assert!(env.check_syntax(&good).await.unwrap().ok());
    let report = env.check_syntax(&bad).await.unwrap();
    assert!(!report.ok());
    assert!(report.render().starts_with("Syntax check failed"));
    assert!(prefixed_files(&env).is_empty());
    assert_eq!(env.metrics().executions(), 0);
}

#[tokio::test]
async fn test_cleanup_removes_staged_copies() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    let source = dir.path().join("again.sh");
    std::fs::write(&source, "echo again\n").unwrap();

    env.execute(&source).await.unwrap();
    env.execute(&source).await.unwrap();
    assert_eq!(prefixed_files(&env).len(), 2);

    let summary = env.cleanup(None).await.unwrap();
    assert_eq!(summary.removed, 2);
    assert!(prefixed_files(&env).is_empty());
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let dir = TempDir::new().unwrap();
    let config = SnipboxConfig::default()
        .with_work_dir(dir.path())
        .with_max_concurrent(1);
    let env = Environment::new(config).unwrap();

    let slow = {
        let env = env.clone();
        tokio::spawn(async move { env.execute_code("sleep 0.5\necho slow\n", "bash").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(env.available_permits(), 0);

    let fast = env.execute_code("echo fast\n", "bash").await.unwrap();
    let slow = slow.await.unwrap().unwrap();

    assert_eq!(fast.result.stdout, "fast\n");
    assert_eq!(slow.result.stdout, "slow\n");
    assert_eq!(env.available_permits(), 1);
}
