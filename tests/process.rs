//! Shell command execution.

#![cfg(unix)]

use std::time::Duration;

use kodegen_bundler_installer::bundler::process::{command_line, shell_quote};
use kodegen_bundler_installer::bundler::{Error, ProcessRunner};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_run_collects_output_and_drops_blank_lines() {
    let tmp = TempDir::new().unwrap();

    let output = ProcessRunner::new()
        .run("printf", &["'first\\n\\n   \\nsecond\\n'"], tmp.path())
        .await
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert_eq!(output.stdout, vec!["first".to_string(), "second".to_string()]);
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn test_invalid_utf8_output_keeps_draining() {
    let tmp = TempDir::new().unwrap();

    let output = ProcessRunner::new()
        .run("printf", &["'\\377\\n'", ";", "seq", "1", "200000"], tmp.path())
        .await
        .unwrap();

    assert_eq!(output.stdout.len(), 200_001);
    assert_eq!(output.stdout[0], "\u{FFFD}");
    assert_eq!(output.stdout.last().map(String::as_str), Some("200000"));
}

#[tokio::test]
async fn test_run_captures_stderr() {
    let tmp = TempDir::new().unwrap();

    let output = ProcessRunner::new()
        .run("echo", &["oops", "1>&2"], tmp.path())
        .await
        .unwrap();

    assert_eq!(output.stderr, vec!["oops".to_string()]);
}

#[tokio::test]
async fn test_run_uses_working_directory() {
    let tmp = TempDir::new().unwrap();

    ProcessRunner::new()
        .run("touch", &["marker"], tmp.path())
        .await
        .unwrap();

    assert!(tmp.path().join("marker").is_file());
}

#[tokio::test]
async fn test_non_zero_exit_is_a_process_error() {
    let tmp = TempDir::new().unwrap();

    let err = ProcessRunner::new()
        .run("exit", &["7"], tmp.path())
        .await
        .unwrap_err();

    match err {
        Error::Process {
            command,
            working_dir,
            exit_code,
        } => {
            assert_eq!(command, "exit 7");
            assert_eq!(working_dir, tmp.path());
            assert_eq!(exit_code, Some(7));
        }
        other => panic!("expected a process error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_working_directory_fails_to_spawn() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("does-not-exist");

    let err = ProcessRunner::new()
        .run("true", &[] as &[&str], &missing)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CommandFailed { .. }));
}

#[tokio::test]
async fn test_cancelled_run_is_abandoned() {
    let tmp = TempDir::new().unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let err = ProcessRunner::with_cancellation(token)
        .run("sleep", &["5"], tmp.path())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_cancellation_kills_grandchildren() {
    let tmp = TempDir::new().unwrap();
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let err = ProcessRunner::with_cancellation(token)
        .run("sh", &["-c", "'sleep 2; touch late'", "&", "wait"], tmp.path())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!tmp.path().join("late").exists());
}

#[test]
fn test_command_line_joins_arguments() {
    assert_eq!(command_line("npm", &["prune", "--production"]), "npm prune --production");
    assert_eq!(command_line("npm", &[] as &[&str]), "npm");
}

#[test]
fn test_shell_quote() {
    assert_eq!(shell_quote("plain/path-1.0"), "plain/path-1.0");
    assert_eq!(shell_quote("two words"), "'two words'");
    assert_eq!(shell_quote("it's"), r"'it'\''s'");
    assert_eq!(shell_quote(""), "''");
}
