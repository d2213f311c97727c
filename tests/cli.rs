//! CLI integration tests.

mod common;

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the installer binary command.
fn installer() -> Command {
    let mut cmd = Command::cargo_bin("kodegen_bundler_installer").unwrap();
    cmd.env("RUST_LOG", "info");
    cmd
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("installer.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_help_lists_options() {
    installer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--artifacts-only"));
}

#[test]
fn test_config_is_required() {
    installer().assert().failure();
}

#[test]
fn test_missing_config_file_exits_with_one() {
    let tmp = TempDir::new().unwrap();

    installer()
        .args(["--config", "absent.toml"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_artifacts_only_populates_snapshots() {
    let tmp = TempDir::new().unwrap();
    let root = common::snapshot_repo(
        &tmp.path().join("mirror"),
        "gpii-app",
        "92f9b5e1",
        &[("package.json", "{}")],
    );
    let config = write_config(
        tmp.path(),
        &format!("stages = []\n\n[[artifacts]]\nid = \"gpii-app\"\nrepo = \"{root}\"\nhash = \"92f9b5e1\"\n"),
    );

    installer()
        .arg("--config")
        .arg(&config)
        .arg("--artifacts-only")
        .assert()
        .success()
        .stderr(predicate::str::contains("Artifact gpii-app has been populated"));

    assert!(tmp.path().join("artifacts/gpii-app/package.json").is_file());
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_artifacts_dir_override() {
    let tmp = TempDir::new().unwrap();
    let root = common::snapshot_repo(&tmp.path().join("mirror"), "app", "abc", &[("a.txt", "a")]);
    let config = write_config(
        tmp.path(),
        &format!("stages = []\n\n[[artifacts]]\nid = \"app\"\nrepo = \"{root}\"\nhash = \"abc\"\n"),
    );
    let scratch = tmp.path().join("elsewhere");

    installer()
        .arg("--config")
        .arg(&config)
        .arg("--artifacts-dir")
        .arg(&scratch)
        .arg("--artifacts-only")
        .assert()
        .success();

    assert!(scratch.join("app/a.txt").is_file());
}

#[test]
fn test_failing_artifact_exits_with_one() {
    let tmp = TempDir::new().unwrap();
    let root = common::file_url(&tmp.path().join("nowhere"));
    let config = write_config(
        tmp.path(),
        &format!("stages = [\"copy_auxiliary_artifacts\"]\n\n[[artifacts]]\nid = \"ghost\"\nrepo = \"{root}\"\nhash = \"0000\"\n"),
    );

    installer()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Artifact `ghost` failed"));

    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_undeclared_layout_fails_before_downloading() {
    let tmp = TempDir::new().unwrap();
    let root = common::snapshot_repo(&tmp.path().join("mirror"), "app", "abc", &[("a.txt", "a")]);
    let config = write_config(
        tmp.path(),
        &format!("[[artifacts]]\nid = \"app\"\nrepo = \"{root}\"\nhash = \"abc\"\n"),
    );

    installer()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("layout.base_artifact `installer`"));

    assert!(!tmp.path().join("artifacts").exists());
}

#[test]
fn test_identical_directories_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), "");
    let shared = tmp.path().join("shared");

    installer()
        .arg("--config")
        .arg(&config)
        .arg("--artifacts-dir")
        .arg(&shared)
        .arg("--build-dir")
        .arg(&shared)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must differ"));
}
