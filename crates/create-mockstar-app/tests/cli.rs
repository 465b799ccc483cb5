//! Command-line behaviour that does not need a package manager.

use assert_cmd::Command;
use predicates::prelude::*;

fn cli(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("create-mockstar-app").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("MOCKSTAR_REGISTRY_URL", "http://127.0.0.1:9");
    cmd
}

#[test]
fn test_help_lists_flags() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--scripts-version"))
        .stdout(predicate::str::contains("--template"))
        .stdout(predicate::str::contains("--use-pnp"));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_info_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .arg("--info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment Info"))
        .stdout(predicate::str::contains("OS: "))
        .stdout(predicate::str::contains("CPU: "))
        .stdout(predicate::str::contains(std::env::consts::ARCH))
        .stdout(predicate::str::contains("Binaries:"));
}

#[test]
fn test_missing_project_directory() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please specify the project directory"));
}

#[test]
fn test_reserved_name_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .arg("mockstar-generators")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("the following names are not allowed"));

    assert!(!dir.path().join("mockstar-generators").exists());
}

#[test]
fn test_invalid_name_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .arg("MyApp")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("npm naming restrictions"));

    assert!(!dir.path().join("MyApp").exists());
}
