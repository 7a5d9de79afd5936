use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("bifrost")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ui"))
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--backend-url"));
}

#[test]
fn test_profile_help_shows_username_arg() {
    cargo_bin_cmd!("bifrost")
        .args(["profile", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("USERNAME"));
}

#[test]
fn test_profile_requires_username() {
    cargo_bin_cmd!("bifrost")
        .arg("profile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("USERNAME"));
}

#[test]
fn test_ui_requires_terminal() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("bifrost")
        .env("BIFROST_HOME", dir.path())
        .arg("ui")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
