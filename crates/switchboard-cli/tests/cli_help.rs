use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("switchboard")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("session"))
        .stdout(predicate::str::contains("route"));
}

#[test]
fn test_login_requires_username() {
    cargo_bin_cmd!("switchboard")
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--username"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("switchboard")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
