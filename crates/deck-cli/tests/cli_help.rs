use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("deck")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("modules"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--module"))
        .stdout(predicate::str::contains("--speed"));
}

#[test]
fn test_modules_lists_curriculum() {
    cargo_bin_cmd!("deck")
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("agent-loop"))
        .stdout(predicate::str::contains("prompt-patterns"))
        .stdout(predicate::str::contains("reading-traces"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("deck")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
