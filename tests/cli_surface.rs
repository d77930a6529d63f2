use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_pipeline_commands() {
    Command::cargo_bin("vidbrief")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summarize"))
        .stdout(predicate::str::contains("platforms"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn summarize_without_url_is_a_usage_error() {
    Command::cargo_bin("vidbrief")
        .unwrap()
        .arg("summarize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[test]
fn platforms_prints_supported_sources() {
    Command::cargo_bin("vidbrief")
        .unwrap()
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("YouTube"))
        .stdout(predicate::str::contains("Direct video URLs"));
}
