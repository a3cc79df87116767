//! Binary-level tests for the non-interactive commands

use assert_cmd::Command;
use predicates::prelude::*;
mod common;

#[test]
fn test_tutors_json_lists_registry() {
    let mut cmd = Command::cargo_bin("nodu").unwrap();
    cmd.arg("--config").arg("does/not/exist.yaml").arg("tutors").arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"backend_key\": \"tutor-scientific\""))
        .stdout(predicate::str::contains("\"id\": \"umanistica\""));
}

#[test]
fn test_invalid_server_url_is_rejected() {
    let (_temp_dir, config_path) =
        common::temp_config_file("server:\n  base_url: \"ftp://example.com\"\n");

    let mut cmd = Command::cargo_bin("nodu").unwrap();
    cmd.arg("--config").arg(config_path).arg("tutors");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must use http or https"));
}

#[test]
fn test_unknown_default_tutor_is_rejected() {
    let (_temp_dir, config_path) =
        common::temp_config_file("chat:\n  default_tutor: astrologia\n");

    let mut cmd = Command::cargo_bin("nodu").unwrap();
    cmd.arg("--config").arg(config_path).arg("tutors");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown chat.default_tutor"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("nodu").unwrap();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("nodu"));
}
