//! Integration tests for the keychain CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! The master password is supplied through `KEYCHAIN_PASSWORD`.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "integration-pass";

/// Helper: get a Command pointing at the keychain binary.
fn keychain() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("keychain").expect("binary should exist")
}

/// Helper: an empty temp project.
fn project() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper: a command running inside `dir` with the master password set.
fn keychain_in(dir: &TempDir, password: &str) -> Command {
    let mut cmd = keychain();
    cmd.current_dir(dir.path())
        .env("KEYCHAIN_PASSWORD", password)
        .env_remove("KEYCHAIN_LOG");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    keychain()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted password keychain"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("remove"));
}

#[test]
fn version_flag_shows_version() {
    keychain()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("keychain"));
}

#[test]
fn no_args_shows_help() {
    keychain()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn get_on_missing_store_fails() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD)
        .args(["get", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn init_creates_store_and_pinned_checksum() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD).arg("init").assert().success();

    tmp.child(".keychain/keychain.json")
        .assert(predicate::path::exists());
    tmp.child(".keychain/trusted-checksum")
        .assert(predicate::path::exists());
}

#[test]
fn init_twice_fails() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD).arg("init").assert().success();
    keychain_in(&tmp, PASSWORD)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = project();
    keychain_in(&tmp, "short").arg("init").assert().failure();
}

#[test]
fn set_get_list_remove_flow() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD).arg("init").assert().success();

    keychain_in(&tmp, PASSWORD)
        .args(["set", "example.com", "s3cr3t"])
        .assert()
        .success();

    keychain_in(&tmp, PASSWORD)
        .args(["get", "example.com"])
        .assert()
        .success()
        .stdout("s3cr3t\n");

    keychain_in(&tmp, PASSWORD)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com"));

    keychain_in(&tmp, PASSWORD)
        .args(["remove", "example.com", "--force"])
        .assert()
        .success();

    keychain_in(&tmp, PASSWORD)
        .args(["get", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No password stored"));
}

#[test]
fn wrong_master_password_is_rejected() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD).arg("init").assert().success();

    keychain_in(&tmp, "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master password"));
}

#[test]
fn restored_old_store_is_detected_as_rollback() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD).arg("init").assert().success();
    keychain_in(&tmp, PASSWORD)
        .args(["set", "example.com", "old"])
        .assert()
        .success();

    let store = tmp.child(".keychain/keychain.json");
    let old = std::fs::read_to_string(store.path()).unwrap();

    keychain_in(&tmp, PASSWORD)
        .args(["set", "example.com", "new"])
        .assert()
        .success();

    // Put the stale snapshot back while the pinned checksum moves on.
    store.write_str(&old).unwrap();

    keychain_in(&tmp, PASSWORD)
        .args(["get", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rollback"));
}

#[test]
fn store_dir_flag_overrides_config() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD)
        .args(["--store-dir", "vault", "init"])
        .assert()
        .success();

    tmp.child("vault/keychain.json")
        .assert(predicate::path::exists());
}

#[test]
fn store_is_created_with_default_iterations() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD).arg("init").assert().success();

    let store = std::fs::read_to_string(tmp.child(".keychain/keychain.json").path()).unwrap();
    assert!(store.contains("\"iterations\":100000"));
}

#[test]
fn empty_domain_argument_is_rejected() {
    let tmp = project();
    keychain_in(&tmp, PASSWORD)
        .args(["get", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("domain cannot be empty"));
}

#[test]
fn completions_bash_prints_script() {
    keychain()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keychain"));
}

#[test]
fn completions_unknown_shell_fails() {
    keychain().args(["completions", "csh"]).assert().failure();
}
