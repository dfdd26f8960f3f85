//! Integration tests for payload-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use payload_core::test_utils::EntryBuilder;
use payload_core::test_utils::build_payload;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn payloadtool_cmd() -> Command {
    cargo_bin_cmd!("payloadtool")
}

/// Writes a small payload with one entry of each known kind.
fn sample_payload(dir: &TempDir) -> PathBuf {
    write_payload(
        dir,
        &[
            EntryBuilder::directory("etc"),
            EntryBuilder::file("etc/hosts", b"127.0.0.1 localhost\n"),
            EntryBuilder::symlink("etc/localhost", "hosts"),
        ],
    )
}

fn write_payload(dir: &TempDir, entries: &[EntryBuilder]) -> PathBuf {
    let path = dir.path().join("Payload");
    fs::write(&path, build_payload(entries, 16)).expect("failed to write payload");
    path
}

#[test]
fn test_version_flag() {
    payloadtool_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("payloadtool"));
}

#[test]
fn test_help_flag() {
    payloadtool_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pbzx"));
}

#[test]
fn test_extract_help() {
    payloadtool_cmd()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract payload contents"));
}

#[test]
fn test_extract_creates_files() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);
    let out = temp.path().join("out");

    payloadtool_cmd()
        .arg("extract")
        .arg(&payload)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"))
        .stdout(predicate::str::ends_with("\nFound 1 files, 1 dirs, 1 links\n"));

    assert_eq!(
        fs::read(out.join("etc/hosts")).unwrap(),
        b"127.0.0.1 localhost\n"
    );
    #[cfg(unix)]
    assert_eq!(
        fs::read_link(out.join("etc/localhost")).unwrap(),
        PathBuf::from("hosts")
    );
}

#[test]
fn test_extract_without_output_dir_writes_nothing() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);

    payloadtool_cmd()
        .current_dir(temp.path())
        .arg("extract")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing written"))
        .stdout(predicate::str::ends_with("\nFound 1 files, 1 dirs, 1 links\n"));

    assert!(!temp.path().join("etc").exists());
}

#[test]
fn test_extract_with_list_prints_entries() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);

    payloadtool_cmd()
        .arg("extract")
        .arg("--list")
        .arg(&payload)
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("file 100644 "))
        .stdout(predicate::str::contains("etc/localhost -> hosts"));
}

#[cfg(unix)]
#[test]
fn test_extract_existing_link_path_requires_force() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);
    let out = temp.path().join("out");
    fs::create_dir_all(out.join("etc")).unwrap();
    fs::write(out.join("etc/localhost"), b"old").unwrap();

    payloadtool_cmd()
        .arg("extract")
        .arg(&payload)
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    payloadtool_cmd()
        .arg("extract")
        .arg("--force")
        .arg(&payload)
        .arg(&out)
        .assert()
        .success();
    assert_eq!(
        fs::read_link(out.join("etc/localhost")).unwrap(),
        PathBuf::from("hosts")
    );
}

#[test]
fn test_extract_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);

    let output = payloadtool_cmd()
        .arg("extract")
        .arg("--json")
        .arg(&payload)
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["data"]["files_written"], 1);
    assert_eq!(json["data"]["bytes_written"], 20);
    assert_eq!(json["data"]["tally"]["directories"], 1);
}

#[test]
fn test_extract_nonexistent_payload() {
    let temp = TempDir::new().expect("failed to create temp dir");

    payloadtool_cmd()
        .arg("extract")
        .arg("nonexistent.pbzx")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_extract_rejects_traversal() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = write_payload(&temp, &[EntryBuilder::file("../escape.txt", b"x")]);

    payloadtool_cmd()
        .arg("extract")
        .arg(&payload)
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Security violation"));

    assert!(!temp.path().join("escape.txt").exists());
}

#[test]
fn test_truncated_payload_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);
    let bytes = fs::read(&payload).unwrap();
    fs::write(&payload, &bytes[..bytes.len() - 5]).unwrap();

    payloadtool_cmd()
        .arg("list")
        .arg(&payload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_not_a_payload_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let path = temp.path().join("Payload");
    fs::write(&path, b"PK\x03\x04 not a payload").unwrap();

    payloadtool_cmd()
        .arg("list")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid payload"));
}

#[test]
fn test_list_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);

    payloadtool_cmd()
        .arg("list")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "dir  040755 [00000000]     0    0            0 Thu Jan  1 00:00:00 1970  etc\n",
        ))
        .stdout(predicate::str::contains(
            "link 120755 [00000000]     0    0            5 Thu Jan  1 00:00:00 1970  etc/localhost -> hosts\n",
        ))
        .stdout(predicate::str::ends_with("Found 1 files, 1 dirs, 1 links\n"));
}

#[test]
fn test_list_reports_unexpected_marker() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = write_payload(&temp, &[EntryBuilder::file("a", b"1").marker(0x11)]);

    payloadtool_cmd()
        .arg("list")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "NOTE: field unk1 == 0x11 (expected 0x10)",
        ));

    payloadtool_cmd()
        .arg("list")
        .arg("--strict")
        .arg(&payload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved marker 0x11"));
}

#[test]
fn test_list_unknown_kind() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = write_payload(
        &temp,
        &[
            EntryBuilder::new(9, "mystery").payload(b"zz".to_vec()),
            EntryBuilder::file("after", b"ok"),
        ],
    );

    payloadtool_cmd()
        .arg("list")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("?09? "))
        .stdout(predicate::str::contains("Found 1 files, 0 dirs, 0 links, 1 other"));
}

#[test]
fn test_list_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);

    let output = payloadtool_cmd()
        .arg("list")
        .arg("--json")
        .arg(&payload)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["operation"], "list");
    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], "etc");
    assert_eq!(entries[2]["link_target"], "hosts");
    assert_eq!(json["data"]["tally"]["files"], 1);
}

#[test]
fn test_list_json_error_document() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let path = temp.path().join("Payload");
    fs::write(&path, b"PK\x03\x04 not a payload").unwrap();

    let output = payloadtool_cmd()
        .arg("list")
        .arg("--json")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid payload"))
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "error");
    assert_eq!(json["operation"], "list");
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid payload")
    );
    assert!(json.get("data").is_none());
}

#[test]
fn test_quiet_suppresses_listing() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let payload = sample_payload(&temp);

    payloadtool_cmd()
        .arg("list")
        .arg("--quiet")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_completion_bash() {
    payloadtool_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("payloadtool"));
}
