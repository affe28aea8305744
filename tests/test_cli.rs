//! End-to-end tests for the `execwatch` binary.

use assert_cmd::Command;
use predicates::prelude::*;

const APPROVAL: &str = "tests/fixtures/approval.txt";
const PENDING: &str = "tests/fixtures/pending.json";
const MESSAGES: &str = "tests/fixtures/messages.jsonl";

fn execwatch() -> Command {
    let mut cmd = Command::cargo_bin("execwatch").unwrap();
    cmd.env_remove("EXECWATCH_DEFAULT_TTL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_parse_json() {
    let output = execwatch()
        .args(["parse", APPROVAL, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["id"], "0e9a9d4d-c7e6-4893-972f-2c80d70162c5");
    assert_eq!(info["cwd"], "/home/user/.openclaw/workspace");
    assert_eq!(info["expires"], "120s");
}

#[test]
fn test_parse_card_from_stdin() {
    execwatch()
        .arg("parse")
        .write_stdin(std::fs::read_to_string(APPROVAL).unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("0e9a9d4d-c7e6-4893-972f-2c80d70162c5"))
        .stdout(predicate::str::contains("docker compose"));
}

#[test]
fn test_parse_rejects_chat_message() {
    execwatch()
        .args(["parse", "-"])
        .write_stdin("Hello, how are you?")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Not an exec approval notice"));
}

#[test]
fn test_parse_missing_file() {
    execwatch()
        .args(["parse", "tests/fixtures/nope.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read message file"));
}

#[test]
fn test_detect_full_id() {
    execwatch()
        .args([
            "detect",
            "--pending",
            PENDING,
            "Exec denied: 0e9a9d4d-c7e6-4893-972f-2c80d70162c5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"id":"0e9a9d4d-c7e6-4893-972f-2c80d70162c5","action":"deny"}"#,
        ));
}

#[test]
fn test_detect_short_id_from_stdin() {
    execwatch()
        .args(["detect", "-p", PENDING])
        .write_stdin("allow-always aaaabbbb")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id":"aaaabbbb-cccc-dddd-eeee-ffffffffffff""#))
        .stdout(predicate::str::contains(r#""action":"allow-always""#));
}

#[test]
fn test_detect_no_match() {
    execwatch()
        .args(["detect", "--pending", PENDING, "Check abcdef0123456789 status"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("2 pending"));
}

#[test]
fn test_watch_with_expiry() {
    let output = execwatch()
        .args(["watch", "--input", MESSAGES])
        .output()
        .unwrap();
    assert!(output.status.success());

    let events: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["pending", "pending", "resolved", "expired"]);

    assert_eq!(events[2]["id"], "0e9a9d4d-c7e6-4893-972f-2c80d70162c5");
    assert_eq!(events[2]["action"], "deny");
    assert_eq!(events[2]["message_id"], 42);
    assert_eq!(events[3]["id"], "aaaabbbb-cccc-dddd-eeee-ffffffffffff");
}

#[test]
fn test_watch_without_expiry() {
    execwatch()
        .args(["watch", "--input", MESSAGES, "--no-expire", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""action":"allow-once""#))
        .stdout(predicate::str::contains("expired").not())
        .stderr(predicate::str::contains("resolved"));
}

#[test]
fn test_watch_rejects_bad_ttl() {
    execwatch()
        .args(["watch", "--default-ttl", "forever"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid --default-ttl"));
}

#[test]
fn test_watch_ttl_from_env() {
    execwatch()
        .args(["watch"])
        .env("EXECWATCH_DEFAULT_TTL", "later")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid --default-ttl 'later'"));
}
