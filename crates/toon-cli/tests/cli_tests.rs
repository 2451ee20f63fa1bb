//! Integration tests for the `toon` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the encode, decode,
//! prompt and stats subcommands through the actual binary, including
//! stdin/stdout piping, file I/O, error handling, and roundtrip correctness.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn toon() -> Command {
    Command::cargo_bin("toon").unwrap()
}

/// A per-test scratch path under the system temp dir.
fn scratch(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("toon-cli-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_stdin_to_stdout() {
    toon()
        .arg("encode")
        .write_stdin(r#"{"name":"Alice","age":30}"#)
        .assert()
        .success()
        .stdout("name: Alice\nage: 30\n");
}

#[test]
fn encode_file_to_stdout() {
    toon()
        .args(["encode", "-i", &fixture("sample.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("scores[3]: 95,87,92"))
        .stdout(predicate::str::contains("address:\n  city: Lisbon"));
}

#[test]
fn encode_file_to_file() {
    let output = scratch("encode.toon");
    toon()
        .args(["encode", "-i", &fixture("chat.json"), "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout("");

    let content = std::fs::read_to_string(&output).expect("output file must exist");
    assert!(content.contains("messages[3]{role,content}:"));
    assert!(!content.ends_with('\n'));
    let _ = std::fs::remove_file(&output);
}

#[test]
fn encode_with_indent() {
    toon()
        .args(["encode", "--indent", "4"])
        .write_stdin(r#"{"a":{"b":1}}"#)
        .assert()
        .success()
        .stdout("a:\n    b: 1\n");
}

#[test]
fn encode_with_pipe_delimiter() {
    toon()
        .args(["encode", "--delimiter", "pipe"])
        .write_stdin(r#"{"tags":["a,b","c"]}"#)
        .assert()
        .success()
        .stdout("tags[2|]: a,b|c\n");
}

#[test]
fn encode_rejects_unknown_delimiter() {
    toon()
        .args(["encode", "--delimiter", "semicolon"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown delimiter"));
}

#[test]
fn encode_invalid_json_fails() {
    toon()
        .arg("encode")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to encode JSON to TOON"));
}

#[test]
fn encode_missing_file_fails() {
    toon()
        .args(["encode", "-i", "/nonexistent/input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_stdin_to_pretty_json() {
    let output = toon()
        .arg("decode")
        .write_stdin("name: Alice\nscores[2]: 1,2")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("\n  \"name\": \"Alice\""));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, serde_json::json!({"name": "Alice", "scores": [1, 2]}));
}

#[test]
fn decode_compact() {
    toon()
        .args(["decode", "--compact"])
        .write_stdin("b: 1\na[0]:")
        .assert()
        .success()
        .stdout("{\"b\":1,\"a\":[]}\n");
}

#[test]
fn decode_invalid_toon_reports_line() {
    toon()
        .arg("decode")
        .write_stdin("a: 1\na: 2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode TOON to JSON"))
        .stderr(predicate::str::contains("line 2"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Prompt subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn prompt_encode_from_file() {
    toon()
        .args(["prompt", "encode", "-i", &fixture("prompt.txt")])
        .assert()
        .success()
        .stdout(
            "system_prompt: \"You are a careful assistant.\\n- Respond concisely.\\n- Use examples when relevant.\"\n",
        );
}

#[test]
fn prompt_roundtrip_through_files() {
    let envelope = scratch("prompt.toon");
    toon()
        .args(["prompt", "encode", "-i", &fixture("prompt.txt"), "-o"])
        .arg(&envelope)
        .assert()
        .success();

    let original = std::fs::read_to_string(fixture("prompt.txt")).unwrap();
    toon()
        .args(["prompt", "decode", "-i"])
        .arg(&envelope)
        .assert()
        .success()
        .stdout(original);
    let _ = std::fs::remove_file(&envelope);
}

#[test]
fn prompt_decode_missing_field_fails() {
    toon()
        .args(["prompt", "decode"])
        .write_stdin("prompt: hi")
        .assert()
        .failure()
        .stderr(predicate::str::contains("system_prompt"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn stats_output_format() {
    toon()
        .args(["stats", "-i", &fixture("chat.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON size:"))
        .stdout(predicate::str::contains("TOON size:"))
        .stdout(predicate::str::is_match(r"Reduction:\s+\d+\.\d%").unwrap());
}

#[test]
fn stats_rejects_invalid_json() {
    toon()
        .arg("stats")
        .write_stdin("[1,")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse JSON input"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Roundtrip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn roundtrip_encode_decode_pipeline() {
    for name in ["sample.json", "chat.json"] {
        let original = std::fs::read_to_string(fixture(name)).unwrap();
        let encoded = toon()
            .args(["encode", "--delimiter", "tab"])
            .write_stdin(original.clone())
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let decoded = toon()
            .args(["decode", "--compact"])
            .write_stdin(encoded)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let before: serde_json::Value = serde_json::from_str(&original).unwrap();
        let after: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(before, after, "roundtrip mismatch for {name}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edge cases
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_empty_object() {
    toon().arg("encode").write_stdin("{}").assert().success().stdout("\n");
}

#[test]
fn no_arguments_shows_help() {
    toon()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag_shows_subcommands() {
    toon()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("encode"))
        .stdout(predicate::str::contains("decode"))
        .stdout(predicate::str::contains("prompt"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn unknown_subcommand_fails() {
    toon().arg("frobnicate").assert().failure();
}

#[test]
fn verbose_logs_to_stderr_only() {
    toon()
        .args(["--verbose", "encode"])
        .env_remove("RUST_LOG")
        .write_stdin(r#"{"a":1}"#)
        .assert()
        .success()
        .stdout("a: 1\n")
        .stderr(predicate::str::contains("encoded"));
}
