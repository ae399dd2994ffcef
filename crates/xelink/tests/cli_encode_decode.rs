#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const POSITION_FRAME: &str = "AB CD 01 0C 00 00 80 3F 00 00 00 40 00 00 40 40 7C";

fn xelink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xelink"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("xelink should run")
}

fn xelink_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_xelink"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("xelink should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept input");
    child.wait_with_output().expect("xelink should finish")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn unique_temp_file(tag: &str) -> PathBuf {
    PathBuf::from(format!(
        "/tmp/xelink-cli-{tag}-{}-{}.bin",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn encode_position_matches_reference_frame() {
    let output = xelink(&["--format", "pretty", "encode", "--position", "1,2,3"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), POSITION_FRAME);
}

#[test]
fn encode_hex_payload_with_type_tag() {
    let output = xelink(&[
        "--format",
        "pretty",
        "encode",
        "--type",
        "0x01",
        "--hex",
        "00 00 80 3F 00 00 00 40 00 00 40 40",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), POSITION_FRAME);
}

#[test]
fn encode_empty_and_string_payloads() {
    let empty = xelink(&["--format", "pretty", "encode", "--type", "16"]);
    assert!(empty.status.success());
    assert_eq!(stdout_of(&empty), "AB CD 10 00 EC");

    let ping = xelink(&[
        "--format", "pretty", "encode", "--type", "0x42", "--data", "ping",
    ]);
    assert!(ping.status.success());
    assert_eq!(stdout_of(&ping), "AB CD 42 04 70 69 6E 67 E7");
}

#[test]
fn encode_json_output() {
    let output = xelink(&["--format", "json", "encode", "--position", "1,2,3"]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_str(&stdout_of(&output)).expect("stdout should be JSON");
    assert_eq!(value["msg_type"], 1);
    assert_eq!(value["type_name"], "POSITION");
    assert_eq!(value["payload_size"], 12);
    assert_eq!(value["frame_size"], 17);
    assert_eq!(value["frame"], POSITION_FRAME);
}

#[test]
fn encode_oversized_payload_returns_60() {
    let hex = "00".repeat(256);
    let output = xelink(&["encode", "--type", "2", "--hex", &hex]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("payload too large"));
}

#[test]
fn encode_without_type_returns_64() {
    let output = xelink(&["encode", "--data", "orphan"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn decode_hex_finds_position_among_noise() {
    let input = format!("00 FF AB 12 {POSITION_FRAME} AB");
    let output = xelink(&["--format", "json", "decode", "--hex", &input]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);

    let value: serde_json::Value = serde_json::from_str(lines[0]).expect("line should be JSON");
    assert_eq!(value["type_name"], "POSITION");
    assert_eq!(value["position"]["x"], 1.0);
    assert_eq!(value["position"]["y"], 2.0);
    assert_eq!(value["position"]["z"], 3.0);
}

#[test]
fn decode_stdin_raw_bytes() {
    let mut input = vec![0xAB, 0xCD, 0x42, 0x04];
    input.extend_from_slice(b"ping");
    input.push(0xE7);
    input.extend_from_slice(&[0xAB, 0xCD, 0x7F, 0x03, b'a', b'b', b'c', 0xC8]);

    let output = xelink_with_stdin(&["--format", "pretty", "decode"], &input);
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "type=0x42 (UNKNOWN) size=4 70 69 6E 67\ntype=0x7f (UNKNOWN) size=3 61 62 63"
    );
}

#[test]
fn decode_file_input() {
    let path = unique_temp_file("decode");
    std::fs::write(&path, [0xAB, 0xCD, 0x10, 0x00, 0xEC]).expect("temp file should be writable");

    let output = xelink(&[
        "--format",
        "pretty",
        "decode",
        "--file",
        path.to_str().expect("temp path should be UTF-8"),
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "type=0x10 (UNKNOWN) size=0 <empty>");
}

#[test]
fn decode_corrupt_frame_strict_returns_60() {
    let corrupt = "AB CD 01 0C 00 00 80 3F 00 00 00 40 00 00 40 40 7D";

    let lenient = xelink(&["--format", "json", "decode", "--hex", corrupt]);
    assert!(lenient.status.success());
    assert!(stdout_of(&lenient).is_empty());

    let strict = xelink(&["--format", "json", "decode", "--strict", "--hex", corrupt]);
    assert_eq!(strict.status.code(), Some(60));
}

#[test]
fn send_to_missing_device_fails() {
    let output = xelink(&[
        "send",
        "/dev/xelink-does-not-exist",
        "--type",
        "1",
        "--data",
        "x",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("open failed"));
}

#[test]
fn version_prints_package_version() {
    let output = xelink(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        format!("xelink {}", env!("CARGO_PKG_VERSION"))
    );
}
