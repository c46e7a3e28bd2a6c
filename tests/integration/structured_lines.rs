//! Integration tests for splitting lines into GELF envelope fields.

use predicates::prelude::*;
use serde_json::json;

use crate::{STDOUT_ROUTE, gelfpipe, messages};

#[test]
fn empty_stdin_exits_zero() {
    gelfpipe().arg(STDOUT_ROUTE).write_stdin("").assert().success().stdout("");
}

#[test]
fn structured_line_fills_envelope() {
    let msgs = messages(
        gelfpipe().args([STDOUT_ROUTE, "--host", "node-1"]),
        "[2021-05-01T10:00:00.123456+00:00] web.INFO: boot complete {} []\n",
    );
    assert_eq!(msgs.len(), 1);
    let msg = &msgs[0];
    assert_eq!(msg["version"], "1.1");
    assert_eq!(msg["host"], "node-1");
    assert_eq!(msg["short_message"], "boot complete");
    assert_eq!(msg["level"], 6);
    assert_eq!(msg["facility"], "web");
    assert!(msg.get("timestamp").is_none());
}

#[test]
fn unstructured_line_passes_through() {
    let msgs = messages(
        gelfpipe().args([STDOUT_ROUTE, "--host", "node-1", "--stream", "stderr"]),
        "panic: runtime error: index out of range\n",
    );
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0]["short_message"], "panic: runtime error: index out of range");
    assert_eq!(msgs[0]["level"], 3);
    assert_eq!(msgs[0]["facility"], "");
}

#[test]
fn unknown_level_uses_stream_default() {
    let line = "[2021-05-01T10:00:00+00:00] app.TRACE: verbose {} []\n";
    let out = messages(gelfpipe().arg(STDOUT_ROUTE), line);
    assert_eq!(out[0]["level"], 6);
    assert_eq!(out[0]["short_message"], "verbose");

    let err = messages(gelfpipe().args([STDOUT_ROUTE, "--stream", "stderr"]), line);
    assert_eq!(err[0]["level"], 3);
}

#[test]
fn every_keyword_maps_to_its_level() {
    let keywords = [
        ("EMERGENCY", 0),
        ("ALERT", 1),
        ("CRITICAL", 2),
        ("ERROR", 3),
        ("WARNING", 4),
        ("NOTICE", 5),
        ("INFO", 6),
        ("DEBUG", 7),
    ];
    let input: String = keywords
        .iter()
        .map(|(kw, _)| format!("[2021-05-01T10:00:00+00:00] app.{kw}: m {{}} []\n"))
        .collect();
    let msgs = messages(gelfpipe().arg(STDOUT_ROUTE), &input);
    assert_eq!(msgs.len(), keywords.len());
    for (msg, (_, level)) in msgs.iter().zip(keywords) {
        assert_eq!(msg["level"], level);
    }
}

#[test]
fn lines_keep_input_order() {
    let input = "first\nsecond\nthird\n";
    let msgs = messages(gelfpipe().arg(STDOUT_ROUTE), input);
    let shorts: Vec<_> = msgs.iter().map(|m| m["short_message"].clone()).collect();
    assert_eq!(shorts, [json!("first"), json!("second"), json!("third")]);
}

#[test]
fn send_timestamp_flag_adds_seconds() {
    let record = r#"{"data":"tick","time":"2021-05-01T10:00:00.250Z"}"#;
    let msgs = messages(
        gelfpipe().args([STDOUT_ROUTE, "--input", "json", "--send-timestamp"]),
        &format!("{record}\n"),
    );
    assert_eq!(msgs[0]["timestamp"].as_f64(), Some(1_619_863_200.25));
}

#[test]
fn send_timestamp_env() {
    let record = r#"{"data":"tick","time":"2021-05-01T10:00:00Z"}"#;
    let msgs = messages(
        gelfpipe()
            .args([STDOUT_ROUTE, "--input", "json"])
            .env("SEND_TIMESTAMP", "1"),
        &format!("{record}\n"),
    );
    assert_eq!(msgs[0]["timestamp"].as_f64(), Some(1_619_863_200.0));

    let msgs = messages(
        gelfpipe()
            .args([STDOUT_ROUTE, "--input", "json"])
            .env("SEND_TIMESTAMP", "yes"),
        &format!("{record}\n"),
    );
    assert!(msgs[0].get("timestamp").is_none());
}

#[test]
fn invalid_utf8_line_is_skipped() {
    let mut input = b"before\n".to_vec();
    input.extend_from_slice(&[0xff, 0xfe, b'\n']);
    input.extend_from_slice(b"after\n");
    gelfpipe()
        .arg(STDOUT_ROUTE)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("before"))
        .stdout(predicate::str::contains("after"));
}

#[test]
fn spaced_payload_line_passes_through_whole() {
    let line = r#"[2021-05-01T10:00:00+00:00] web.INFO: user login {"user": {"id": 7}} []"#;
    let msgs = messages(gelfpipe().arg(STDOUT_ROUTE), &format!("{line}\n"));
    assert_eq!(msgs[0]["short_message"], line);
    assert_eq!(msgs[0]["facility"], "");
}
