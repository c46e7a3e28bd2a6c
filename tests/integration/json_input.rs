//! Integration tests for `--input json` records carrying source metadata.

use predicates::prelude::*;

use crate::{STDOUT_ROUTE, gelfpipe, messages};

const RECORD: &str = r#"{"data":"[2021-05-01T10:00:00+00:00] web.WARNING: slow request {\"ms\":950} []","source":"stderr","time":"2021-05-01T10:00:00Z","container":{"id":"c0ffee","name":"/web-1","image_id":"sha256:feed","image_name":"nginx:1.27","command":["nginx","-g","daemon off;"],"created":"2021-04-30T08:00:00Z","node":"swarm-a","labels":{"gelf_team":"core","GELF_tier":"edge","app":"ignored"}}}"#;

#[test]
fn identity_fields_come_from_record() {
    let msgs = messages(
        gelfpipe().args([STDOUT_ROUTE, "--input", "json"]),
        &format!("{RECORD}\n"),
    );
    let msg = &msgs[0];
    assert_eq!(msg["short_message"], "slow request");
    assert_eq!(msg["level"], 4);
    assert_eq!(msg["facility"], "web");
    assert_eq!(msg["_ms"], 950);
    assert_eq!(msg["_container_id"], "c0ffee");
    assert_eq!(msg["_container_name"], "web-1");
    assert_eq!(msg["_image_id"], "sha256:feed");
    assert_eq!(msg["_image_name"], "nginx:1.27");
    assert_eq!(msg["_command"], "nginx -g daemon off;");
    assert_eq!(msg["_created"], "2021-04-30T08:00:00Z");
    assert_eq!(msg["_swarm_node"], "swarm-a");
}

#[test]
fn gelf_labels_become_fields() {
    let msgs = messages(
        gelfpipe().args([STDOUT_ROUTE, "--input", "json"]),
        &format!("{RECORD}\n"),
    );
    let msg = &msgs[0];
    assert_eq!(msg["_team"], "core");
    assert_eq!(msg["_tier"], "edge");
    assert!(msg.get("_app").is_none());
    assert!(msg.get("app").is_none());
}

#[test]
fn unstructured_data_uses_record_stream() {
    let record = r#"{"data":"Segmentation fault","source":"stderr","time":"2021-05-01T10:00:00Z"}"#;
    let msgs = messages(
        gelfpipe().args([STDOUT_ROUTE, "--input", "json"]),
        &format!("{record}\n"),
    );
    assert_eq!(msgs[0]["short_message"], "Segmentation fault");
    assert_eq!(msgs[0]["level"], 3);
}

#[test]
fn undecodable_record_is_skipped() {
    let input = format!("not a record\n{RECORD}\n");
    gelfpipe()
        .args([STDOUT_ROUTE, "--input", "json"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("slow request"))
        .stdout(predicate::str::contains("not a record").not())
        .stderr(predicate::str::contains("skipping undecodable record"));
}
