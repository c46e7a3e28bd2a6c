//! Integration tests for route handling and delivery.

use std::io::Read;
use std::net::UdpSocket;
use std::time::Duration;

use flate2::read::{GzDecoder, ZlibDecoder};
use predicates::prelude::*;
use serde_json::Value;

use crate::{STDOUT_ROUTE, gelfpipe, messages};

const LINE: &str = "[2021-05-01T10:00:00+00:00] app.NOTICE: over udp {\"n\":1} []\n";

fn collector() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    socket
}

fn receive(socket: &UdpSocket) -> Vec<u8> {
    let mut buf = [0u8; 8192];
    let n = socket.recv(&mut buf).unwrap();
    buf[..n].to_vec()
}

#[test]
fn no_routes_fails() {
    gelfpipe()
        .write_stdin(LINE)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no routes"));
}

#[test]
fn malformed_route_fails() {
    gelfpipe()
        .arg("graylog:12201")
        .write_stdin(LINE)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected <adapter>://<address>"));
}

#[test]
fn unknown_transport_fails() {
    gelfpipe()
        .arg("gelf+tcp://127.0.0.1:12201")
        .write_stdin(LINE)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unable to find adapter transport"));
}

#[test]
fn unknown_adapter_fails() {
    gelfpipe()
        .arg("syslog://127.0.0.1:514")
        .write_stdin(LINE)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown adapter"));
}

#[test]
fn invalid_compress_level_fails() {
    gelfpipe()
        .args([STDOUT_ROUTE, "--compress-level", "12"])
        .write_stdin(LINE)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid compression level"));
}

#[test]
fn udp_uncompressed() {
    let socket = collector();
    let route = format!("gelf://{}", socket.local_addr().unwrap());

    gelfpipe()
        .args([route.as_str(), "--compress-type", "none", "--host", "udp-host"])
        .write_stdin(LINE)
        .assert()
        .success();

    let msg: Value = serde_json::from_slice(&receive(&socket)).unwrap();
    assert_eq!(msg["short_message"], "over udp");
    assert_eq!(msg["level"], 5);
    assert_eq!(msg["host"], "udp-host");
    assert_eq!(msg["_n"], 1);
}

#[test]
fn udp_gzip_by_default() {
    let socket = collector();
    let route = format!("gelf+udp://{}", socket.local_addr().unwrap());

    gelfpipe().arg(&route).write_stdin(LINE).assert().success();

    let datagram = receive(&socket);
    assert_eq!(&datagram[..2], &[0x1f, 0x8b]);
    let mut doc = String::new();
    GzDecoder::new(datagram.as_slice()).read_to_string(&mut doc).unwrap();
    let msg: Value = serde_json::from_str(&doc).unwrap();
    assert_eq!(msg["short_message"], "over udp");
}

#[test]
fn udp_zlib_from_env() {
    let socket = collector();
    let route = format!("gelf://{}", socket.local_addr().unwrap());

    gelfpipe()
        .arg(&route)
        .env("COMPRESS_TYPE", "zlib")
        .env("COMPRESS_LEVEL", "9")
        .write_stdin(LINE)
        .assert()
        .success();

    let datagram = receive(&socket);
    let mut doc = String::new();
    ZlibDecoder::new(datagram.as_slice()).read_to_string(&mut doc).unwrap();
    let msg: Value = serde_json::from_str(&doc).unwrap();
    assert_eq!(msg["facility"], "app");
}

#[test]
fn large_message_is_chunked() {
    let socket = collector();
    let route = format!("gelf://{}", socket.local_addr().unwrap());
    let big = "x".repeat(4000);

    gelfpipe()
        .args([route.as_str(), "--compress-type", "none"])
        .write_stdin(format!("{big}\n"))
        .assert()
        .success();

    let first = receive(&socket);
    assert_eq!(&first[..2], &[0x1e, 0x0f]);
    let count = usize::from(first[11]);
    assert!(count >= 3);

    let mut chunks = vec![first];
    for _ in 1..count {
        chunks.push(receive(&socket));
    }
    chunks.sort_by_key(|c| c[10]);
    let id = &chunks[0][2..10];
    assert!(chunks.iter().all(|c| &c[2..10] == id));

    let doc: Vec<u8> = chunks.iter().flat_map(|c| c[12..].iter().copied()).collect();
    let msg: Value = serde_json::from_slice(&doc).unwrap();
    assert_eq!(msg["short_message"].as_str().map(str::len), Some(4000));
}

#[test]
fn every_route_gets_every_message() {
    let socket = collector();
    let route = format!("gelf://{}", socket.local_addr().unwrap());

    let msgs = messages(
        gelfpipe().args([route.as_str(), STDOUT_ROUTE, "--compress-type", "none"]),
        "one\ntwo\n",
    );
    assert_eq!(msgs.len(), 2);

    let first: Value = serde_json::from_slice(&receive(&socket)).unwrap();
    let second: Value = serde_json::from_slice(&receive(&socket)).unwrap();
    assert_eq!(first["short_message"], "one");
    assert_eq!(second["short_message"], "two");
}

#[test]
fn completions_do_not_need_routes() {
    gelfpipe()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gelfpipe"));
}
