//! Integration tests for config file loading and precedence.

use std::fs;

use predicates::prelude::*;

use crate::{STDOUT_ROUTE, gelfpipe, messages};

const LINE: &str = "[2021-05-01T10:00:00+00:00] app.INFO: hello {} []\n";

#[test]
fn config_file_supplies_routes_and_host() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
routes = ["gelf+stdout://"]
host = "from-file"
extra_json = '{"env":"staging"}'

[source]
id = "abc"
name = "/api"
"#,
    )
    .unwrap();

    let msgs = messages(gelfpipe().arg("--config").arg(&path), LINE);
    assert_eq!(msgs[0]["host"], "from-file");
    assert_eq!(msgs[0]["_env"], "staging");
    assert_eq!(msgs[0]["_container_id"], "abc");
    assert_eq!(msgs[0]["_container_name"], "api");
}

#[test]
fn config_file_from_env_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gelfpipe.toml");
    fs::write(&path, "routes = [\"gelf+stdout://\"]\nhost = \"env-path\"\n").unwrap();

    let msgs = messages(gelfpipe().env("GELFPIPE_CONFIG", &path), LINE);
    assert_eq!(msgs[0]["host"], "env-path");
}

#[test]
fn config_file_in_xdg_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("gelfpipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "host = \"xdg\"\nsend_timestamp = true\n").unwrap();

    let msgs = messages(
        gelfpipe()
            .arg(STDOUT_ROUTE)
            .env("XDG_CONFIG_HOME", dir.path()),
        LINE,
    );
    assert_eq!(msgs[0]["host"], "xdg");
    assert!(msgs[0]["timestamp"].is_number());
}

#[test]
fn env_and_cli_override_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "routes = [\"gelf+stdout://\"]\nhost = \"from-file\"\nextra_json = '{\"k\":\"file\"}'\n",
    )
    .unwrap();

    let msgs = messages(
        gelfpipe()
            .arg("--config")
            .arg(&path)
            .args(["--host", "from-cli"])
            .env("EXTRA_JSON", r#"{"k":"env"}"#),
        LINE,
    );
    assert_eq!(msgs[0]["host"], "from-cli");
    assert_eq!(msgs[0]["_k"], "env");
}

#[test]
fn invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "routes = [\"gelf+stdout://\"]\ncompress_type = \"lz4\"\n").unwrap();

    gelfpipe()
        .arg("--config")
        .arg(&path)
        .write_stdin(LINE)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("compress_type"));
}

#[test]
fn malformed_toml_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "routes = [unterminated\n").unwrap();

    gelfpipe()
        .arg("--config")
        .arg(&path)
        .write_stdin(LINE)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("gelfpipe:"));
}

#[test]
fn missing_config_path_is_skipped() {
    let msgs = messages(
        gelfpipe().args([STDOUT_ROUTE, "--config", "/nonexistent/gelfpipe.toml"]),
        LINE,
    );
    assert_eq!(msgs.len(), 1);
}
