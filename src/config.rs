//! Configuration management with TOML file and environment support.
//!
//! Merges settings from four sources (highest precedence first):
//! 1. CLI flags
//! 2. Environment (`COMPRESS_TYPE`, `COMPRESS_LEVEL`, `SEND_TIMESTAMP`, `EXTRA_JSON`)
//! 3. Config file (`$XDG_CONFIG_HOME/gelfpipe/config.toml` or `~/.config/gelfpipe/config.toml`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::adapter::AdapterContext;
use crate::cli::Cli;
use crate::error::GelfError;
use crate::message::HostIdentity;
use crate::record::SourceIdentity;
use crate::route::Route;
use crate::severity::SourceStream;
use crate::source::{InputFormat, LineDecoder};
use crate::wire::{self, CompressType, Compression};

pub const ENV_COMPRESS_TYPE: &str = "COMPRESS_TYPE";
pub const ENV_COMPRESS_LEVEL: &str = "COMPRESS_LEVEL";
pub const ENV_SEND_TIMESTAMP: &str = "SEND_TIMESTAMP";
pub const ENV_EXTRA_JSON: &str = "EXTRA_JSON";
pub const ENV_CONFIG: &str = "GELFPIPE_CONFIG";

/// Runtime configuration merged from defaults, config file, environment, and
/// CLI arguments.
///
/// Use [`Config::from_cli`] to build from parsed CLI arguments, or
/// [`Config::default`] for built-in defaults (useful in tests and benchmarks).
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Destinations; one adapter is started per route.
    pub routes: Vec<Route>,
    /// Host name override; resolved from the OS when unset.
    pub host: Option<String>,
    pub compression: Compression,
    /// Include event timestamps in messages.
    pub send_timestamp: bool,
    /// Extra fields merged into every message, keys without the `_` prefix.
    pub extra: Map<String, Value>,
    pub input: InputFormat,
    /// Stream reported for `raw` input.
    pub stream: SourceStream,
    /// Source identity reported for `raw` input.
    pub source: SourceIdentity,
}

impl Config {
    /// Build a [`Config`] from CLI arguments, loading the config file and
    /// environment.
    ///
    /// Merge precedence: CLI flags > environment > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, GelfError> {
        let mut config = Self::default();

        let config_path = cli
            .config
            .clone()
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config file");
            let file_config = FileConfig::load(&config_path)?;
            config.apply_file_config(file_config)?;
        }

        config.apply_env(|name| std::env::var(name).ok());
        config.apply_cli(cli)?;

        if config.routes.is_empty() {
            return Err(GelfError::Config(
                "no routes given (e.g. gelf://graylog:12201)".to_string(),
            ));
        }
        Ok(config)
    }

    /// Default config file path: `$XDG_CONFIG_HOME/gelfpipe/config.toml` or
    /// `~/.config/gelfpipe/config.toml`.
    fn default_config_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("gelfpipe").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("gelfpipe")
                .join("config.toml")
        } else {
            PathBuf::from(".config/gelfpipe/config.toml")
        }
    }

    /// Apply settings from a parsed config file.
    fn apply_file_config(&mut self, file: FileConfig) -> Result<(), GelfError> {
        if let Some(routes) = file.routes {
            self.routes = parse_routes(&routes)?;
        }

        if let Some(host) = file.host {
            self.host = Some(host);
        }

        if let Some(name) = file.compress_type {
            self.compression.kind = CompressType::from_name(&name).ok_or_else(|| {
                GelfError::Config(format!("unknown compress_type '{name}' in config file"))
            })?;
        }

        if let Some(level) = file.compress_level {
            if !wire::valid_level(level) {
                return Err(GelfError::Config(format!(
                    "compress_level {level} in config file is outside -1..=9"
                )));
            }
            self.compression.level = level;
        }

        if let Some(send) = file.send_timestamp {
            self.send_timestamp = send;
        }

        if let Some(json) = file.extra_json {
            self.extra = parse_extra_json(&json);
        }

        if let Some(input) = file.input {
            self.input = input;
        }

        if let Some(stream) = file.stream {
            self.stream = stream;
        }

        if let Some(source) = file.source {
            self.source = source;
        }

        Ok(())
    }

    /// Apply environment overrides read through `var`.
    ///
    /// Unset variables leave the current value alone. Set but invalid values
    /// fall back to the built-in default instead of failing.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var(ENV_COMPRESS_TYPE) {
            self.compression.kind = compress_type_from_env(&value);
        }
        if let Some(value) = var(ENV_COMPRESS_LEVEL) {
            self.compression.level = compress_level_from_env(&value);
        }
        if let Some(value) = var(ENV_SEND_TIMESTAMP) {
            self.send_timestamp = value == "1";
        }
        if let Some(value) = var(ENV_EXTRA_JSON) {
            self.extra = parse_extra_json(&value);
        }
    }

    fn apply_cli(&mut self, cli: &Cli) -> Result<(), GelfError> {
        if !cli.routes.is_empty() {
            self.routes = parse_routes(&cli.routes)?;
        }
        if cli.host.is_some() {
            self.host.clone_from(&cli.host);
        }
        if let Some(kind) = cli.compress_type {
            self.compression.kind = kind;
        }
        if let Some(level) = cli.compress_level {
            self.compression.level = level;
        }
        if cli.send_timestamp {
            self.send_timestamp = true;
        }
        if let Some(ref json) = cli.extra_json {
            self.extra = parse_extra_json(json);
        }
        if let Some(input) = cli.input {
            self.input = input;
        }
        if let Some(stream) = cli.stream {
            self.stream = stream;
        }
        Ok(())
    }

    /// Host identity for this process: the configured name, or the OS one.
    pub fn host_identity(&self) -> HostIdentity {
        match self.host {
            Some(ref host) if !host.is_empty() => HostIdentity::new(host.as_str()),
            _ => HostIdentity::resolve(),
        }
    }

    /// Settings handed to every adapter.
    pub fn adapter_context(&self, host: HostIdentity) -> AdapterContext {
        AdapterContext {
            host,
            compression: self.compression,
            send_timestamp: self.send_timestamp,
            extra: Arc::new(self.extra.clone()),
        }
    }

    /// Decoder for stdin lines.
    pub fn line_decoder(&self) -> LineDecoder {
        LineDecoder::new(self.input, self.stream, self.source.clone())
    }
}

fn parse_routes(uris: &[String]) -> Result<Vec<Route>, GelfError> {
    uris.iter().map(|uri| uri.parse()).collect()
}

/// Compression named by `COMPRESS_TYPE`; unknown names mean gzip.
pub fn compress_type_from_env(value: &str) -> CompressType {
    CompressType::from_name(value).unwrap_or_default()
}

/// Level from `COMPRESS_LEVEL`; unparseable or out-of-range values mean -1.
pub fn compress_level_from_env(value: &str) -> i32 {
    match value.trim().parse::<i32>() {
        Ok(level) if wire::valid_level(level) => level,
        _ => wire::DEFAULT_LEVEL,
    }
}

/// Parse the extra-fields JSON object.
///
/// Malformed JSON or a non-object value yields an empty map; a warning is
/// logged once here rather than on every record.
pub fn parse_extra_json(json: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("extra fields JSON is not an object, ignoring it");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "malformed extra fields JSON, ignoring it");
            Map::new()
        }
    }
}

/// Config file structure (TOML deserialization).
#[derive(Debug, Deserialize)]
struct FileConfig {
    routes: Option<Vec<String>>,
    host: Option<String>,
    compress_type: Option<String>,
    compress_level: Option<i32>,
    send_timestamp: Option<bool>,
    extra_json: Option<String>,
    input: Option<InputFormat>,
    stream: Option<SourceStream>,
    source: Option<SourceIdentity>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, GelfError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GelfError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
