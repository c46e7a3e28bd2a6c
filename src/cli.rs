//! Command-line argument definitions for `gelfpipe`.
//!
//! Uses [`clap`] derive macros for argument parsing. Flags override the
//! environment and the config file; see [`crate::config`].

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::severity::SourceStream;
use crate::source::InputFormat;
use crate::wire::{self, CompressType};

/// Ship log lines from stdin to GELF collectors.
///
/// Lines following the `[timestamp] facility.LEVEL: message {context} {extra}`
/// convention are split into GELF fields; any other line is sent verbatim as
/// the short message.
#[derive(Debug, Parser)]
#[command(name = "gelfpipe", version, about, long_about = None)]
pub struct Cli {
    /// Destinations, e.g. `gelf://graylog:12201` or `gelf+stdout://`.
    #[arg(value_name = "ROUTE")]
    pub routes: Vec<String>,

    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host name written into every message (default: this machine's).
    #[arg(long)]
    pub host: Option<String>,

    /// Payload compression.
    #[arg(short = 'z', long, value_enum)]
    pub compress_type: Option<CompressType>,

    /// Compression level, -1 (library default) to 9.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_compress_level)]
    pub compress_level: Option<i32>,

    /// Include the event time as the GELF `timestamp` field.
    #[arg(short = 't', long)]
    pub send_timestamp: bool,

    /// JSON object of extra fields added to every message.
    #[arg(short = 'x', long, value_name = "JSON")]
    pub extra_json: Option<String>,

    /// How stdin lines are interpreted.
    #[arg(short = 'i', long, value_enum)]
    pub input: Option<InputFormat>,

    /// Stream reported for `raw` input lines.
    #[arg(short = 's', long, value_enum)]
    pub stream: Option<SourceStream>,

    /// Log debug diagnostics to stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// Parse a compression level in `-1..=9`.
fn parse_compress_level(s: &str) -> Result<i32, String> {
    match s.parse::<i32>() {
        Ok(level) if wire::valid_level(level) => Ok(level),
        _ => Err(format!("invalid compression level '{s}': expected -1 to 9")),
    }
}
