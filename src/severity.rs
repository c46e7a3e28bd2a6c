//! Syslog-style severity levels and the level-token mapping.
//!
//! Level tokens come from the `facility.LEVEL:` part of a structured line and
//! are matched case-sensitively against the eight syslog keywords. Anything
//! else falls back to a default that depends on the stream the line came
//! from.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which output stream of the source produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStream {
    #[default]
    Stdout,
    Stderr,
}

impl SourceStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for SourceStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syslog severity, 0 (most severe) to 7 (least severe).
///
/// The discriminant is the numeric level written to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    /// Parse an exact, upper-case level keyword.
    ///
    /// Returns `None` for anything else, including other spellings of the
    /// same level (`info`, `WARN`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "NOTICE" => Some(Self::Notice),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            "ALERT" => Some(Self::Alert),
            "EMERGENCY" => Some(Self::Emergency),
            _ => None,
        }
    }

    /// Severity assumed for lines without a recognized level token.
    pub const fn default_for(stream: SourceStream) -> Self {
        match stream {
            SourceStream::Stdout => Self::Info,
            SourceStream::Stderr => Self::Error,
        }
    }

    /// Resolve a level token, falling back to the stream default.
    pub fn resolve(token: &str, stream: SourceStream) -> Self {
        Self::from_token(token).unwrap_or_else(|| Self::default_for(stream))
    }

    /// Numeric syslog level.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Alert => "ALERT",
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Notice => "NOTICE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
