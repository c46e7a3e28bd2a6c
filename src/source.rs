//! Turning stdin lines into [`RawLogRecord`]s.
//!
//! In `raw` mode every line is the log data itself and the source identity
//! comes from configuration. In `json` mode every line is a serialized
//! record, as written by a log router that already knows the container.

use clap::ValueEnum;
use serde::Deserialize;

use crate::record::{RawLogRecord, SourceIdentity};
use crate::severity::SourceStream;

/// How stdin lines are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Each line is one log line.
    #[default]
    Raw,
    /// Each line is a JSON-encoded record with source metadata.
    Json,
}

/// Decodes lines in one input format.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    format: InputFormat,
    stream: SourceStream,
    identity: SourceIdentity,
}

impl LineDecoder {
    pub const fn new(format: InputFormat, stream: SourceStream, identity: SourceIdentity) -> Self {
        Self {
            format,
            stream,
            identity,
        }
    }

    /// Decode one line.
    ///
    /// Returns `None` for a `json` line that is not a valid record; the
    /// failure is logged and the caller moves on to the next line.
    pub fn decode(&self, line: String) -> Option<RawLogRecord> {
        match self.format {
            InputFormat::Raw => Some(RawLogRecord::now(line, self.stream, self.identity.clone())),
            InputFormat::Json => match RawLogRecord::from_json(&line) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable record");
                    None
                }
            },
        }
    }
}
