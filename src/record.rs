//! Inbound log records and the identity of the process that emitted them.
//!
//! Records are produced by the log source (stdin in the `gelfpipe` binary),
//! consumed once by an adapter, and then dropped.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::severity::SourceStream;

/// Identity of the container or process that emitted a line.
///
/// Labels are kept in a [`BTreeMap`] so that label overrides are applied in
/// a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceIdentity {
    pub id: String,
    /// Display name; Docker reports it with a leading `/`.
    pub name: String,
    /// Image reference (digest or id).
    pub image_id: String,
    /// Human readable image name.
    pub image_name: String,
    /// Command line tokens.
    pub command: Vec<String>,
    pub created: jiff::Timestamp,
    /// Cluster node name, only set when running under a cluster manager.
    pub node: Option<String>,
    pub labels: BTreeMap<String, String>,
}

impl Default for SourceIdentity {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            image_id: String::new(),
            image_name: String::new(),
            command: Vec::new(),
            created: jiff::Timestamp::UNIX_EPOCH,
            node: None,
            labels: BTreeMap::new(),
        }
    }
}

impl SourceIdentity {
    /// Display name with one leading path separator removed.
    pub fn display_name(&self) -> &str {
        self.name.strip_prefix('/').unwrap_or(&self.name)
    }

    /// Command line tokens joined with single spaces.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// One raw line and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawLogRecord {
    pub data: String,
    #[serde(rename = "source", default)]
    pub source_stream: SourceStream,
    #[serde(rename = "time")]
    pub emitted_at: jiff::Timestamp,
    #[serde(rename = "container", default)]
    pub source_identity: SourceIdentity,
}

impl RawLogRecord {
    /// Build a record for `data` read just now from `stream`.
    pub fn now(data: String, stream: SourceStream, identity: SourceIdentity) -> Self {
        Self {
            data,
            source_stream: stream,
            emitted_at: jiff::Timestamp::now(),
            source_identity: identity,
        }
    }

    /// Decode a JSON-serialized record.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
