//! Outgoing GELF messages and how one record becomes one message.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::fields;
use crate::grammar::ParsedLineParts;
use crate::record::RawLogRecord;
use crate::severity::Severity;
use crate::timestamp;

/// Host name written into every message.
///
/// Resolved once at startup and shared read-only by all adapters; cloning
/// only bumps a reference count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity(Arc<str>);

impl HostIdentity {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Resolve the local host name.
    ///
    /// Tries the OS host name, then `$HOSTNAME`, then `localhost`.
    pub fn resolve() -> Self {
        Self::from_candidates(os_hostname(), std::env::var("HOSTNAME").ok())
    }

    /// First non-empty of `os` and `env`, else `localhost`.
    fn from_candidates(os: Option<String>, env: Option<String>) -> Self {
        let name = os
            .filter(|name| !name.is_empty())
            .or_else(|| env.filter(|name| !name.is_empty()))
            .unwrap_or_else(|| "localhost".to_string());
        Self::new(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(unix)]
fn os_hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY: the buffer is valid for writes of `buf.len()` bytes.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8(buf[..end].to_vec()).ok()
}

#[cfg(not(unix))]
fn os_hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}

/// A fully assembled GELF message.
///
/// The envelope fields serialize directly; `extra` holds the already
/// serialized extras object and is spliced in by the wire encoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub version: &'static str,
    pub host: String,
    pub short_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    pub level: u8,
    pub facility: String,
    #[serde(skip)]
    pub extra: String,
}

/// Assemble the message for `record`.
///
/// `parts` is `None` when the line did not match the grammar: the whole line
/// becomes the short message and the facility is empty. The timestamp is only
/// set when `send_timestamp` is on.
pub fn assemble(
    record: &RawLogRecord,
    parts: Option<&ParsedLineParts<'_>>,
    extra: String,
    host: &HostIdentity,
    send_timestamp: bool,
) -> OutgoingMessage {
    let message = parts.map_or("", |p| p.message);
    let short_message = if message.is_empty() {
        record.data.clone()
    } else {
        message.to_string()
    };
    let level = Severity::resolve(parts.map_or("", |p| p.level), record.source_stream);

    OutgoingMessage {
        version: fields::GELF_VERSION,
        host: host.as_str().to_string(),
        short_message,
        timestamp: send_timestamp.then(|| timestamp::to_gelf_seconds(record.emitted_at)),
        level: level.as_u8(),
        facility: parts.map_or("", |p| p.facility).to_string(),
        extra,
    }
}
