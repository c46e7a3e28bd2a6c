//! Error types for `gelfpipe`.
//!
//! Uses [`thiserror`] for ergonomic error derivation. A line that does not
//! match the grammar and malformed JSON payloads are not errors; they are
//! handled where they occur and never reach this type.

use thiserror::Error;

/// Errors that can occur in `gelfpipe`.
///
/// Per-record errors ([`Serialize`](Self::Serialize),
/// [`Transport`](Self::Transport)) are logged by the adapter and the record is
/// dropped. [`Config`](Self::Config), [`Route`](Self::Route) and
/// [`Construction`](Self::Construction) stop the process with exit 1.
#[derive(Debug, Error)]
pub enum GelfError {
    /// Configuration error (invalid flag value, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The extras map could not be serialized to wire JSON.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Sending a message to the collector failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// An adapter could not be built for a route.
    #[error("cannot construct adapter: {0}")]
    Construction(String),

    /// A route URI could not be parsed.
    #[error("invalid route: {0}")]
    Route(String),

    /// TOML deserialization error.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
}
