//! `gelfpipe`: normalize semi-structured log lines into GELF messages.
//!
//! This library provides the pipeline behind the `gelfpipe` CLI tool. Lines
//! that follow the `[timestamp] facility.LEVEL: message {context} {extra}`
//! convention are split into their parts, the severity keyword is mapped to
//! a syslog level, and source metadata, context, and extra fields are merged
//! into `_`-prefixed GELF additional fields. Lines in any other shape pass
//! through unchanged as the short message.
//!
//! # Example
//!
//! ```
//! use gelfpipe::adapter::{AdapterContext, GelfAdapter};
//! use gelfpipe::message::HostIdentity;
//! use gelfpipe::record::{RawLogRecord, SourceIdentity};
//! use gelfpipe::severity::SourceStream;
//! use gelfpipe::transport::StdoutTransport;
//!
//! let ctx = AdapterContext::new(HostIdentity::new("node-1"));
//! let adapter = GelfAdapter::new("doc", Box::new(StdoutTransport::new(Vec::new())), &ctx);
//!
//! let record = RawLogRecord::now(
//!     "[2021-05-01T10:00:00+00:00] app.WARNING: disk low {} []".to_string(),
//!     SourceStream::Stdout,
//!     SourceIdentity::default(),
//! );
//! let msg = adapter.build_message(&record).unwrap();
//! assert_eq!(msg.facility, "app");
//! assert_eq!(msg.level, 4);
//! assert_eq!(msg.short_message, "disk low");
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod error;
pub mod extras;
pub mod fields;
pub mod grammar;
pub mod message;
pub mod pipeline;
pub mod record;
pub mod route;
pub mod severity;
pub mod source;
pub mod timestamp;
pub mod transport;
pub mod wire;

// Re-export primary API types for convenience.
pub use adapter::{AdapterContext, AdapterRegistry, GelfAdapter, LogAdapter, StreamStats};
pub use config::Config;
pub use error::GelfError;
pub use grammar::{ParsedLineParts, parse};
pub use message::{HostIdentity, OutgoingMessage};
pub use pipeline::{FanOut, FanOutSummary};
pub use record::{RawLogRecord, SourceIdentity};
pub use route::Route;
pub use severity::{Severity, SourceStream};
