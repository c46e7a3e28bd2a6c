//! Stream adapters: drive records through parsing, merging and assembly, and
//! hand the result to a transport.
//!
//! An adapter drains its input in order until the producer closes it. A
//! record that fails to serialize or send is logged and dropped; the stream
//! itself never stops early.
//!
//! Adapters are built by name through an [`AdapterRegistry`], so a host
//! process can wire `gelf` (and any other adapters it knows) to routes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::GelfError;
use crate::extras;
use crate::grammar;
use crate::message::{self, HostIdentity, OutgoingMessage};
use crate::record::RawLogRecord;
use crate::route::Route;
use crate::transport::{self, DEFAULT_TRANSPORT, Transport};
use crate::wire::Compression;

/// Name the GELF adapter registers under.
pub const GELF_ADAPTER: &str = "gelf";

/// Counters for one drained stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub received: u64,
    pub sent: u64,
    pub dropped: u64,
}

impl StreamStats {
    /// Add `other`'s counters to these.
    pub fn absorb(&mut self, other: Self) {
        self.received += other.received;
        self.sent += other.sent;
        self.dropped += other.dropped;
    }
}

/// Consumes a stream of records until it ends.
pub trait LogAdapter: Send {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Process every record from `records`, in order.
    fn stream(&mut self, records: &mut dyn Iterator<Item = RawLogRecord>) -> StreamStats;
}

/// Process-wide settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    pub host: HostIdentity,
    pub compression: Compression,
    pub send_timestamp: bool,
    /// Environment JSON merged into every record's extras.
    pub extra: Arc<Map<String, Value>>,
}

impl AdapterContext {
    pub fn new(host: HostIdentity) -> Self {
        Self {
            host,
            compression: Compression::default(),
            send_timestamp: false,
            extra: Arc::new(Map::new()),
        }
    }
}

/// Formats records as GELF messages.
pub struct GelfAdapter {
    name: String,
    transport: Box<dyn Transport>,
    host: HostIdentity,
    send_timestamp: bool,
    extra: Arc<Map<String, Value>>,
}

impl GelfAdapter {
    pub fn new(name: impl Into<String>, transport: Box<dyn Transport>, ctx: &AdapterContext) -> Self {
        Self {
            name: name.into(),
            transport,
            host: ctx.host.clone(),
            send_timestamp: ctx.send_timestamp,
            extra: Arc::clone(&ctx.extra),
        }
    }

    /// Build the outgoing message for one record.
    ///
    /// Fails only when the extras cannot be serialized.
    pub fn build_message(&self, record: &RawLogRecord) -> Result<OutgoingMessage, GelfError> {
        let parts = grammar::parse(&record.data);
        let (context, extra) = parts.as_ref().map_or(("", ""), |p| (p.context, p.extra));

        let identity = &record.source_identity;
        let merged = extras::merge(identity, context, extra, &self.extra, &identity.labels);
        let raw_extra = extras::encode(&merged)?;

        Ok(message::assemble(
            record,
            parts.as_ref(),
            raw_extra,
            &self.host,
            self.send_timestamp,
        ))
    }

    fn forward(&mut self, record: &RawLogRecord) -> Result<(), GelfError> {
        let message = self.build_message(record)?;
        self.transport.send(&message)
    }
}

impl LogAdapter for GelfAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn stream(&mut self, records: &mut dyn Iterator<Item = RawLogRecord>) -> StreamStats {
        let mut stats = StreamStats::default();
        for record in records {
            stats.received += 1;
            match self.forward(&record) {
                Ok(()) => stats.sent += 1,
                Err(e) => {
                    stats.dropped += 1;
                    tracing::warn!(adapter = %self.name, error = %e, "dropping record");
                }
            }
        }
        tracing::debug!(adapter = %self.name, ?stats, "stream drained");
        stats
    }
}

/// Builds an adapter for a route.
pub type AdapterFactory = fn(&Route, &AdapterContext) -> Result<Box<dyn LogAdapter>, GelfError>;

/// Adapter factories by name.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, factory: AdapterFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn lookup(&self, name: &str) -> Option<AdapterFactory> {
        self.factories.get(name).copied()
    }

    /// Build the adapter `route` asks for.
    pub fn build(&self, route: &Route, ctx: &AdapterContext) -> Result<Box<dyn LogAdapter>, GelfError> {
        let factory = self
            .lookup(&route.adapter)
            .ok_or_else(|| GelfError::Construction(format!("unknown adapter: {}", route.adapter)))?;
        factory(route, ctx)
    }
}

/// Register the GELF adapter.
pub fn register(registry: &mut AdapterRegistry) {
    registry.register(GELF_ADAPTER, new_gelf_adapter);
}

/// Factory for the GELF adapter.
///
/// Fails when the route's transport is unknown or cannot reach its address.
pub fn new_gelf_adapter(route: &Route, ctx: &AdapterContext) -> Result<Box<dyn LogAdapter>, GelfError> {
    let transport_name = route.adapter_transport(DEFAULT_TRANSPORT);
    let factory = transport::lookup(transport_name).ok_or_else(|| {
        GelfError::Construction(format!("unable to find adapter transport: {transport_name}"))
    })?;
    let transport = factory(route, ctx.compression)?;
    tracing::info!(route = %route, "gelf adapter ready");
    Ok(Box::new(GelfAdapter::new(route.to_string(), transport, ctx)))
}
