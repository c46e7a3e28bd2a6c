//! Transports deliver assembled messages to a collector.
//!
//! Sends are fire-and-forget: a failed send is reported to the caller, which
//! drops the message. Nothing here retries or buffers.

use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::error::GelfError;
use crate::message::OutgoingMessage;
use crate::route::Route;
use crate::wire::{self, Compression, MessageIds};

/// Name of the transport used when a route does not name one.
pub const DEFAULT_TRANSPORT: &str = "udp";

/// Sends one message at a time.
pub trait Transport: Send {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), GelfError>;
}

/// Builds a transport for a route.
pub type TransportFactory = fn(&Route, Compression) -> Result<Box<dyn Transport>, GelfError>;

/// Find the transport factory registered under `name`.
pub fn lookup(name: &str) -> Option<TransportFactory> {
    match name {
        "udp" => Some(udp_factory),
        "stdout" => Some(stdout_factory),
        _ => None,
    }
}

fn udp_factory(route: &Route, compression: Compression) -> Result<Box<dyn Transport>, GelfError> {
    Ok(Box::new(UdpTransport::connect(&route.address, compression)?))
}

#[allow(clippy::unnecessary_wraps)] // signature shared with the other factories
fn stdout_factory(_route: &Route, _compression: Compression) -> Result<Box<dyn Transport>, GelfError> {
    Ok(Box::new(StdoutTransport::new(io::stdout())))
}

/// GELF over UDP, with compression and chunking.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
    compression: Compression,
    ids: MessageIds,
}

impl UdpTransport {
    /// Resolve `address` (`host:port`) and connect a UDP socket to it.
    pub fn connect(address: &str, compression: Compression) -> Result<Self, GelfError> {
        if address.is_empty() {
            return Err(GelfError::Construction("udp transport needs host:port".to_string()));
        }
        let peer = address
            .to_socket_addrs()
            .map_err(|e| GelfError::Construction(format!("cannot resolve {address}: {e}")))?
            .next()
            .ok_or_else(|| GelfError::Construction(format!("{address} resolved to no address")))?;

        let bind: SocketAddr = if peer.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind)
            .and_then(|socket| socket.connect(peer).map(|()| socket))
            .map_err(|e| GelfError::Construction(format!("cannot open socket to {peer}: {e}")))?;

        tracing::debug!(%peer, ?compression, "udp transport ready");
        Ok(Self {
            socket,
            peer,
            compression,
            ids: MessageIds::new(),
        })
    }

    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), GelfError> {
        let doc = wire::to_json(message)?;
        let payload = wire::compress(&doc, self.compression)?;
        for datagram in wire::chunk(&payload, self.ids.next_id())? {
            self.socket
                .send(&datagram)
                .map_err(|e| GelfError::Transport(format!("send to {}: {e}", self.peer)))?;
        }
        Ok(())
    }
}

/// Writes each message as one line of uncompressed GELF JSON.
#[derive(Debug)]
pub struct StdoutTransport<W> {
    out: W,
}

impl<W: Write + Send> StdoutTransport<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Transport for StdoutTransport<W> {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), GelfError> {
        let mut doc = wire::to_json(message)?;
        doc.push(b'\n');
        self.out
            .write_all(&doc)
            .and_then(|()| self.out.flush())
            .map_err(|e| GelfError::Transport(format!("write: {e}")))
    }
}
