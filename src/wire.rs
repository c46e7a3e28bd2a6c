//! GELF wire encoding: JSON document, optional compression, UDP chunking.
//!
//! A message is serialized as its envelope object with the pre-serialized
//! extras spliced in at top level. Payloads larger than one datagram are split
//! into GELF chunks:
//!
//! ```text
//! 0x1e 0x0f | message id (8 bytes) | seq (1) | count (1) | data
//! ```

use std::io::Write;

use clap::ValueEnum;
use flate2::write::{GzEncoder, ZlibEncoder};
use serde::Deserialize;

use crate::error::GelfError;
use crate::message::OutgoingMessage;

/// Largest datagram written, header included.
pub const CHUNK_SIZE: usize = 1420;
/// Chunk header length: magic, message id, sequence number, sequence count.
pub const CHUNK_HEADER_LEN: usize = 12;
/// Data bytes carried by one chunk.
pub const CHUNK_DATA_LEN: usize = CHUNK_SIZE - CHUNK_HEADER_LEN;
/// GELF limit on the number of chunks per message.
pub const MAX_CHUNKS: usize = 128;
const CHUNK_MAGIC: [u8; 2] = [0x1e, 0x0f];

/// Payload compression algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressType {
    /// Send plain JSON.
    None,
    /// Gzip container (default).
    #[default]
    Gzip,
    /// Zlib container.
    Zlib,
}

impl CompressType {
    /// Parse a compression name, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "gzip" => Some(Self::Gzip),
            "zlib" => Some(Self::Zlib),
            _ => None,
        }
    }
}

/// Compression algorithm plus level.
///
/// `level` is `-1` for the library default or `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub kind: CompressType,
    pub level: i32,
}

impl Default for Compression {
    fn default() -> Self {
        Self {
            kind: CompressType::Gzip,
            level: DEFAULT_LEVEL,
        }
    }
}

/// Level value meaning "use the compressor's default".
pub const DEFAULT_LEVEL: i32 = -1;

/// Whether `level` is accepted as a compression level.
pub const fn valid_level(level: i32) -> bool {
    level >= DEFAULT_LEVEL && level <= 9
}

impl Compression {
    fn flate_level(self) -> flate2::Compression {
        match u32::try_from(self.level) {
            Ok(level) if level <= 9 => flate2::Compression::new(level),
            _ => flate2::Compression::default(),
        }
    }
}

/// Serialize `message` to its GELF JSON document.
pub fn to_json(message: &OutgoingMessage) -> Result<Vec<u8>, GelfError> {
    let mut doc = serde_json::to_vec(message)?;
    let extra = message.extra.trim();
    if extra.is_empty() {
        return Ok(doc);
    }

    let inner = extra
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| GelfError::Transport("extras must be a JSON object".to_string()))?
        .trim();
    if inner.is_empty() {
        return Ok(doc);
    }

    // Replace the envelope's closing brace with the extras' members
    doc.pop();
    doc.push(b',');
    doc.extend_from_slice(inner.as_bytes());
    doc.push(b'}');
    Ok(doc)
}

/// Compress `payload` according to `compression`.
pub fn compress(payload: &[u8], compression: Compression) -> Result<Vec<u8>, GelfError> {
    let level = compression.flate_level();
    let out = match compression.kind {
        CompressType::None => payload.to_vec(),
        CompressType::Gzip => {
            let mut encoder = GzEncoder::new(Vec::with_capacity(payload.len() / 2), level);
            encoder.write_all(payload)?;
            encoder.finish()?
        }
        CompressType::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::with_capacity(payload.len() / 2), level);
            encoder.write_all(payload)?;
            encoder.finish()?
        }
    };
    Ok(out)
}

/// Split `payload` into datagrams.
///
/// Payloads that fit in [`CHUNK_SIZE`] are returned as a single unframed
/// datagram.
pub fn chunk(payload: &[u8], message_id: [u8; 8]) -> Result<Vec<Vec<u8>>, GelfError> {
    if payload.len() <= CHUNK_SIZE {
        return Ok(vec![payload.to_vec()]);
    }

    let count = payload.len().div_ceil(CHUNK_DATA_LEN);
    if count > MAX_CHUNKS {
        return Err(GelfError::Transport(format!(
            "message too large: {} bytes needs {count} chunks, limit is {MAX_CHUNKS}",
            payload.len()
        )));
    }

    #[allow(clippy::cast_possible_truncation)] // count <= MAX_CHUNKS
    let datagrams = payload
        .chunks(CHUNK_DATA_LEN)
        .enumerate()
        .map(|(seq, data)| {
            let mut datagram = Vec::with_capacity(CHUNK_HEADER_LEN + data.len());
            datagram.extend_from_slice(&CHUNK_MAGIC);
            datagram.extend_from_slice(&message_id);
            datagram.push(seq as u8);
            datagram.push(count as u8);
            datagram.extend_from_slice(data);
            datagram
        })
        .collect();
    Ok(datagrams)
}

/// Generator of chunk message ids.
///
/// Ids only need to differ between messages in flight from one sender, so a
/// time-seeded splitmix64 sequence is enough.
#[derive(Debug, Clone)]
pub struct MessageIds {
    state: u64,
}

impl MessageIds {
    pub fn new() -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = jiff::Timestamp::now().as_nanosecond() as u64;
        Self::with_seed(nanos ^ u64::from(std::process::id()).rotate_left(32))
    }

    pub const fn with_seed(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_id(&mut self) -> [u8; 8] {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        (z ^ (z >> 31)).to_be_bytes()
    }
}

impl Default for MessageIds {
    fn default() -> Self {
        Self::new()
    }
}
