//! Event-time conversion for the GELF `timestamp` field.
//!
//! GELF carries time as fractional Unix seconds. Events are truncated to whole
//! milliseconds first, so sub-millisecond precision never reaches the wire.

/// Convert `ts` to Unix seconds with millisecond resolution.
///
/// Sub-millisecond digits are dropped: `10:00:00.123999` becomes `…00.123`.
pub fn to_gelf_seconds(ts: jiff::Timestamp) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = ts.as_millisecond() as f64;
    millis / 1000.0
}

/// Format a timestamp as RFC 3339 in UTC, the way identity fields carry it.
pub fn to_rfc3339(ts: jiff::Timestamp) -> String {
    ts.to_string()
}
