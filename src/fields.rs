//! GELF field names used when assembling and encoding messages.
//!
//! Envelope keys follow GELF 1.1. Additional fields carry a leading `_`;
//! the identity keys below are the ones Docker-aware GELF collectors expect.

/// Protocol version written into every message.
pub const GELF_VERSION: &str = "1.1";

pub const VERSION: &str = "version";
pub const HOST: &str = "host";
pub const SHORT_MESSAGE: &str = "short_message";
pub const TIMESTAMP: &str = "timestamp";
pub const LEVEL: &str = "level";
pub const FACILITY: &str = "facility";

/// Prefix marking a key as an additional field.
pub const EXTRA_PREFIX: &str = "_";

/// Source identity extras (layer 1 of the merge).
pub const CONTAINER_ID: &str = "_container_id";
pub const CONTAINER_NAME: &str = "_container_name";
pub const IMAGE_ID: &str = "_image_id";
pub const IMAGE_NAME: &str = "_image_name";
pub const COMMAND: &str = "_command";
pub const CREATED: &str = "_created";
pub const SWARM_NODE: &str = "_swarm_node";

/// Labels whose key starts with this prefix (any case) override extras.
pub const LABEL_PREFIX: &str = "gelf_";

/// Number of characters removed from a matching label key.
///
/// One less than the prefix length: the prefix's trailing `_` stays on the
/// resulting key, so `gelf_service` becomes `_service`.
pub const LABEL_STRIP_LEN: usize = LABEL_PREFIX.len() - 1;

/// Prefix `key` with `_` to mark it as an additional field.
pub fn extra_key(key: &str) -> String {
    format!("{EXTRA_PREFIX}{key}")
}

/// Map a label key to its override key, if it carries the `gelf_` prefix.
///
/// The prefix test is ASCII case-insensitive and requires at least one
/// character after the prefix.
pub fn label_override_key(label: &str) -> Option<&str> {
    let prefix = label.get(..LABEL_PREFIX.len())?;
    if label.len() > LABEL_PREFIX.len() && prefix.eq_ignore_ascii_case(LABEL_PREFIX) {
        label.get(LABEL_STRIP_LEN..)
    } else {
        None
    }
}
