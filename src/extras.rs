//! Additional-field merging.
//!
//! The extras of one message are built from five layers applied in order,
//! each overwriting keys set by the ones before it:
//!
//! 1. source identity (`_container_id`, `_image_name`, ...)
//! 2. the line's context JSON, keys prefixed with `_`
//! 3. the line's extra JSON, keys prefixed with `_`
//! 4. the configured environment JSON, keys prefixed with `_`
//! 5. `gelf_*` labels of the source, keyed by [`fields::label_override_key`]
//!
//! Malformed JSON in layers 2–3 contributes nothing.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::GelfError;
use crate::fields;
use crate::record::SourceIdentity;
use crate::timestamp;

/// Flat additional-field map of one outgoing message.
pub type ExtrasMap = Map<String, Value>;

/// One source of additional fields.
#[derive(Debug, Clone, Copy)]
pub enum Layer<'a> {
    Identity(&'a SourceIdentity),
    /// Context JSON token recovered from the line.
    Context(&'a str),
    /// Extra JSON token recovered from the line.
    Extra(&'a str),
    /// Process-wide JSON object from configuration.
    Environment(&'a Map<String, Value>),
    Labels(&'a BTreeMap<String, String>),
}

impl Layer<'_> {
    /// Key/value pairs this layer contributes, in application order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        match self {
            Self::Identity(identity) => identity_entries(identity),
            Self::Context(json) | Self::Extra(json) => prefixed(json_object(json)),
            Self::Environment(map) => prefixed((*map).clone()),
            Self::Labels(labels) => labels
                .iter()
                .filter_map(|(name, value)| {
                    fields::label_override_key(name)
                        .map(|key| (key.to_string(), Value::String(value.clone())))
                })
                .collect(),
        }
    }
}

/// Apply `layers` in order, later layers winning on key collisions.
pub fn apply_layers(layers: &[Layer<'_>]) -> ExtrasMap {
    layers.iter().fold(ExtrasMap::new(), |mut extras, layer| {
        extras.extend(layer.entries());
        extras
    })
}

/// Build the extras for one record.
///
/// `context` and `extra` are the raw JSON tokens from the line grammar, empty
/// when the line did not match.
pub fn merge(
    identity: &SourceIdentity,
    context: &str,
    extra: &str,
    env: &Map<String, Value>,
    labels: &BTreeMap<String, String>,
) -> ExtrasMap {
    apply_layers(&[
        Layer::Identity(identity),
        Layer::Context(context),
        Layer::Extra(extra),
        Layer::Environment(env),
        Layer::Labels(labels),
    ])
}

/// Serialize the merged extras to a JSON object string.
pub fn encode(extras: &ExtrasMap) -> Result<String, GelfError> {
    Ok(serde_json::to_string(extras)?)
}

/// Parse `json` as an object, or return an empty map.
///
/// Invalid JSON and non-object values (such as the `[]` placeholder) are
/// treated as empty.
pub fn json_object(json: &str) -> Map<String, Value> {
    if json.is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed JSON payload");
            Map::new()
        }
    }
}

fn prefixed(map: Map<String, Value>) -> Vec<(String, Value)> {
    map.into_iter()
        .map(|(key, value)| (fields::extra_key(&key), value))
        .collect()
}

fn identity_entries(identity: &SourceIdentity) -> Vec<(String, Value)> {
    let mut entries = vec![
        (fields::CONTAINER_ID.to_string(), Value::from(identity.id.as_str())),
        (fields::CONTAINER_NAME.to_string(), Value::from(identity.display_name())),
        (fields::IMAGE_ID.to_string(), Value::from(identity.image_id.as_str())),
        (fields::IMAGE_NAME.to_string(), Value::from(identity.image_name.as_str())),
        (fields::COMMAND.to_string(), Value::from(identity.command_line())),
        (
            fields::CREATED.to_string(),
            Value::from(timestamp::to_rfc3339(identity.created)),
        ),
    ];
    if let Some(ref node) = identity.node {
        entries.push((fields::SWARM_NODE.to_string(), Value::from(node.as_str())));
    }
    entries
}
