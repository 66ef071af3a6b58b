//! Dynamic protobuf codec over descriptors supplied at registration time.
//!
//! `requestCodecs`/`responseCodecs` carry a base64 serialized
//! `FileDescriptorSet`; messages travel as JSON inside the server, keyed by
//! proto field names.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use prost::Message as _;
use prost_reflect::{DescriptorPool, DynamicMessage, Kind, MessageDescriptor, SerializeOptions};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("not a serialized FileDescriptorSet: {0}")]
    Descriptor(#[from] prost_reflect::DescriptorError),
    #[error("message {0} is not defined")]
    UnknownMessage(String),
    #[error("message name {name} is ambiguous between {candidates}")]
    AmbiguousMessage { name: String, candidates: String },
    #[error(transparent)]
    Decode(#[from] prost::DecodeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Decode a base64 descriptor set and resolve `class` in it.
pub fn load_message(encoded: &str, class: &str) -> Result<MessageDescriptor, CodecError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    let pool = DescriptorPool::decode(bytes.as_slice())?;
    resolve_message(&pool, class)
}

/// Fully-qualified name first, then a unique simple-name match.
pub fn resolve_message(pool: &DescriptorPool, class: &str) -> Result<MessageDescriptor, CodecError> {
    let class = class.trim_start_matches('.');
    if let Some(message) = pool.get_message_by_name(class) {
        return Ok(message);
    }
    let candidates: Vec<MessageDescriptor> =
        pool.all_messages().filter(|m| m.name() == class).collect();
    match candidates.as_slice() {
        [] => Err(CodecError::UnknownMessage(class.to_owned())),
        [only] => Ok(only.clone()),
        many => Err(CodecError::AmbiguousMessage {
            name: class.to_owned(),
            candidates: many
                .iter()
                .map(|m| m.full_name().to_owned())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Wire bytes → JSON object with every field present (defaults included).
pub fn decode_message(descriptor: &MessageDescriptor, payload: &[u8]) -> Result<Value, CodecError> {
    let message = DynamicMessage::decode(descriptor.clone(), payload)?;
    let options = SerializeOptions::new()
        .use_proto_field_name(true)
        .skip_default_fields(false);
    Ok(message.serialize_with_options(serde_json::value::Serializer, &options)?)
}

/// JSON → wire bytes. Accepts proto field names and their camelCase JSON names.
///
/// Rendered templates carry scalars as text. Numeric fields parse quoted values
/// on their own; `"true"`/`"false"` are turned back into booleans for `bool` fields.
pub fn encode_message(descriptor: &MessageDescriptor, value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut value = value.clone();
    coerce_message(descriptor, &mut value);
    let message = DynamicMessage::deserialize(descriptor.clone(), &value)?;
    Ok(message.encode_to_vec())
}

fn coerce_message(descriptor: &MessageDescriptor, value: &mut Value) {
    let Value::Object(fields) = value else {
        return;
    };
    for (name, field_value) in fields.iter_mut() {
        let Some(field) = descriptor
            .get_field_by_name(name)
            .or_else(|| descriptor.get_field_by_json_name(name))
        else {
            continue;
        };
        let kind = field.kind();
        if field.is_map() {
            if let (Kind::Message(entry), Value::Object(entries)) = (&kind, field_value) {
                let value_kind = entry.map_entry_value_field().kind();
                entries.values_mut().for_each(|v| coerce(&value_kind, v));
            }
        } else if field.is_list() {
            if let Value::Array(items) = field_value {
                items.iter_mut().for_each(|v| coerce(&kind, v));
            }
        } else {
            coerce(&kind, field_value);
        }
    }
}

fn coerce(kind: &Kind, value: &mut Value) {
    match kind {
        Kind::Bool => {
            let parsed = match value.as_str() {
                Some("true") => true,
                Some("false") => false,
                _ => return,
            };
            *value = Value::Bool(parsed);
        }
        Kind::Message(message) => coerce_message(message, value),
        _ => {}
    }
}
