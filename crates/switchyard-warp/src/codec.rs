//! Binary codec for the multi-agent protocol.
//!
//! Typed wire values go out as proto3 JSON, are checked against the
//! descriptor, then packed by a [`DynamicMessage`]. Frames coming back are
//! decoded into a [`DynamicMessage`], flattened with [`to_plain_object`] and
//! lifted into the typed model.

use crate::error::CodecError;
use crate::registry::{qualified, SchemaRegistry, SchemaTable};
use crate::wire::{Request, ResponseEvent};
use prost::Message as _;
use prost_reflect::{
    DeserializeOptions, DynamicMessage, Kind, MessageDescriptor, ReflectMessage, SerializeOptions,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Options for [`to_plain_object`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainObjectOptions {
    /// Emit fields that hold their default value.
    pub emit_defaults: bool,
    /// Render enums as numbers instead of names.
    pub enum_numbers: bool,
}

#[derive(Debug, Clone)]
pub struct WireCodec {
    schema: Arc<SchemaTable>,
}

impl WireCodec {
    pub fn new(schema: Arc<SchemaTable>) -> Self {
        Self { schema }
    }

    /// Codec over an already loaded registry.
    pub fn from_registry(registry: &SchemaRegistry) -> Result<Self, CodecError> {
        Ok(Self::new(registry.ready()?))
    }

    pub fn schema(&self) -> &SchemaTable {
        &self.schema
    }

    fn descriptor(&self, name: &str) -> Result<MessageDescriptor, CodecError> {
        Ok(self.schema.message(&qualified(name))?)
    }

    /// Validate and serialize a `Request`.
    pub fn encode_request(&self, request: &Request) -> Result<Vec<u8>, CodecError> {
        self.encode("Request", request)
    }

    /// Serialize any typed wire value as message `type_name` (unqualified).
    pub fn encode<T: Serialize>(&self, type_name: &str, value: &T) -> Result<Vec<u8>, CodecError> {
        let value = serde_json::to_value(value).map_err(|e| CodecError::Encoding {
            path: String::new(),
            reason: e.to_string(),
        })?;
        self.encode_value(type_name, &value)
    }

    pub fn encode_value(&self, type_name: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
        let desc = self.descriptor(type_name)?;
        validate(&desc, value)?;

        let options = DeserializeOptions::new().deny_unknown_fields(true);
        let message = DynamicMessage::deserialize_with_options(desc, value, &options)
            .map_err(|e| CodecError::Encoding {
                path: String::new(),
                reason: e.to_string(),
            })?;
        Ok(message.encode_to_vec())
    }

    /// Decode one `ResponseEvent` frame.
    pub fn decode_response_event(&self, bytes: &[u8]) -> Result<DynamicMessage, CodecError> {
        self.decode("ResponseEvent", bytes)
    }

    pub fn decode(&self, type_name: &str, bytes: &[u8]) -> Result<DynamicMessage, CodecError> {
        let desc = self.descriptor(type_name)?;
        DynamicMessage::decode(desc, bytes).map_err(|e| CodecError::Decoding(e.to_string()))
    }

    /// Decode a frame straight into the typed model.
    pub fn parse_response_event(&self, bytes: &[u8]) -> Result<ResponseEvent, CodecError> {
        let message = self.decode_response_event(bytes)?;
        let plain = to_plain_object(&message, &PlainObjectOptions::default());
        serde_json::from_value(plain)
            .map_err(|e| CodecError::Decoding(format!("unexpected event shape: {}", e)))
    }
}

/// Convert a decoded message into plain JSON.
///
/// Field names are the proto names, 64-bit integers stay numbers, and at most
/// one member of each oneof appears. Never fails: a message that cannot be
/// rendered (e.g. an out-of-range timestamp) becomes an empty object.
pub fn to_plain_object(message: &DynamicMessage, options: &PlainObjectOptions) -> Value {
    let serialize_options = SerializeOptions::new()
        .stringify_64_bit_integers(false)
        .use_proto_field_name(true)
        .use_enum_numbers(options.enum_numbers)
        .skip_default_fields(!options.emit_defaults);

    match message.serialize_with_options(serde_json::value::Serializer, &serialize_options) {
        Ok(value) => value,
        Err(e) => {
            warn!(
                message = message.descriptor().full_name(),
                "failed to render decoded message: {}", e
            );
            Value::Object(Map::new())
        }
    }
}

/// Check `value` against the descriptor, reporting the first bad field path.
pub fn validate(desc: &MessageDescriptor, value: &Value) -> Result<(), CodecError> {
    validate_message(desc, value, "")
}

fn invalid(path: &str, reason: impl Into<String>) -> CodecError {
    CodecError::Encoding {
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        reason: reason.into(),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn validate_message(desc: &MessageDescriptor, value: &Value, path: &str) -> Result<(), CodecError> {
    // Well-known types have bespoke JSON forms; the dynamic decoder checks them.
    if desc.package_name() == "google.protobuf" {
        return Ok(());
    }

    let Value::Object(map) = value else {
        return Err(invalid(
            path,
            format!("expected object for {}", desc.full_name()),
        ));
    };

    let mut oneofs: HashMap<String, &str> = HashMap::new();
    for (key, field_value) in map {
        let field_path = join(path, key);
        let field = desc
            .get_field_by_name(key)
            .or_else(|| desc.get_field_by_json_name(key))
            .ok_or_else(|| invalid(&field_path, format!("unknown field on {}", desc.full_name())))?;

        if field_value.is_null() {
            continue;
        }

        if let Some(oneof) = field.containing_oneof() {
            if let Some(previous) = oneofs.insert(oneof.name().to_string(), key) {
                return Err(invalid(
                    &field_path,
                    format!("oneof `{}` already set by `{}`", oneof.name(), previous),
                ));
            }
        }

        if field.is_map() {
            if !field_value.is_object() {
                return Err(invalid(&field_path, "expected map object"));
            }
        } else if field.is_list() {
            let Value::Array(items) = field_value else {
                return Err(invalid(&field_path, "expected array"));
            };
            for (i, item) in items.iter().enumerate() {
                validate_kind(&field.kind(), item, &format!("{}[{}]", field_path, i))?;
            }
        } else {
            validate_kind(&field.kind(), field_value, &field_path)?;
        }
    }

    Ok(())
}

fn validate_kind(kind: &Kind, value: &Value, path: &str) -> Result<(), CodecError> {
    let ok = match kind {
        Kind::Message(desc) => return validate_message(desc, value, path),
        Kind::Enum(desc) => match value {
            Value::String(name) => {
                if desc.get_value_by_name(name).is_none() {
                    return Err(invalid(
                        path,
                        format!("`{}` is not a value of {}", name, desc.full_name()),
                    ));
                }
                true
            }
            Value::Number(n) => n.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
            _ => false,
        },
        Kind::Bool => value.is_boolean(),
        Kind::String | Kind::Bytes => value.is_string(),
        Kind::Double | Kind::Float => value.is_number() || value.is_string(),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
            integer(value).is_some_and(|n| i32::try_from(n).is_ok())
        }
        Kind::Uint32 | Kind::Fixed32 => integer(value).is_some_and(|n| u32::try_from(n).is_ok()),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
            integer(value).is_some_and(|n| i64::try_from(n).is_ok())
        }
        Kind::Uint64 | Kind::Fixed64 => integer(value).is_some_and(|n| u64::try_from(n).is_ok()),
    };

    if ok {
        Ok(())
    } else {
        Err(invalid(path, format!("expected {:?}", kind_label(kind))))
    }
}

/// Integer from a JSON number or numeric string.
fn integer(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn kind_label(kind: &Kind) -> &'static str {
    match kind {
        Kind::Message(_) => "message",
        Kind::Enum(_) => "enum",
        Kind::Bool => "bool",
        Kind::String => "string",
        Kind::Bytes => "bytes",
        Kind::Double | Kind::Float => "number",
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => "int32",
        Kind::Uint32 | Kind::Fixed32 => "uint32",
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => "int64",
        Kind::Uint64 | Kind::Fixed64 => "uint64",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn codec() -> WireCodec {
        let registry = SchemaRegistry::bundled();
        WireCodec::new(registry.load().await.unwrap())
    }

    #[tokio::test]
    async fn test_validation_names_first_bad_path() {
        let codec = codec().await;
        let err = codec
            .encode_value(
                "Request",
                &json!({"settings": {"supported_tools": ["GREP", "NOT_A_TOOL"]}}),
            )
            .unwrap_err();
        match err {
            CodecError::Encoding { path, .. } => assert_eq!(path, "settings.supported_tools[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_validation_rejects_unknown_fields_and_double_oneofs() {
        let codec = codec().await;

        let err = codec
            .encode_value("Request", &json!({"metadata": {"conversation": "x"}}))
            .unwrap_err();
        assert!(matches!(err, CodecError::Encoding { ref path, .. } if path == "metadata.conversation"));

        let err = codec
            .encode_value(
                "ToolCall",
                &json!({"grep": {"queries": ["a"]}, "file_glob": {"patterns": ["*"]}}),
            )
            .unwrap_err();
        assert!(matches!(err, CodecError::Encoding { .. }));
    }

    #[tokio::test]
    async fn test_fingerprint_is_fixed32() {
        let codec = codec().await;
        let bytes = codec
            .encode_value(
                "Platform",
                &json!({"fingerprint": crate::wire::OS_FINGERPRINT}),
            )
            .unwrap();
        // field 9, wire type 5 (fixed32), little-endian payload
        assert_eq!(bytes, vec![0x4d, 0x61, 0x63, 0x4f, 0x53]);
    }

    #[tokio::test]
    async fn test_truncated_frame_is_decoding_error() {
        let codec = codec().await;
        let bytes = codec
            .encode_value("ResponseEvent", &json!({"init": {"conversation_id": "abc"}}))
            .unwrap();
        let err = codec.decode_response_event(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, CodecError::Decoding(_)));
    }

    #[tokio::test]
    async fn test_plain_object_keeps_oneof_exclusive() {
        let codec = codec().await;
        let bytes = codec
            .encode_value(
                "ResponseEvent",
                &json!({"finished": {"done": {}, "token_usage": [{"output": 3}]}}),
            )
            .unwrap();
        let decoded = codec.decode_response_event(&bytes).unwrap();
        let plain = to_plain_object(&decoded, &PlainObjectOptions::default());

        assert_eq!(plain["finished"]["done"], json!({}));
        assert!(plain["finished"].get("quota_limit").is_none());
        assert_eq!(plain["finished"]["token_usage"][0]["output"], json!(3));
    }

    #[test]
    fn test_codec_requires_loaded_registry() {
        let registry = SchemaRegistry::bundled();
        assert!(matches!(
            WireCodec::from_registry(&registry),
            Err(CodecError::Schema(crate::error::SchemaError::NotReady))
        ));
    }
}
