//! Typed model of the `warp.multi_agent.v1` schema.
//!
//! Field names match the `.proto` field names so these types serialize to the
//! proto3 JSON mapping the codec feeds into the dynamic encoder. Every
//! `oneof` is an enum; a oneof that sits next to ordinary fields is a
//! `#[serde(flatten)] Option<_>` so decoding an unknown case yields `None`
//! instead of failing the whole frame.

pub mod request;
pub mod response;
pub mod task;
pub mod tool_call;
pub mod tool_result;
pub mod tool_type;

pub use request::*;
pub use response::*;
pub use task::*;
pub use tool_call::*;
pub use tool_result::*;
pub use tool_type::ToolType;

use serde::{Deserialize, Serialize};

/// `google.protobuf.Empty`, also used for payload-less oneof cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Render whole seconds in the proto3 JSON `Duration` form (`"5s"`).
pub fn duration_from_secs(secs: u64) -> String {
    format!("{}s", secs)
}

/// Parse a proto3 JSON `Duration` (`"1.5s"`) into seconds.
pub fn duration_secs(value: &str) -> Option<f64> {
    value.strip_suffix('s')?.parse().ok()
}

/// `bytes` fields travel as standard base64 in the JSON mapping.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::{STANDARD, URL_SAFE};
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(&encoded)
            .or_else(|_| URL_SAFE.decode(&encoded))
            .map_err(serde::de::Error::custom)
    }
}
