//! Anthropic-style SSE events.
//!
//! Every frame has the shape
//!
//! ```text
//! event: content_block_delta
//! data: {"type":"content_block_delta","index":0,"delta":{...}}
//!
//! ```

use crate::messages::{ContentBlock, MessagesResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart {
        message: MessagesResponse,
    },
    ContentBlockStart {
        index: usize,
        content_block: ContentBlock,
    },
    ContentBlockDelta {
        index: usize,
        delta: BlockDelta,
    },
    ContentBlockStop {
        index: usize,
    },
    MessageDelta {
        delta: MessageDelta,
        usage: DeltaUsage,
    },
    MessageStop,
    Error {
        error: ErrorBody,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDelta {
    TextDelta { text: String },
    ThinkingDelta { thinking: String },
    InputJsonDelta { partial_json: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDelta {
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaUsage {
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl StreamEvent {
    /// The SSE `event:` name for this payload.
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamEvent::MessageStart { .. } => "message_start",
            StreamEvent::ContentBlockStart { .. } => "content_block_start",
            StreamEvent::ContentBlockDelta { .. } => "content_block_delta",
            StreamEvent::ContentBlockStop { .. } => "content_block_stop",
            StreamEvent::MessageDelta { .. } => "message_delta",
            StreamEvent::MessageStop => "message_stop",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// Block index referenced by block-level events.
    pub fn block_index(&self) -> Option<usize> {
        match self {
            StreamEvent::ContentBlockStart { index, .. }
            | StreamEvent::ContentBlockDelta { index, .. }
            | StreamEvent::ContentBlockStop { index } => Some(*index),
            _ => None,
        }
    }

    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        StreamEvent::Error {
            error: ErrorBody {
                kind: kind.into(),
                message: message.into(),
            },
        }
    }

    /// Format as a complete SSE frame, trailing blank line included.
    pub fn to_sse_frame(&self) -> serde_json::Result<String> {
        let data = serde_json::to_string(self)?;
        Ok(sse_frame(self.event_name(), &data))
    }
}

pub fn sse_frame(event: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_frame_shape() {
        let event = StreamEvent::ContentBlockDelta {
            index: 2,
            delta: BlockDelta::InputJsonDelta {
                partial_json: "{}".to_string(),
            },
        };
        let frame = event.to_sse_frame().unwrap();
        assert_eq!(
            frame,
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":2,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{}\"}}\n\n"
        );
    }

    #[test]
    fn test_message_delta_keeps_null_stop_sequence() {
        let event = StreamEvent::MessageDelta {
            delta: MessageDelta {
                stop_reason: Some("end_turn".to_string()),
                stop_sequence: None,
            },
            usage: DeltaUsage { output_tokens: 7 },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert!(value["delta"]["stop_sequence"].is_null());
        assert_eq!(value["usage"]["output_tokens"], 7);
    }
}
