//! Warp multi-agent backend for switchyard.
//!
//! Speaks the upstream's binary protocol on one side and the Anthropic
//! Messages contract on the other:
//!
//! - [`registry`] compiles the `.proto` bundle once and serves descriptors
//! - [`codec`] turns typed [`wire`] values into bytes and back
//! - [`translate`] builds a wire `Request` from a [`MessagesRequest`](switchyard_protocol::MessagesRequest)
//! - [`tools`] maps tool calls and results in both directions
//! - [`events`], [`framing`] and [`reassembler`] turn the response stream into SSE events
//! - [`client`] ties these together over a pluggable transport

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod framing;
pub mod models;
pub mod reassembler;
pub mod registry;
pub mod tools;
pub mod translate;
pub mod wire;

pub use client::{sse_frames, EventStream, HttpTransport, WarpClient, WarpTransport};
pub use codec::{to_plain_object, PlainObjectOptions, WireCodec};
pub use config::WarpConfig;
pub use error::{CodecError, Result, SchemaError, TranslationError, WarpError};
pub use events::{parse_response_event, Finished, WarpEvent};
pub use framing::{FrameDecoder, LineBuffer};
pub use models::map_model_to_warp;
pub use reassembler::Reassembler;
pub use registry::{SchemaRegistry, SchemaTable};
pub use tools::{ToolMapper, ToolResult, ToolUse};
pub use translate::{build_wire_request, ExecutionContext};
