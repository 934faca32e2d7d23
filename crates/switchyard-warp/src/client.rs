//! Warp multi-agent client.
//!
//! [`WarpClient`] runs one turn end to end: translate, encode, POST through a
//! [`WarpTransport`], then decode the event stream and reassemble it into
//! Anthropic SSE events (or a buffered [`MessagesResponse`]).

use crate::codec::WireCodec;
use crate::config::{headers, WarpConfig};
use crate::error::{Result, WarpError};
use crate::framing::FrameDecoder;
use crate::reassembler::{new_message_id, Reassembler};
use crate::registry::SchemaRegistry;
use crate::tools::ToolMapper;
use crate::translate::{build_wire_request, ExecutionContext};
use async_stream::{stream, try_stream};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use switchyard_protocol::{Content, ContentBlock, MessagesRequest, MessagesResponse, StreamEvent};
use tracing::{debug, info, warn};

/// Raw response body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Anthropic SSE events for one turn.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Moves an encoded request to the upstream and hands back the response body.
#[async_trait]
pub trait WarpTransport: Send + Sync {
    async fn send(&self, body: Vec<u8>) -> Result<ByteStream>;
}

/// HTTPS transport to the multi-agent endpoint.
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(config: &WarpConfig, access_token: SecretString) -> Result<Self> {
        let mut default_headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", access_token.expose_secret()))
            .map_err(|_| WarpError::Configuration("Invalid access token format".into()))?;
        auth.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, auth);

        for (name, value) in config.client.header_pairs() {
            let value = HeaderValue::from_str(value).map_err(|_| {
                WarpError::Configuration(format!("Invalid value for header {}", name))
            })?;
            default_headers.insert(name, value);
        }
        default_headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(headers::CONTENT_TYPE_PROTOBUF),
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static(headers::ACCEPT_EVENT_STREAM));
        default_headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static(headers::ENCODING_IDENTITY),
        );

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WarpTransport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<ByteStream> {
        debug!(url = %self.url, bytes = body.len(), "sending multi-agent request");
        let response = self.client.post(&self.url).body(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WarpError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(WarpError::from));
        Ok(Box::pin(stream))
    }
}

/// Rough input size: four characters per token over text, tool and system content.
pub fn estimate_input_tokens(request: &MessagesRequest) -> u32 {
    let mut chars = request
        .system
        .as_ref()
        .map(|s| s.to_plaintext().len())
        .unwrap_or(0);
    for message in &request.messages {
        match &message.content {
            Content::String(text) => chars += text.len(),
            Content::Blocks(blocks) => {
                for block in blocks {
                    chars += match block {
                        ContentBlock::Text { text } => text.len(),
                        ContentBlock::Thinking { thinking, .. } => thinking.len(),
                        ContentBlock::ToolUse { input, .. } => input.to_string().len(),
                        ContentBlock::ToolResult { content, .. } => content.flatten().len(),
                        ContentBlock::Image { .. } | ContentBlock::Unsupported => 0,
                    };
                }
            }
        }
    }
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}

/// A request that is encoded and sent, waiting to be read.
struct Turn {
    body: ByteStream,
    decoder: FrameDecoder,
    reassembler: Reassembler,
}

pub struct WarpClient {
    registry: Arc<SchemaRegistry>,
    transport: Arc<dyn WarpTransport>,
    mapper: ToolMapper,
    context: ExecutionContext,
}

impl WarpClient {
    pub fn new(registry: Arc<SchemaRegistry>, transport: Arc<dyn WarpTransport>) -> Self {
        Self {
            registry,
            transport,
            mapper: ToolMapper::default(),
            context: ExecutionContext::default(),
        }
    }

    /// Client over HTTPS using `config` for the endpoint and schema location.
    pub fn from_config(config: &WarpConfig, access_token: SecretString) -> Result<Self> {
        let transport = HttpTransport::new(config, access_token)?;
        Ok(Self::new(
            Arc::new(SchemaRegistry::new(config.schema_dir.clone())),
            Arc::new(transport),
        ))
    }

    pub fn with_mapper(mut self, mapper: ToolMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Translate and encode without sending.
    pub async fn encode(&self, request: &MessagesRequest) -> Result<(WireCodec, Vec<u8>)> {
        let codec = WireCodec::new(self.registry.load().await?);
        let wire = build_wire_request(request, &self.context, &self.mapper);
        let body = codec.encode_request(&wire)?;
        Ok((codec, body))
    }

    async fn start(&self, request: &MessagesRequest) -> Result<Turn> {
        let (codec, body) = self.encode(request).await?;
        let message_id = new_message_id();
        info!(
            message_id = %message_id,
            model = %request.model,
            bytes = body.len(),
            "starting warp turn"
        );

        let stream = self.transport.send(body).await?;
        Ok(Turn {
            body: stream,
            decoder: FrameDecoder::new(codec, self.mapper.clone()),
            reassembler: Reassembler::new(
                message_id,
                request.model.clone(),
                estimate_input_tokens(request),
            ),
        })
    }

    /// Stream the turn as Anthropic SSE events.
    ///
    /// A transport failure after the first byte ends the stream with
    /// [`WarpError::StreamAborted`]; a clean close before the upstream
    /// finished ends it with [`WarpError::IncompleteStream`].
    pub async fn send_stream(&self, request: &MessagesRequest) -> Result<EventStream> {
        let Turn {
            mut body,
            mut decoder,
            mut reassembler,
        } = self.start(request).await?;

        let stream = try_stream! {
            yield reassembler.message_start();

            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| WarpError::StreamAborted(e.to_string()))?;
                for event in decoder.push(&chunk) {
                    for sse in reassembler.apply(event) {
                        yield sse;
                    }
                }
            }
            for event in decoder.finish() {
                for sse in reassembler.apply(event) {
                    yield sse;
                }
            }

            if decoder.skipped() > 0 {
                warn!(frames = decoder.frames(), skipped = decoder.skipped(), "stream had malformed frames");
            }
            if !reassembler.is_finished() {
                Err::<(), _>(WarpError::IncompleteStream)?;
            }
        };
        Ok(Box::pin(stream))
    }

    /// Run the turn to completion and return the buffered message.
    pub async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let Turn {
            mut body,
            mut decoder,
            mut reassembler,
        } = self.start(request).await?;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| WarpError::StreamAborted(e.to_string()))?;
            for event in decoder.push(&chunk) {
                reassembler.apply(event);
            }
        }
        for event in decoder.finish() {
            reassembler.apply(event);
        }

        if !reassembler.is_finished() {
            return Err(WarpError::IncompleteStream);
        }
        Ok(reassembler.into_response())
    }
}

/// Render an event stream as SSE frames. A mid-stream error becomes a final
/// `error` frame so the consumer never mistakes a cut stream for a finished one.
pub fn sse_frames(mut events: EventStream) -> impl Stream<Item = String> + Send {
    stream! {
        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "warp turn failed");
                    let kind = if err.is_mid_stream() { "api_error" } else { "invalid_request_error" };
                    StreamEvent::error(kind, err.to_string())
                }
            };
            let is_error = matches!(event, StreamEvent::Error { .. });
            match event.to_sse_frame() {
                Ok(frame) => yield frame,
                Err(e) => warn!(event = event.event_name(), "failed to serialize SSE event: {}", e),
            }
            if is_error {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_protocol::Message;

    #[test]
    fn test_estimate_input_tokens() {
        let request = MessagesRequest::new("claude-4-sonnet", vec![Message::user("abcdefgh")]);
        assert_eq!(estimate_input_tokens(&request), 2);

        let request = MessagesRequest::new("claude-4-sonnet", vec![Message::user("abcde")]);
        assert_eq!(estimate_input_tokens(&request), 2);

        let request = MessagesRequest::new("claude-4-sonnet", Vec::new());
        assert_eq!(estimate_input_tokens(&request), 0);
    }

    #[test]
    fn test_http_transport_url() {
        let config = WarpConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..WarpConfig::default()
        };
        let transport = HttpTransport::new(&config, SecretString::from("token".to_string())).unwrap();
        assert_eq!(transport.url(), "http://127.0.0.1:8080/ai/multi-agent");
    }

    #[test]
    fn test_http_transport_rejects_bad_token() {
        let config = WarpConfig::default();
        let result = HttpTransport::new(&config, SecretString::from("bad\ntoken".to_string()));
        assert!(matches!(result, Err(WarpError::Configuration(_))));
    }
}
