use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::SecretString;
use serde_json::json;
use switchyard_protocol::{ContentBlock, Message, MessagesRequest};
use switchyard_warp::config::WarpConfig;
use switchyard_warp::error::WarpError;
use switchyard_warp::registry::SchemaRegistry;
use switchyard_warp::{WarpClient, WireCodec};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn event_stream_body(events: &[serde_json::Value]) -> String {
    let codec = WireCodec::new(SchemaRegistry::bundled().load().await.unwrap());
    events
        .iter()
        .map(|event| {
            let bytes = codec.encode_value("ResponseEvent", event).unwrap();
            format!("data: {}\r\n\r\n", STANDARD.encode(bytes))
        })
        .collect()
}

fn client(server: &MockServer) -> WarpClient {
    let config = WarpConfig {
        base_url: server.uri(),
        ..WarpConfig::default()
    };
    WarpClient::from_config(&config, SecretString::from("secret-token".to_string())).unwrap()
}

fn request() -> MessagesRequest {
    MessagesRequest::new("claude-sonnet-4-20250514", vec![Message::user("hi")])
}

#[tokio::test]
async fn test_posts_protobuf_with_identity_headers() {
    let server = MockServer::start().await;
    let body = event_stream_body(&[
        json!({"init": {"conversation_id": "conv-1"}}),
        json!({"client_actions": {"actions": [{"add_messages_to_task": {
            "task_id": "t",
            "messages": [{"id": "m", "task_id": "t", "agent_output": {"text": "Hi there"}}]
        }}]}}),
        json!({"finished": {"done": {}, "token_usage": [{"total_input": 4, "output": 2}]}}),
    ])
    .await;

    Mock::given(method("POST"))
        .and(path("/ai/multi-agent"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("content-type", "application/x-protobuf"))
        .and(header("accept", "text/event-stream"))
        .and(header("x-warp-client-id", "warp-app"))
        .and(header("x-warp-os-category", "macOS"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).send(&request()).await.unwrap();
    assert_eq!(response.content, vec![ContentBlock::text("Hi there")]);
    assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    assert_eq!(response.usage.input_tokens, 4);
    assert_eq!(response.usage.output_tokens, 2);
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ai/multi-agent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = client(&server).send(&request()).await.unwrap_err();
    match err {
        WarpError::Upstream { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "quota exhausted");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!WarpError::Upstream {
        status: 500,
        body: String::new()
    }
    .is_mid_stream());
}

#[tokio::test]
async fn test_upstream_error_before_stream_starts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    match client(&server).send_stream(&request()).await {
        Err(WarpError::Upstream { status, .. }) => assert_eq!(status, 401),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("stream should not start"),
    }
}
