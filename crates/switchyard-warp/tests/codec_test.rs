use serde_json::json;
use switchyard_protocol::{Message, MessagesRequest};
use switchyard_warp::codec::{to_plain_object, PlainObjectOptions, WireCodec};
use switchyard_warp::events::{parse_response_event, WarpEvent};
use switchyard_warp::registry::SchemaRegistry;
use switchyard_warp::tools::ToolMapper;
use switchyard_warp::translate::{build_wire_request, ExecutionContext};
use switchyard_warp::wire::{ResponseEventKind, OS_FINGERPRINT};

async fn codec() -> WireCodec {
    let registry = SchemaRegistry::bundled();
    WireCodec::new(registry.load().await.unwrap())
}

#[tokio::test]
async fn test_request_survives_encoding() {
    let codec = codec().await;
    let request = MessagesRequest::new("claude-sonnet-4-20250514", vec![Message::user("hello")]);
    let wire = build_wire_request(
        &request,
        &ExecutionContext::new("/work").with_conversation_id("conv-1"),
        &ToolMapper::new(),
    );

    let bytes = codec.encode_request(&wire).unwrap();
    assert!(!bytes.is_empty());

    let decoded = codec.decode("Request", &bytes).unwrap();
    let plain = to_plain_object(&decoded, &PlainObjectOptions::default());

    assert_eq!(
        plain["input"]["user_inputs"]["inputs"][0]["user_query"]["query"],
        json!("hello")
    );
    assert_eq!(plain["input"]["context"]["directory"]["pwd"], json!("/work"));
    assert_eq!(
        plain["input"]["context"]["operating_system"]["platform"]["fingerprint"],
        json!(OS_FINGERPRINT)
    );
    assert_eq!(plain["metadata"]["conversation_id"], json!("conv-1"));
    assert_eq!(plain["settings"]["model_config"]["base"], json!("claude-4-sonnet"));
    assert_eq!(
        plain["task_context"]["active_task_id"],
        plain["task_context"]["tasks"][0]["id"]
    );
}

#[tokio::test]
async fn test_enum_rendering_follows_options() {
    let codec = codec().await;
    let bytes = codec
        .encode_value("Request", &json!({"settings": {"supported_tools": ["GREP"]}}))
        .unwrap();
    let decoded = codec.decode("Request", &bytes).unwrap();

    let names = to_plain_object(&decoded, &PlainObjectOptions::default());
    assert_eq!(names["settings"]["supported_tools"], json!(["GREP"]));

    let numbers = to_plain_object(
        &decoded,
        &PlainObjectOptions {
            enum_numbers: true,
            ..PlainObjectOptions::default()
        },
    );
    assert!(numbers["settings"]["supported_tools"][0].is_number());

    let defaults = to_plain_object(
        &decoded,
        &PlainObjectOptions {
            emit_defaults: true,
            ..PlainObjectOptions::default()
        },
    );
    assert_eq!(defaults["settings"]["rules_enabled"], json!(false));
    assert_eq!(defaults["settings"]["supported_tools"], json!(["GREP"]));
    assert!(defaults["metadata"].is_null());
}

#[tokio::test]
async fn test_response_event_parses_into_typed_tree() {
    let codec = codec().await;
    let bytes = codec
        .encode_value(
            "ResponseEvent",
            &json!({"init": {"conversation_id": "conv-9", "request_id": "req-1"}}),
        )
        .unwrap();

    let event = codec.parse_response_event(&bytes).unwrap();
    match event.kind {
        Some(ResponseEventKind::Init(init)) => {
            assert_eq!(init.conversation_id, "conv-9");
            assert_eq!(init.request_id, "req-1");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_tool_calls_decode_from_bytes() {
    let codec = codec().await;
    let bytes = codec
        .encode_value(
            "ResponseEvent",
            &json!({
                "client_actions": {"actions": [{
                    "add_messages_to_task": {
                        "task_id": "task-1",
                        "messages": [
                            {"id": "m1", "task_id": "task-1",
                             "tool_call": {"tool_call_id": "toolu_1", "run_shell_command": {"command": "ls"}}},
                            {"id": "m2", "task_id": "task-1",
                             "tool_call": {"tool_call_id": "toolu_2", "grep": {"queries": ["fn main"], "path": "src"}}},
                            {"id": "m3", "task_id": "task-1",
                             "tool_call": {"tool_call_id": "toolu_3",
                                           "call_mcp_tool": {"name": "mcp__db__query", "args": {"sql": "select 1"}}}}
                        ]
                    }
                }]}
            }),
        )
        .unwrap();

    let event = codec.parse_response_event(&bytes).unwrap();
    let tools: Vec<_> = parse_response_event(&event, &ToolMapper::new())
        .into_iter()
        .filter_map(|e| match e {
            WarpEvent::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        })
        .collect();

    assert_eq!(tools.len(), 3);
    assert_eq!(tools[0].name, "Bash");
    assert_eq!(tools[0].input, json!({"command": "ls"}));
    assert_eq!(tools[1].name, "Grep");
    assert_eq!(tools[1].input, json!({"pattern": "fn main", "path": "src"}));
    assert_eq!(tools[2].id, "toolu_3");
    assert_eq!(tools[2].name, "mcp__db__query");
    assert_eq!(tools[2].input, json!({"sql": "select 1"}));
}

#[tokio::test]
async fn test_garbage_is_a_decoding_error() {
    let codec = codec().await;
    assert!(codec.parse_response_event(&[0xff, 0xff, 0xff]).is_err());
    assert!(codec.decode("NoSuchType", &[]).is_err());
}
