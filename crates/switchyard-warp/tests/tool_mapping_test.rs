use serde_json::{json, Value};
use switchyard_protocol::ToolResultContent;
use switchyard_warp::tools::{ToolMapper, ToolResult, ToolUse};
use switchyard_warp::wire::{ShellOutcome, ToolCallKind, ToolResultKind};

fn round_trip(mapper: &ToolMapper, name: &str, input: Value) -> ToolUse {
    let call = mapper.to_wire_tool_call(&ToolUse::new("toolu_01", name, input));
    assert_eq!(call.tool_call_id, "toolu_01");
    mapper
        .from_wire_tool_call(&call)
        .unwrap_or_else(|| panic!("{name} did not map back"))
}

#[test]
fn test_tool_calls_survive_round_trip() {
    let mapper = ToolMapper::new();
    let cases = vec![
        ("Bash", json!({"command": "ls -la"})),
        ("Read", json!({"file_path": "/src/lib.rs"})),
        ("Read", json!({"file_path": "/src/lib.rs", "offset": 10, "limit": 20})),
        ("Write", json!({"file_path": "/tmp/a.txt", "content": "hello"})),
        ("Edit", json!({"file_path": "/src/a.rs", "old_string": "foo", "new_string": "bar"})),
        ("Delete", json!({"file_path": "/tmp/a.txt"})),
        ("Grep", json!({"pattern": "TODO", "path": "src"})),
        ("Glob", json!({"pattern": "**/*.rs", "path": "crates"})),
        (
            "SearchCodebase",
            json!({"query": "frame parser", "path_filters": ["src"], "codebase_path": "/repo"}),
        ),
        ("Task", json!({"prompt": "find the bug", "subagent_type": "research"})),
        (
            "ReadDocuments",
            json!({"documents": [{"document_id": "doc-1", "line_ranges": [{"start": 1, "end": 5}]}]}),
        ),
        (
            "EditDocuments",
            json!({"diffs": [{"document_id": "doc-1", "old_string": "a", "new_string": "b"}]}),
        ),
        ("WriteToShell", json!({"input": "y\n", "command_id": "cmd-1", "mode": "line"})),
        ("ReadShellOutput", json!({"command_id": "cmd-1", "duration": 5})),
        ("ReadShellOutput", json!({"command_id": "cmd-1", "wait_for_completion": true})),
        (
            "Plan",
            json!({"summary": "two steps", "tasks": [{"id": "1", "description": "first"}]}),
        ),
        (
            "computer",
            json!({"actions": [{"type": "type", "text": "hi"}], "action_summary": "typing"}),
        ),
        ("RequestComputerUse", json!({"task_summary": "open settings"})),
        ("ReadMCPResource", json!({"uri": "file:///notes.md", "server_id": "notes"})),
        ("Skill", json!({"skill_name": "pdf", "skill_path": "/skills/pdf"})),
        ("OpenCodeReview", json!({})),
        ("InitProject", json!({})),
        (
            "InsertReviewComments",
            json!({
                "repo_path": "/repo",
                "comments": [{"id": "c1", "author": "dev", "timestamp": "2026-01-01", "content": "nit"}]
            }),
        ),
        ("SuggestPrompt", json!({"prompt": "run tests", "label": "Test"})),
        ("SuggestNewConversation", json!({"message_id": "msg-9"})),
        ("mcp__github__create_issue", json!({"title": "bug"})),
        ("WebFetch", json!({"url": "https://example.com"})),
    ];

    for (name, input) in cases {
        let back = round_trip(&mapper, name, input.clone());
        assert_eq!(back.id, "toolu_01");
        assert_eq!(back.name, name, "name changed for {name}");
        assert_eq!(back.input, input, "input changed for {name}");
    }
}

#[test]
fn test_aliases_map_to_canonical_names() {
    let mapper = ToolMapper::new();

    let back = round_trip(&mapper, "Subagent", json!({"prompt": "go"}));
    assert_eq!(back.name, "Task");
    assert_eq!(back.input, json!({"prompt": "go"}));

    let back = round_trip(&mapper, "SuggestPlan", json!({"summary": "s", "tasks": []}));
    assert_eq!(back.name, "Plan");

    let back = round_trip(&mapper, "ReadSkill", json!({"skill_name": "pdf"}));
    assert_eq!(back.name, "Skill");
    assert_eq!(back.input, json!({"skill_name": "pdf"}));
}

#[test]
fn test_create_documents_as_write_or_document_list() {
    let input = json!({"documents": [{"title": "Create file src/main.rs", "content": "fn main() {}"}]});

    let collapsed = round_trip(&ToolMapper::new(), "CreateDocuments", input.clone());
    assert_eq!(collapsed.name, "Write");
    assert_eq!(
        collapsed.input,
        json!({"file_path": "src/main.rs", "content": "fn main() {}"})
    );

    let mapper = ToolMapper::new().with_document_write_tool("CreateDocuments");
    let kept = round_trip(&mapper, "CreateDocuments", input.clone());
    assert_eq!(kept.name, "CreateDocuments");
    assert_eq!(kept.input, input);
}

#[test]
fn test_shell_command_is_classified() {
    let mapper = ToolMapper::new();

    let call = mapper.to_wire_tool_call(&ToolUse::new("t1", "Bash", json!({"command": "cat Cargo.toml"})));
    match call.tool {
        Some(ToolCallKind::RunShellCommand(cmd)) => {
            assert!(cmd.is_read_only);
            assert!(!cmd.is_risky);
            assert!(cmd.wait_until_complete);
        }
        other => panic!("unexpected call: {other:?}"),
    }

    let call = mapper.to_wire_tool_call(&ToolUse::new("t2", "Bash", json!({"command": "rm -rf build"})));
    match call.tool {
        Some(ToolCallKind::RunShellCommand(cmd)) => {
            assert!(!cmd.is_read_only);
            assert!(cmd.is_risky);
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[test]
fn test_unknown_tool_becomes_external_call() {
    let mapper = ToolMapper::new();
    let call = mapper.to_wire_tool_call(&ToolUse::new(
        "t1",
        "mcp__github__create_issue",
        json!({"title": "bug", "server_id": "gh"}),
    ));
    match &call.tool {
        Some(ToolCallKind::CallMcpTool(mcp)) => {
            assert_eq!(mcp.name, "mcp__github__create_issue");
            assert_eq!(mcp.server_id, "gh");
            assert_eq!(mcp.args.get("title"), Some(&json!("bug")));
        }
        other => panic!("unexpected call: {other:?}"),
    }
    assert_eq!(mapper.tool_name(&call), "mcp__github__create_issue");

    let call = mapper.to_wire_tool_call(&ToolUse::new("t2", "NotebookEdit", json!({"cell": 1})));
    match &call.tool {
        Some(ToolCallKind::CallMcpTool(mcp)) => assert!(mcp.server_id.is_empty()),
        other => panic!("unexpected call: {other:?}"),
    }
}

#[test]
fn test_shell_result_carries_exit_code() {
    let mapper = ToolMapper::new();
    let ok = ToolResult {
        tool_use_id: "t1".to_string(),
        content: ToolResultContent::String("done".to_string()),
        is_error: false,
    };
    let failed = ToolResult {
        is_error: true,
        ..ok.clone()
    };

    for (result, exit_code) in [(ok, 0), (failed, 1)] {
        let wire = mapper.to_wire_tool_result(&result, "Bash");
        assert_eq!(wire.tool_call_id, "t1");
        match wire.result {
            Some(ToolResultKind::RunShellCommand(shell)) => match shell.result {
                Some(ShellOutcome::CommandFinished(finished)) => {
                    assert_eq!(finished.output, "done");
                    assert_eq!(finished.exit_code, exit_code);
                }
                other => panic!("unexpected outcome: {other:?}"),
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

#[test]
fn test_empty_calls_have_no_tool_use() {
    let mapper = ToolMapper::new();
    let call = switchyard_warp::wire::ToolCall {
        tool_call_id: "t1".to_string(),
        tool: None,
    };
    assert!(mapper.from_wire_tool_call(&call).is_none());
}
