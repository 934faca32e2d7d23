//! Upstream tool calls back to `tool_use` blocks.

use super::computer::from_wire_actions;
use super::names::*;
use super::normalize::{clean_edit_text, extract_path_from_title};
use super::{ToolMapper, ToolUse};
use crate::wire::*;
use serde_json::{json, Map, Value};

/// Insert `value` only when it is a non-empty string.
fn put_non_empty(map: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), json!(value));
    }
}

fn line_range_json(ranges: &[LineRange]) -> Value {
    json!(ranges
        .iter()
        .map(|r| json!({"start": r.start, "end": r.end}))
        .collect::<Vec<_>>())
}

impl ToolMapper {
    /// Tool name a wire call will be reported under.
    pub fn tool_name(&self, call: &ToolCall) -> String {
        match &call.tool {
            Some(ToolCallKind::ApplyFileDiffs(diffs)) => apply_diffs_name(diffs).to_string(),
            Some(ToolCallKind::CreateDocuments(_)) => self.document_write_tool().to_string(),
            Some(ToolCallKind::CallMcpTool(mcp)) => external_name(mcp).to_string(),
            Some(kind) => super::tool_name_for(kind.tool_type()).to_string(),
            None => "unknown".to_string(),
        }
    }

    /// Rebuild the `tool_use` block for an upstream tool call.
    ///
    /// `None` when the call carries nothing actionable: no populated variant,
    /// an empty file list, or an `apply_file_diffs` with every list empty.
    pub fn from_wire_tool_call(&self, call: &ToolCall) -> Option<ToolUse> {
        let kind = call.tool.as_ref()?;

        let (name, input) = match kind {
            ToolCallKind::RunShellCommand(cmd) => (BASH.to_string(), json!({"command": cmd.command})),
            ToolCallKind::ReadFiles(read) => {
                let file = read.files.first()?;
                let mut input = Map::new();
                input.insert("file_path".into(), json!(file.name));
                if let Some(range) = file.line_ranges.first() {
                    input.insert("offset".into(), json!(range.start));
                    input.insert("limit".into(), json!(range.end.saturating_sub(range.start)));
                }
                (READ.to_string(), Value::Object(input))
            }
            ToolCallKind::ApplyFileDiffs(diffs) => {
                let input = apply_diffs_input(diffs)?;
                (apply_diffs_name(diffs).to_string(), input)
            }
            ToolCallKind::Grep(grep) => {
                let mut input = Map::new();
                input.insert(
                    "pattern".into(),
                    json!(grep.queries.first().map(String::as_str).unwrap_or_default()),
                );
                put_non_empty(&mut input, "path", &grep.path);
                (GREP.to_string(), Value::Object(input))
            }
            ToolCallKind::FileGlobV2(glob) => (GLOB.to_string(), glob_input(&glob.patterns, &glob.search_dir)),
            ToolCallKind::FileGlob(glob) => (GLOB.to_string(), glob_input(&glob.patterns, &glob.path)),
            ToolCallKind::SearchCodebase(search) => {
                let mut input = Map::new();
                input.insert("query".into(), json!(search.query));
                if !search.path_filters.is_empty() {
                    input.insert("path_filters".into(), json!(search.path_filters));
                }
                put_non_empty(&mut input, "codebase_path", &search.codebase_path);
                (SEARCH_CODEBASE.to_string(), Value::Object(input))
            }
            ToolCallKind::Subagent(subagent) => {
                let mut input = match serde_json::from_str::<Value>(&subagent.payload) {
                    Ok(Value::Object(map)) => map,
                    _ => {
                        let mut map = Map::new();
                        map.insert("prompt".into(), json!(subagent.payload));
                        map
                    }
                };
                if !subagent.task_id.is_empty() && subagent.task_id != call.tool_call_id {
                    input.insert("task_id".into(), json!(subagent.task_id));
                }
                (TASK.to_string(), Value::Object(input))
            }
            ToolCallKind::ReadDocuments(read) => {
                let documents: Vec<Value> = read
                    .documents
                    .iter()
                    .map(|doc| {
                        json!({
                            "document_id": doc.document_id,
                            "line_ranges": line_range_json(&doc.line_ranges),
                        })
                    })
                    .collect();
                (READ_DOCUMENTS.to_string(), json!({"documents": documents}))
            }
            ToolCallKind::EditDocuments(edit) => {
                let diffs: Vec<Value> = edit
                    .diffs
                    .iter()
                    .map(|diff| {
                        json!({
                            "document_id": diff.document_id,
                            "old_string": diff.search,
                            "new_string": diff.replace,
                        })
                    })
                    .collect();
                (EDIT_DOCUMENTS.to_string(), json!({"diffs": diffs}))
            }
            ToolCallKind::CreateDocuments(create) => {
                let first = create.new_documents.first()?;
                let name = self.document_write_tool().to_string();
                let input = if name == WRITE {
                    json!({
                        "file_path": extract_path_from_title(&first.title),
                        "content": first.content,
                    })
                } else {
                    let documents: Vec<Value> = create
                        .new_documents
                        .iter()
                        .map(|doc| json!({"title": doc.title, "content": doc.content}))
                        .collect();
                    json!({"documents": documents})
                };
                (name, input)
            }
            ToolCallKind::WriteToLongRunningShellCommand(write) => (
                WRITE_TO_SHELL.to_string(),
                json!({
                    "input": String::from_utf8_lossy(&write.input),
                    "command_id": write.command_id,
                    "mode": write.mode.map(|m| m.name()).unwrap_or("line"),
                }),
            ),
            ToolCallKind::ReadShellCommandOutput(read) => {
                let mut input = Map::new();
                input.insert("command_id".into(), json!(read.command_id));
                match &read.delay {
                    Some(ShellOutputDelay::Duration(d)) => {
                        if let Some(secs) = duration_secs(d) {
                            input.insert("duration".into(), json!(secs.round() as u64));
                        }
                    }
                    Some(ShellOutputDelay::OnCompletion(_)) => {
                        input.insert("wait_for_completion".into(), json!(true));
                    }
                    None => {}
                }
                (READ_SHELL_OUTPUT.to_string(), Value::Object(input))
            }
            ToolCallKind::SuggestPlan(plan) => {
                let tasks: Vec<Value> = plan
                    .proposed_tasks
                    .iter()
                    .map(|task| json!({"id": task.id, "description": task.description}))
                    .collect();
                (PLAN.to_string(), json!({"summary": plan.summary, "tasks": tasks}))
            }
            ToolCallKind::SuggestCreatePlan(_) => (PLAN.to_string(), json!({})),
            ToolCallKind::UseComputer(computer) => (
                COMPUTER.to_string(),
                json!({
                    "actions": from_wire_actions(&computer.actions),
                    "action_summary": computer.action_summary,
                }),
            ),
            ToolCallKind::RequestComputerUse(request) => (
                REQUEST_COMPUTER_USE.to_string(),
                json!({"task_summary": request.task_summary}),
            ),
            ToolCallKind::ReadMcpResource(resource) => {
                let mut input = Map::new();
                input.insert("uri".into(), json!(resource.uri));
                put_non_empty(&mut input, "server_id", &resource.server_id);
                (READ_MCP_RESOURCE.to_string(), Value::Object(input))
            }
            ToolCallKind::ReadSkill(skill) => {
                let mut input = Map::new();
                input.insert("skill_name".into(), json!(skill.skill_name));
                put_non_empty(&mut input, "skill_path", &skill.skill_path);
                (SKILL.to_string(), Value::Object(input))
            }
            ToolCallKind::OpenCodeReview(_) => (OPEN_CODE_REVIEW.to_string(), json!({})),
            ToolCallKind::InsertReviewComments(insert) => {
                let comments: Vec<Value> = insert
                    .comments
                    .iter()
                    .map(|c| {
                        let mut comment = Map::new();
                        comment.insert("id".into(), json!(c.comment_id));
                        comment.insert("author".into(), json!(c.author));
                        comment.insert("timestamp".into(), json!(c.last_modified_timestamp));
                        comment.insert("content".into(), json!(c.comment_body));
                        put_non_empty(&mut comment, "parent_id", &c.parent_comment_id);
                        if let Some(location) = &c.location {
                            if let Ok(value) = serde_json::to_value(location) {
                                comment.insert("location".into(), value);
                            }
                        }
                        Value::Object(comment)
                    })
                    .collect();
                (
                    INSERT_REVIEW_COMMENTS.to_string(),
                    json!({"repo_path": insert.repo_path, "comments": comments}),
                )
            }
            ToolCallKind::SuggestPrompt(prompt) => (
                SUGGEST_PROMPT.to_string(),
                json!({"prompt": prompt.prompt, "label": prompt.label}),
            ),
            ToolCallKind::SuggestNewConversation(suggest) => (
                SUGGEST_NEW_CONVERSATION.to_string(),
                json!({"message_id": suggest.message_id}),
            ),
            ToolCallKind::InitProject(_) => (INIT_PROJECT.to_string(), json!({})),
            ToolCallKind::CallMcpTool(mcp) => (
                external_name(mcp).to_string(),
                Value::Object(mcp.args.clone()),
            ),
        };

        Some(ToolUse {
            id: call.tool_call_id.clone(),
            name,
            input,
        })
    }
}

/// `new_files` wins over `diffs`/`v4a_updates`, which win over `deleted_files`.
fn apply_diffs_name(diffs: &ApplyFileDiffs) -> &'static str {
    if !diffs.new_files.is_empty() {
        WRITE
    } else if !diffs.diffs.is_empty() || !diffs.v4a_updates.is_empty() {
        EDIT
    } else if !diffs.deleted_files.is_empty() {
        DELETE
    } else {
        WRITE
    }
}

fn apply_diffs_input(diffs: &ApplyFileDiffs) -> Option<Value> {
    if let Some(file) = diffs.new_files.first() {
        return Some(json!({"file_path": file.file_path, "content": file.content}));
    }
    if let Some(diff) = diffs.diffs.first() {
        return Some(edit_input(&diff.file_path, &diff.search, &diff.replace));
    }
    if let Some(update) = diffs.v4a_updates.first() {
        let (old, new) = update
            .hunks
            .first()
            .map(|h| (h.old.as_str(), h.new.as_str()))
            .unwrap_or_default();
        return Some(edit_input(&update.file_path, old, new));
    }
    diffs
        .deleted_files
        .first()
        .map(|file| json!({"file_path": file.file_path}))
}

fn edit_input(file_path: &str, search: &str, replace: &str) -> Value {
    json!({
        "file_path": file_path,
        "old_string": clean_edit_text(search),
        "new_string": clean_edit_text(replace),
    })
}

fn glob_input(patterns: &[String], dir: &str) -> Value {
    let mut input = Map::new();
    input.insert(
        "pattern".into(),
        json!(patterns.first().map(String::as_str).unwrap_or_default()),
    );
    put_non_empty(&mut input, "path", dir);
    Value::Object(input)
}

fn external_name(mcp: &CallMcpTool) -> &str {
    if mcp.name.is_empty() {
        UNKNOWN_MCP_TOOL
    } else {
        &mcp.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(tool: ToolCallKind) -> ToolCall {
        ToolCall {
            tool_call_id: "call_1".to_string(),
            tool: Some(tool),
        }
    }

    #[test]
    fn test_apply_file_diffs_priority() {
        let mapper = ToolMapper::new();
        let both = ApplyFileDiffs {
            new_files: vec![NewFile {
                file_path: "a.txt".into(),
                content: "hi".into(),
            }],
            deleted_files: vec![DeletedFile {
                file_path: "b.txt".into(),
            }],
            ..Default::default()
        };
        let tool_use = mapper
            .from_wire_tool_call(&call(ToolCallKind::ApplyFileDiffs(both)))
            .unwrap();
        assert_eq!(tool_use.name, "Write");

        let delete_only = ApplyFileDiffs {
            deleted_files: vec![DeletedFile {
                file_path: "b.txt".into(),
            }],
            ..Default::default()
        };
        let tool_use = mapper
            .from_wire_tool_call(&call(ToolCallKind::ApplyFileDiffs(delete_only)))
            .unwrap();
        assert_eq!(tool_use.name, "Delete");
        assert_eq!(tool_use.input, json!({"file_path": "b.txt"}));

        assert!(mapper
            .from_wire_tool_call(&call(ToolCallKind::ApplyFileDiffs(ApplyFileDiffs::default())))
            .is_none());
    }

    #[test]
    fn test_edit_is_cleaned_up() {
        let mapper = ToolMapper::new();
        let diffs = ApplyFileDiffs {
            diffs: vec![FileDiff {
                file_path: "src/lib.rs".into(),
                search: "12| fn a() {\n13|     b();\n14| }".into(),
                replace: "fn a() {\n    c();\n}".into(),
            }],
            ..Default::default()
        };
        let tool_use = mapper
            .from_wire_tool_call(&call(ToolCallKind::ApplyFileDiffs(diffs)))
            .unwrap();
        assert_eq!(tool_use.name, "Edit");
        assert_eq!(tool_use.input["old_string"], json!("fn a() {\n  b();\n}"));
        assert_eq!(tool_use.input["new_string"], json!("fn a() {\n  c();\n}"));
    }

    #[test]
    fn test_v4a_update_becomes_edit() {
        let mapper = ToolMapper::new();
        let diffs = ApplyFileDiffs {
            v4a_updates: vec![V4AFileUpdate {
                file_path: "main.py".into(),
                hunks: vec![V4AHunk {
                    context: String::new(),
                    old: "x = 1".into(),
                    new: "x = 2".into(),
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let tool_use = mapper
            .from_wire_tool_call(&call(ToolCallKind::ApplyFileDiffs(diffs)))
            .unwrap();
        assert_eq!(
            tool_use.input,
            json!({"file_path": "main.py", "old_string": "x = 1", "new_string": "x = 2"})
        );
    }

    #[test]
    fn test_create_documents_remap_is_configurable() {
        let create = ToolCallKind::CreateDocuments(CreateDocuments {
            new_documents: vec![NewDocument {
                title: "Create file notes/todo.md".into(),
                content: "- [ ] ship".into(),
            }],
        });

        let tool_use = ToolMapper::new().from_wire_tool_call(&call(create.clone())).unwrap();
        assert_eq!(tool_use.name, "Write");
        assert_eq!(
            tool_use.input,
            json!({"file_path": "notes/todo.md", "content": "- [ ] ship"})
        );

        let mapper = ToolMapper::new().with_document_write_tool("CreateDocuments");
        let tool_use = mapper.from_wire_tool_call(&call(create.clone())).unwrap();
        assert_eq!(tool_use.name, "CreateDocuments");
        assert_eq!(mapper.tool_name(&call(create)), "CreateDocuments");
    }

    #[test]
    fn test_subagent_payload_fallback() {
        let mapper = ToolMapper::new();
        let subagent = ToolCallKind::Subagent(Subagent {
            task_id: "task-7".into(),
            payload: "look around".into(),
            metadata: None,
        });
        let tool_use = mapper.from_wire_tool_call(&call(subagent)).unwrap();
        assert_eq!(tool_use.name, "Task");
        assert_eq!(
            tool_use.input,
            json!({"prompt": "look around", "task_id": "task-7"})
        );
    }

    #[test]
    fn test_nameless_external_call() {
        let mapper = ToolMapper::new();
        let mcp = call(ToolCallKind::CallMcpTool(CallMcpTool::default()));
        assert_eq!(mapper.tool_name(&mcp), "mcp__unknown");
        assert_eq!(mapper.from_wire_tool_call(&mcp).unwrap().name, "mcp__unknown");
        assert!(mapper.from_wire_tool_call(&ToolCall::default()).is_none());
    }
}
