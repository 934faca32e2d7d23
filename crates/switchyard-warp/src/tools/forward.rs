//! `tool_use` / `tool_result` blocks to wire tool calls and results.

use super::computer::{screenshot_params, to_wire_actions};
use super::names::*;
use super::{str_field, string_list, string_or_empty, u32_field, ToolMapper, ToolResult, ToolUse};
use crate::wire::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

lazy_static! {
    static ref GREP_LINE: Regex = Regex::new(r"^(.+?):(\d+)[:-]").unwrap();
    static ref SEARCH_SUMMARY: Regex =
        Regex::new(r"^(?:Found \d+ (?:files?|matches?|lines?)|No (?:files|matches) found)").unwrap();
}

const DEFAULT_GLOB_MAX_MATCHES: u32 = 100;
const DEFAULT_GLOB_MAX_DEPTH: u32 = 10;

impl ToolMapper {
    /// Build the wire tool call for a `tool_use` block. Never fails: names
    /// without a bespoke mapping become a generic external-tool call.
    pub fn to_wire_tool_call(&self, tool_use: &ToolUse) -> ToolCall {
        let input = &tool_use.input;

        let tool = match tool_use.name.as_str() {
            BASH => {
                let command = string_or_empty(input, "command");
                ToolCallKind::RunShellCommand(RunShellCommand {
                    is_read_only: self.classifier().is_read_only(&command),
                    is_risky: self.classifier().is_risky(&command),
                    uses_pager: false,
                    wait_until_complete: input.get("timeout").is_none(),
                    command,
                })
            }
            READ => {
                let line_ranges = match (u32_field(input, "offset"), u32_field(input, "limit")) {
                    (Some(start), Some(limit)) if start > 0 && limit > 0 => vec![LineRange {
                        start,
                        end: start.saturating_add(limit),
                    }],
                    _ => Vec::new(),
                };
                ToolCallKind::ReadFiles(ReadFiles {
                    files: vec![FileToRead {
                        name: string_or_empty(input, "file_path"),
                        line_ranges,
                    }],
                })
            }
            WRITE => {
                let file_path = string_or_empty(input, "file_path");
                ToolCallKind::ApplyFileDiffs(ApplyFileDiffs {
                    summary: summary("Create", &file_path),
                    new_files: vec![NewFile {
                        content: string_or_empty(input, "content"),
                        file_path,
                    }],
                    ..Default::default()
                })
            }
            EDIT => {
                let file_path = string_or_empty(input, "file_path");
                ToolCallKind::ApplyFileDiffs(ApplyFileDiffs {
                    summary: summary("Edit", &file_path),
                    diffs: vec![FileDiff {
                        search: string_or_empty(input, "old_string"),
                        replace: string_or_empty(input, "new_string"),
                        file_path,
                    }],
                    ..Default::default()
                })
            }
            DELETE => {
                let file_path = string_or_empty(input, "file_path");
                ToolCallKind::ApplyFileDiffs(ApplyFileDiffs {
                    summary: summary("Delete", &file_path),
                    deleted_files: vec![DeletedFile { file_path }],
                    ..Default::default()
                })
            }
            GREP => ToolCallKind::Grep(Grep {
                queries: vec![string_or_empty(input, "pattern")],
                path: string_or_empty(input, "path"),
            }),
            GLOB => ToolCallKind::FileGlobV2(FileGlobV2 {
                patterns: vec![string_or_empty(input, "pattern")],
                search_dir: string_or_empty(input, "path"),
                max_matches: u32_field(input, "max_matches").unwrap_or(DEFAULT_GLOB_MAX_MATCHES),
                max_depth: u32_field(input, "max_depth").unwrap_or(DEFAULT_GLOB_MAX_DEPTH),
                min_depth: u32_field(input, "min_depth").unwrap_or(0),
            }),
            SEARCH_CODEBASE => ToolCallKind::SearchCodebase(SearchCodebase {
                query: string_or_empty(input, "query"),
                path_filters: string_list(input, "path_filters"),
                codebase_path: string_or_empty(input, "codebase_path"),
            }),
            TASK | SUBAGENT => ToolCallKind::Subagent(subagent(&tool_use.id, input)),
            READ_DOCUMENTS => ToolCallKind::ReadDocuments(ReadDocuments {
                documents: objects(input, "documents")
                    .map(|doc| DocumentToRead {
                        document_id: str_field(doc, "document_id")
                            .or_else(|| str_field(doc, "id"))
                            .unwrap_or_default(),
                        line_ranges: doc
                            .get("line_ranges")
                            .and_then(|v| serde_json::from_value(v.clone()).ok())
                            .unwrap_or_default(),
                    })
                    .collect(),
            }),
            EDIT_DOCUMENTS => ToolCallKind::EditDocuments(EditDocuments {
                diffs: objects(input, "diffs")
                    .map(|diff| DocumentDiff {
                        document_id: string_or_empty(diff, "document_id"),
                        search: str_field(diff, "search")
                            .or_else(|| str_field(diff, "old_string"))
                            .unwrap_or_default(),
                        replace: str_field(diff, "replace")
                            .or_else(|| str_field(diff, "new_string"))
                            .unwrap_or_default(),
                    })
                    .collect(),
            }),
            CREATE_DOCUMENTS => ToolCallKind::CreateDocuments(CreateDocuments {
                new_documents: objects(input, "documents")
                    .map(|doc| NewDocument {
                        content: string_or_empty(doc, "content"),
                        title: string_or_empty(doc, "title"),
                    })
                    .collect(),
            }),
            WRITE_TO_SHELL => {
                ToolCallKind::WriteToLongRunningShellCommand(WriteToLongRunningShellCommand {
                    input: string_or_empty(input, "input").into_bytes(),
                    command_id: string_or_empty(input, "command_id"),
                    mode: Some(ShellInputMode::from_name(
                        input.get("mode").and_then(Value::as_str).unwrap_or_default(),
                    )),
                })
            }
            READ_SHELL_OUTPUT => {
                let delay = match input.get("duration").and_then(Value::as_u64) {
                    Some(secs) => Some(ShellOutputDelay::Duration(duration_from_secs(secs))),
                    None if input.get("wait_for_completion").and_then(Value::as_bool) == Some(true) => {
                        Some(ShellOutputDelay::OnCompletion(Empty {}))
                    }
                    None => None,
                };
                ToolCallKind::ReadShellCommandOutput(ReadShellCommandOutput {
                    command_id: string_or_empty(input, "command_id"),
                    delay,
                })
            }
            PLAN | SUGGEST_PLAN => ToolCallKind::SuggestPlan(SuggestPlan {
                summary: string_or_empty(input, "summary"),
                proposed_tasks: objects(input, "tasks")
                    .map(|task| ProposedTask {
                        id: str_field(task, "id")
                            .filter(|id| !id.is_empty())
                            .unwrap_or_else(|| Uuid::new_v4().to_string()),
                        description: string_or_empty(task, "description"),
                    })
                    .collect(),
            }),
            COMPUTER | USE_COMPUTER => ToolCallKind::UseComputer(UseComputer {
                actions: to_wire_actions(input),
                action_summary: str_field(input, "action_summary")
                    .or_else(|| str_field(input, "action"))
                    .unwrap_or_default(),
                post_actions_screenshot_params: Some(screenshot_params(input)),
            }),
            REQUEST_COMPUTER_USE => ToolCallKind::RequestComputerUse(RequestComputerUse {
                task_summary: str_field(input, "task_summary")
                    .or_else(|| str_field(input, "task"))
                    .unwrap_or_default(),
                screenshot_params: Some(screenshot_params(input)),
            }),
            READ_MCP_RESOURCE => ToolCallKind::ReadMcpResource(ReadMcpResource {
                uri: string_or_empty(input, "uri"),
                server_id: string_or_empty(input, "server_id"),
            }),
            SKILL | READ_SKILL => ToolCallKind::ReadSkill(ReadSkill {
                skill_path: str_field(input, "skill_path")
                    .or_else(|| str_field(input, "path"))
                    .unwrap_or_default(),
                skill_name: str_field(input, "skill_name")
                    .or_else(|| str_field(input, "skill"))
                    .or_else(|| str_field(input, "name"))
                    .unwrap_or_default(),
            }),
            OPEN_CODE_REVIEW => ToolCallKind::OpenCodeReview(Empty {}),
            INSERT_REVIEW_COMMENTS => ToolCallKind::InsertReviewComments(InsertReviewComments {
                repo_path: string_or_empty(input, "repo_path"),
                comments: objects(input, "comments").map(review_comment).collect(),
            }),
            SUGGEST_PROMPT => ToolCallKind::SuggestPrompt(SuggestPrompt {
                prompt: string_or_empty(input, "prompt"),
                label: string_or_empty(input, "label"),
            }),
            SUGGEST_NEW_CONVERSATION => {
                ToolCallKind::SuggestNewConversation(SuggestNewConversation {
                    message_id: string_or_empty(input, "message_id"),
                })
            }
            INIT_PROJECT => ToolCallKind::InitProject(Empty {}),
            name => ToolCallKind::CallMcpTool(external_call(name, input)),
        };

        ToolCall {
            tool_call_id: tool_use.id.clone(),
            tool: Some(tool),
        }
    }

    /// Wrap a `tool_result` in the result shape of the tool that produced it.
    /// Unknown tool names use the generic external-tool result.
    pub fn to_wire_tool_result(&self, result: &ToolResult, tool_name: &str) -> ToolCallResult {
        let output = result.content.flatten();
        let failed = result.is_error;

        let kind = match tool_name {
            BASH => ToolResultKind::RunShellCommand(RunShellCommandResult {
                command: String::new(),
                result: Some(ShellOutcome::CommandFinished(ShellCommandFinished {
                    output,
                    exit_code: i32::from(failed),
                })),
            }),
            READ => ToolResultKind::ReadFiles(if failed {
                ReadFilesResult::Error(ToolError { message: output })
            } else {
                ReadFilesResult::TextFilesSuccess(FilesSuccess {
                    files: vec![FileContent {
                        content: output,
                        ..Default::default()
                    }],
                })
            }),
            WRITE | EDIT | DELETE => {
                ToolResultKind::ApplyFileDiffs(outcome(failed, output, |_| ApplyFileDiffsSuccess::default()))
            }
            GREP => ToolResultKind::Grep(outcome(failed, output, |text| GrepSuccess {
                matched_files: grep_matches(&text),
            })),
            GLOB => ToolResultKind::FileGlobV2(outcome(failed, output, |text| FileGlobSuccess {
                matched_files: output_lines(&text)
                    .map(|file_path| FileGlobMatch { file_path })
                    .collect(),
            })),
            SEARCH_CODEBASE => ToolResultKind::SearchCodebase(outcome(failed, output, |text| {
                FilesSuccess {
                    files: vec![FileContent {
                        content: text,
                        ..Default::default()
                    }],
                }
            })),
            TASK | SUBAGENT => ToolResultKind::Subagent(SubagentResult { payload: output }),
            READ_DOCUMENTS => ToolResultKind::ReadDocuments(outcome(failed, output, |text| {
                DocumentsSuccess {
                    documents: vec![DocumentContent {
                        content: text,
                        ..Default::default()
                    }],
                }
            })),
            EDIT_DOCUMENTS => {
                ToolResultKind::EditDocuments(outcome(failed, output, |_| DocumentsSuccess::default()))
            }
            CREATE_DOCUMENTS => {
                ToolResultKind::CreateDocuments(outcome(failed, output, |_| DocumentsSuccess::default()))
            }
            WRITE_TO_SHELL => ToolResultKind::WriteToLongRunningShellCommand(snapshot(output)),
            READ_SHELL_OUTPUT => ToolResultKind::ReadShellCommandOutput(snapshot(output)),
            PLAN | SUGGEST_PLAN => ToolResultKind::SuggestPlan(Decision::from_rejected(failed)),
            COMPUTER | USE_COMPUTER => {
                ToolResultKind::UseComputer(outcome(failed, output, |_| UseComputerSuccess::default()))
            }
            REQUEST_COMPUTER_USE => ToolResultKind::RequestComputerUse(if failed {
                Approval::Rejected(Empty {})
            } else {
                Approval::Approved(Empty {})
            }),
            READ_MCP_RESOURCE => ToolResultKind::ReadMcpResource(outcome(failed, output, |text| {
                ReadMcpResourceSuccess {
                    contents: vec![McpResourceContent::Text(TextResourceContent {
                        content: text,
                        ..Default::default()
                    })],
                }
            })),
            SKILL | READ_SKILL => ToolResultKind::ReadSkill(outcome(failed, output, |text| {
                ReadSkillSuccess {
                    content: Some(FileContent {
                        content: text,
                        ..Default::default()
                    }),
                }
            })),
            OPEN_CODE_REVIEW => ToolResultKind::OpenCodeReview(Empty {}),
            INSERT_REVIEW_COMMENTS => {
                ToolResultKind::InsertReviewComments(outcome(failed, output, |_| Empty {}))
            }
            SUGGEST_PROMPT => ToolResultKind::SuggestPrompt(Decision::from_rejected(failed)),
            SUGGEST_NEW_CONVERSATION => {
                ToolResultKind::SuggestNewConversation(Decision::from_rejected(failed))
            }
            INIT_PROJECT => ToolResultKind::InitProject(Decision::from_rejected(failed)),
            _ => ToolResultKind::CallMcpTool(outcome(failed, output, |text| CallMcpToolSuccess {
                results: vec![McpToolResultContent::Text(McpTextContent { text })],
            })),
        };

        ToolCallResult {
            tool_call_id: result.tool_use_id.clone(),
            result: Some(kind),
        }
    }
}

fn summary(verb: &str, file_path: &str) -> String {
    if file_path.is_empty() {
        format!("{} file", verb)
    } else {
        format!("{} {}", verb, file_path)
    }
}

fn objects<'a>(input: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    input
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|v| v.is_object())
}

fn subagent(call_id: &str, input: &Value) -> Subagent {
    let metadata = match input.get("subagent_type").and_then(Value::as_str) {
        Some("research") => Some(SubagentMetadata::Research(Empty {})),
        Some("advice") => Some(SubagentMetadata::Advice(Empty {})),
        Some("computer_use") => Some(SubagentMetadata::ComputerUse(Empty {})),
        Some("summarization") => Some(SubagentMetadata::Summarization(Empty {})),
        _ => str_field(input, "command_id")
            .map(|command_id| SubagentMetadata::Cli(CliSubagent { command_id })),
    };

    Subagent {
        task_id: str_field(input, "task_id")
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| call_id.to_string()),
        payload: input.to_string(),
        metadata,
    }
}

fn review_comment(comment: &Value) -> ReviewComment {
    ReviewComment {
        comment_id: str_field(comment, "id")
            .or_else(|| str_field(comment, "comment_id"))
            .unwrap_or_default(),
        author: string_or_empty(comment, "author"),
        last_modified_timestamp: string_or_empty(comment, "timestamp"),
        comment_body: str_field(comment, "body")
            .or_else(|| str_field(comment, "content"))
            .unwrap_or_default(),
        parent_comment_id: string_or_empty(comment, "parent_id"),
        location: comment
            .get("location")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    }
}

fn external_call(name: &str, input: &Value) -> CallMcpTool {
    let args = match input {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("input".to_string(), other.clone());
            map
        }
    };
    let server_id = if name.starts_with(MCP_PREFIX) {
        string_or_empty(input, "server_id")
    } else {
        String::new()
    };

    CallMcpTool {
        name: name.to_string(),
        args,
        server_id,
    }
}

fn outcome<S>(failed: bool, output: String, success: impl FnOnce(String) -> S) -> Outcome<S> {
    if failed {
        Outcome::error(output)
    } else {
        Outcome::Success(success(output))
    }
}

fn snapshot(output: String) -> ShellOutputResult {
    ShellOutputResult {
        command: String::new(),
        result: Some(ShellOutcome::LongRunningCommandSnapshot(
            LongRunningShellCommandSnapshot {
                output,
                ..Default::default()
            },
        )),
    }
}

/// Non-empty output lines, minus the `Found N files` style summaries search
/// tools print around their listings.
fn output_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .filter(|line| !SEARCH_SUMMARY.is_match(line))
        .map(str::to_string)
}

/// Group `path:line:text` grep output by file, in first-seen order. Lines
/// without a line number are taken as bare file paths.
fn grep_matches(text: &str) -> Vec<GrepFileMatch> {
    let mut matches: Vec<GrepFileMatch> = Vec::new();
    for line in output_lines(text) {
        let (path, line_number) = match GREP_LINE.captures(&line) {
            Some(caps) => (caps[1].to_string(), caps[2].parse::<u32>().ok()),
            None => (line.clone(), None),
        };
        let entry = match matches.iter().position(|m| m.file_path == path) {
            Some(i) => &mut matches[i],
            None => {
                matches.push(GrepFileMatch {
                    file_path: path,
                    matched_lines: Vec::new(),
                });
                let last = matches.len() - 1;
                &mut matches[last]
            }
        };
        if let Some(n) = line_number {
            entry.matched_lines.push(n);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::CommandClassifier;
    use serde_json::json;
    use switchyard_protocol::ToolResultContent;

    fn result(content: &str, is_error: bool) -> ToolResult {
        ToolResult {
            tool_use_id: "t1".to_string(),
            content: ToolResultContent::String(content.to_string()),
            is_error,
        }
    }

    #[test]
    fn test_bash_flags_come_from_classifier() {
        let mapper = ToolMapper::new();
        let call = mapper.to_wire_tool_call(&ToolUse::new("t1", "Bash", json!({"command": "rm -rf /tmp/x"})));
        match call.tool {
            Some(ToolCallKind::RunShellCommand(cmd)) => {
                assert!(!cmd.is_read_only);
                assert!(cmd.is_risky);
                assert!(cmd.wait_until_complete);
            }
            other => panic!("unexpected tool: {:?}", other),
        }
    }

    #[test]
    fn test_classifier_is_pluggable() {
        struct Paranoid;
        impl CommandClassifier for Paranoid {
            fn is_read_only(&self, _: &str) -> bool {
                false
            }
            fn is_risky(&self, _: &str) -> bool {
                true
            }
        }

        let mapper = ToolMapper::new().with_classifier(Paranoid);
        let call = mapper.to_wire_tool_call(&ToolUse::new("t1", "Bash", json!({"command": "ls"})));
        let Some(ToolCallKind::RunShellCommand(cmd)) = call.tool else {
            panic!("expected shell command");
        };
        assert!(!cmd.is_read_only && cmd.is_risky);
    }

    #[test]
    fn test_unknown_tool_falls_back_to_external_call() {
        let mapper = ToolMapper::new();
        let call = mapper.to_wire_tool_call(&ToolUse::new(
            "t9",
            "mcp__github__create_issue",
            json!({"title": "bug", "server_id": "gh"}),
        ));
        let Some(ToolCallKind::CallMcpTool(mcp)) = call.tool else {
            panic!("expected external call");
        };
        assert_eq!(mcp.name, "mcp__github__create_issue");
        assert_eq!(mcp.server_id, "gh");
        assert_eq!(mcp.args["title"], json!("bug"));

        let call = mapper.to_wire_tool_call(&ToolUse::new("t10", "NotebookEdit", json!("raw")));
        let Some(ToolCallKind::CallMcpTool(mcp)) = call.tool else {
            panic!("expected external call");
        };
        assert_eq!(mcp.args["input"], json!("raw"));
        assert!(mcp.server_id.is_empty());
    }

    #[test]
    fn test_bash_result_carries_output_and_exit_code() {
        let mapper = ToolMapper::new();
        let wire = mapper.to_wire_tool_result(&result("file1\nfile2", false), "Bash");
        assert_eq!(wire.tool_call_id, "t1");
        assert_eq!(
            wire.result,
            Some(ToolResultKind::RunShellCommand(RunShellCommandResult {
                command: String::new(),
                result: Some(ShellOutcome::CommandFinished(ShellCommandFinished {
                    output: "file1\nfile2".to_string(),
                    exit_code: 0,
                })),
            }))
        );

        let wire = mapper.to_wire_tool_result(&result("boom", true), "Bash");
        let Some(ToolResultKind::RunShellCommand(shell)) = wire.result else {
            panic!("expected shell result");
        };
        assert!(matches!(
            shell.result,
            Some(ShellOutcome::CommandFinished(ShellCommandFinished { exit_code: 1, .. }))
        ));
    }

    #[test]
    fn test_error_flag_selects_error_variant() {
        let mapper = ToolMapper::new();
        let wire = mapper.to_wire_tool_result(&result("no such file", true), "Read");
        assert_eq!(
            wire.result,
            Some(ToolResultKind::ReadFiles(ReadFilesResult::Error(ToolError {
                message: "no such file".to_string()
            })))
        );

        let wire = mapper.to_wire_tool_result(&result("denied", true), "Plan");
        assert_eq!(
            wire.result,
            Some(ToolResultKind::SuggestPlan(Decision::Rejected(Empty {})))
        );
    }

    #[test]
    fn test_grep_and_glob_results_list_files() {
        let mapper = ToolMapper::new();
        let wire = mapper.to_wire_tool_result(
            &result("src/a.rs:3:fn a()\nsrc/a.rs:9:fn b()\nsrc/b.rs:1:use a;", false),
            "Grep",
        );
        let Some(ToolResultKind::Grep(Outcome::Success(grep))) = wire.result else {
            panic!("expected grep success");
        };
        assert_eq!(grep.matched_files.len(), 2);
        assert_eq!(grep.matched_files[0].matched_lines, vec![3, 9]);

        let wire = mapper.to_wire_tool_result(&result("Found 2 files\nsrc/a.rs\nsrc/b.rs\n", false), "Glob");
        let Some(ToolResultKind::FileGlobV2(Outcome::Success(glob))) = wire.result else {
            panic!("expected glob success");
        };
        let paths: Vec<_> = glob.matched_files.iter().map(|m| m.file_path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn test_unknown_tool_result_is_external() {
        let mapper = ToolMapper::new();
        let parts = ToolResult {
            tool_use_id: "t2".to_string(),
            content: ToolResultContent::Parts(vec![
                json!({"type": "text", "text": "one"}),
                json!({"type": "text", "text": "two"}),
            ]),
            is_error: false,
        };
        let wire = mapper.to_wire_tool_result(&parts, "TodoWrite");
        assert_eq!(
            wire.result,
            Some(ToolResultKind::CallMcpTool(Outcome::Success(CallMcpToolSuccess {
                results: vec![McpToolResultContent::Text(McpTextContent {
                    text: "one\ntwo".to_string()
                })],
            })))
        );
    }
}
