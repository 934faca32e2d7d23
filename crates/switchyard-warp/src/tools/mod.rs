//! Tool-call mapping between Anthropic tool blocks and Warp tool variants.
//!
//! Forward (`to_wire_*`) builds [`ToolCall`](crate::wire::ToolCall)s and
//! [`ToolCallResult`](crate::wire::ToolCallResult)s from `tool_use` /
//! `tool_result` blocks; reverse (`from_wire_tool_call`) rebuilds `tool_use`
//! blocks from upstream tool calls. Unknown names never fail: they travel as
//! a generic external-tool call.

pub mod classify;
mod computer;
mod forward;
pub mod normalize;
mod reverse;

pub use classify::{is_read_only_command, is_risky_command, CommandClassifier, HeuristicClassifier};

use crate::wire::ToolType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use switchyard_protocol::{Tool, ToolResultContent};

/// Anthropic-side tool names.
pub mod names {
    pub const BASH: &str = "Bash";
    pub const READ: &str = "Read";
    pub const WRITE: &str = "Write";
    pub const EDIT: &str = "Edit";
    pub const DELETE: &str = "Delete";
    pub const GREP: &str = "Grep";
    pub const GLOB: &str = "Glob";
    pub const SEARCH_CODEBASE: &str = "SearchCodebase";
    pub const TASK: &str = "Task";
    pub const SUBAGENT: &str = "Subagent";
    pub const READ_DOCUMENTS: &str = "ReadDocuments";
    pub const EDIT_DOCUMENTS: &str = "EditDocuments";
    pub const CREATE_DOCUMENTS: &str = "CreateDocuments";
    pub const WRITE_TO_SHELL: &str = "WriteToShell";
    pub const READ_SHELL_OUTPUT: &str = "ReadShellOutput";
    pub const PLAN: &str = "Plan";
    pub const SUGGEST_PLAN: &str = "SuggestPlan";
    pub const COMPUTER: &str = "computer";
    pub const USE_COMPUTER: &str = "UseComputer";
    pub const REQUEST_COMPUTER_USE: &str = "RequestComputerUse";
    pub const READ_MCP_RESOURCE: &str = "ReadMCPResource";
    pub const CALL_MCP_TOOL: &str = "CallMCPTool";
    pub const SKILL: &str = "Skill";
    pub const READ_SKILL: &str = "ReadSkill";
    pub const OPEN_CODE_REVIEW: &str = "OpenCodeReview";
    pub const INSERT_REVIEW_COMMENTS: &str = "InsertReviewComments";
    pub const SUGGEST_PROMPT: &str = "SuggestPrompt";
    pub const SUGGEST_NEW_CONVERSATION: &str = "SuggestNewConversation";
    pub const INIT_PROJECT: &str = "InitProject";

    /// Namespace prefix of MCP-provided tools (`mcp__server__tool`).
    pub const MCP_PREFIX: &str = "mcp__";
    /// Name used when an external call arrives without one.
    pub const UNKNOWN_MCP_TOOL: &str = "mcp__unknown";
}

/// Tools advertised when the request declares none.
pub const DEFAULT_SUPPORTED_TOOLS: &[ToolType] = &[
    ToolType::RunShellCommand,
    ToolType::ReadFiles,
    ToolType::ApplyFileDiffs,
    ToolType::Grep,
    ToolType::FileGlobV2,
];

/// An Anthropic `tool_use` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolUse {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// An Anthropic `tool_result` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: ToolResultContent,
    pub is_error: bool,
}

/// Wire tool type a declared tool name maps to, if any.
pub fn tool_type_for(name: &str) -> Option<ToolType> {
    use names::*;

    let tool_type = match name {
        BASH => ToolType::RunShellCommand,
        READ => ToolType::ReadFiles,
        WRITE | EDIT | DELETE => ToolType::ApplyFileDiffs,
        GREP => ToolType::Grep,
        GLOB => ToolType::FileGlobV2,
        SEARCH_CODEBASE => ToolType::SearchCodebase,
        "WebFetch" | "WebSearch" | "web_search" | "TodoWrite" | "TodoRead" | CALL_MCP_TOOL => {
            ToolType::CallMcpTool
        }
        TASK | SUBAGENT => ToolType::Subagent,
        READ_DOCUMENTS => ToolType::ReadDocuments,
        EDIT_DOCUMENTS => ToolType::EditDocuments,
        CREATE_DOCUMENTS => ToolType::CreateDocuments,
        WRITE_TO_SHELL => ToolType::WriteToLongRunningShellCommand,
        READ_SHELL_OUTPUT => ToolType::ReadShellCommandOutput,
        PLAN | SUGGEST_PLAN => ToolType::SuggestPlan,
        COMPUTER | USE_COMPUTER => ToolType::UseComputer,
        REQUEST_COMPUTER_USE => ToolType::RequestComputerUse,
        READ_MCP_RESOURCE => ToolType::ReadMcpResource,
        SKILL | READ_SKILL => ToolType::ReadSkill,
        OPEN_CODE_REVIEW => ToolType::OpenCodeReview,
        INSERT_REVIEW_COMMENTS => ToolType::InsertReviewComments,
        SUGGEST_PROMPT => ToolType::SuggestPrompt,
        SUGGEST_NEW_CONVERSATION => ToolType::SuggestNewConversation,
        INIT_PROJECT => ToolType::InitProject,
        other if other.starts_with(MCP_PREFIX) => ToolType::CallMcpTool,
        _ => return None,
    };
    Some(tool_type)
}

/// Anthropic tool name reported for a wire tool type.
pub fn tool_name_for(tool_type: ToolType) -> &'static str {
    use names::*;

    match tool_type {
        ToolType::RunShellCommand => BASH,
        ToolType::SearchCodebase => SEARCH_CODEBASE,
        ToolType::ReadFiles => READ,
        ToolType::ApplyFileDiffs => EDIT,
        ToolType::SuggestPlan | ToolType::SuggestCreatePlan => PLAN,
        ToolType::Grep => GREP,
        ToolType::FileGlob | ToolType::FileGlobV2 => GLOB,
        ToolType::ReadMcpResource => READ_MCP_RESOURCE,
        ToolType::CallMcpTool => CALL_MCP_TOOL,
        ToolType::WriteToLongRunningShellCommand => WRITE_TO_SHELL,
        ToolType::SuggestNewConversation => SUGGEST_NEW_CONVERSATION,
        ToolType::SuggestPrompt => SUGGEST_PROMPT,
        ToolType::OpenCodeReview => OPEN_CODE_REVIEW,
        ToolType::InitProject => INIT_PROJECT,
        ToolType::Subagent => TASK,
        ToolType::ReadDocuments => READ_DOCUMENTS,
        ToolType::EditDocuments => EDIT_DOCUMENTS,
        ToolType::CreateDocuments => WRITE,
        ToolType::ReadShellCommandOutput => READ_SHELL_OUTPUT,
        ToolType::UseComputer => COMPUTER,
        ToolType::InsertReviewComments => INSERT_REVIEW_COMMENTS,
        ToolType::ReadSkill => SKILL,
        ToolType::RequestComputerUse => REQUEST_COMPUTER_USE,
    }
}

/// Reduce declared tools to the wire tool types to advertise.
///
/// No declarations means [`DEFAULT_SUPPORTED_TOOLS`]. Duplicates collapse in
/// first-seen order; names with no wire counterpart are left out.
pub fn supported_wire_tools(tools: Option<&[Tool]>) -> Vec<ToolType> {
    let tools = match tools {
        Some(tools) if !tools.is_empty() => tools,
        _ => return DEFAULT_SUPPORTED_TOOLS.to_vec(),
    };

    let mut supported = Vec::new();
    for tool in tools {
        if let Some(tool_type) = tool_type_for(&tool.name) {
            if !supported.contains(&tool_type) {
                supported.push(tool_type);
            }
        }
    }
    supported
}

/// Bidirectional tool mapper.
#[derive(Clone)]
pub struct ToolMapper {
    classifier: Arc<dyn CommandClassifier>,
    document_write_tool: String,
}

impl std::fmt::Debug for ToolMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolMapper")
            .field("document_write_tool", &self.document_write_tool)
            .finish_non_exhaustive()
    }
}

impl Default for ToolMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolMapper {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(HeuristicClassifier),
            document_write_tool: names::WRITE.to_string(),
        }
    }

    /// Replace the shell command classifier.
    pub fn with_classifier(mut self, classifier: impl CommandClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Tool name upstream `create_documents` calls are reported as.
    ///
    /// Defaults to `Write`. Set it to `CreateDocuments` to keep the document
    /// list shape instead of collapsing to a single file write.
    pub fn with_document_write_tool(mut self, name: impl Into<String>) -> Self {
        self.document_write_tool = name.into();
        self
    }

    pub fn classifier(&self) -> &dyn CommandClassifier {
        self.classifier.as_ref()
    }

    pub fn document_write_tool(&self) -> &str {
        &self.document_write_tool
    }
}

// Small accessors over loosely-typed tool input.

pub(crate) fn str_field(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn string_or_empty(input: &Value, key: &str) -> String {
    str_field(input, key).unwrap_or_default()
}

pub(crate) fn u32_field(input: &Value, key: &str) -> Option<u32> {
    input
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn string_list(input: &Value, key: &str) -> Vec<String> {
    match input.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            description: None,
            input_schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn test_supported_tools_default_when_none_declared() {
        assert_eq!(supported_wire_tools(None), DEFAULT_SUPPORTED_TOOLS.to_vec());
        assert_eq!(supported_wire_tools(Some(&[])), DEFAULT_SUPPORTED_TOOLS.to_vec());
    }

    #[test]
    fn test_supported_tools_collapse_and_drop_unknown() {
        let tools = [
            tool("Write"),
            tool("Edit"),
            tool("mcp__github__create_issue"),
            tool("TodoWrite"),
            tool("NotebookEdit"),
            tool("Bash"),
        ];
        assert_eq!(
            supported_wire_tools(Some(&tools)),
            vec![
                ToolType::ApplyFileDiffs,
                ToolType::CallMcpTool,
                ToolType::RunShellCommand
            ]
        );
    }

    #[test]
    fn test_tool_name_lookup() {
        assert_eq!(tool_name_for(ToolType::FileGlobV2), "Glob");
        assert_eq!(tool_name_for(ToolType::CreateDocuments), "Write");
        assert_eq!(tool_type_for("Skill"), Some(ToolType::ReadSkill));
        assert_eq!(tool_type_for("NotebookEdit"), None);
    }
}
