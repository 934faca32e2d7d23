//! `ToolCallResult` and its per-tool result shapes.

use super::task::{DocumentContent, FileContent, RawImage};
use super::tool_call::Coordinates;
use super::Empty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    #[serde(flatten)]
    pub result: Option<ToolResultKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultKind {
    RunShellCommand(RunShellCommandResult),
    SearchCodebase(Outcome<FilesSuccess>),
    ReadFiles(ReadFilesResult),
    ApplyFileDiffs(Outcome<ApplyFileDiffsSuccess>),
    SuggestPlan(Decision),
    SuggestCreatePlan(Decision),
    Grep(Outcome<GrepSuccess>),
    FileGlob(Outcome<FileGlobSuccess>),
    ReadMcpResource(Outcome<ReadMcpResourceSuccess>),
    CallMcpTool(Outcome<CallMcpToolSuccess>),
    WriteToLongRunningShellCommand(ShellOutputResult),
    SuggestNewConversation(Decision),
    FileGlobV2(Outcome<FileGlobSuccess>),
    SuggestPrompt(Decision),
    OpenCodeReview(Empty),
    InitProject(Decision),
    Subagent(SubagentResult),
    ReadDocuments(Outcome<DocumentsSuccess>),
    EditDocuments(Outcome<DocumentsSuccess>),
    CreateDocuments(Outcome<DocumentsSuccess>),
    ReadShellCommandOutput(ShellOutputResult),
    UseComputer(Outcome<UseComputerSuccess>),
    InsertReviewComments(Outcome<Empty>),
    ReadSkill(Outcome<ReadSkillSuccess>),
    RequestComputerUse(Approval),
}

/// Success-or-error result used by most tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<S> {
    Success(S),
    Error(ToolError),
}

impl<S> Outcome<S> {
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error(ToolError {
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolError {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted(Empty),
    Rejected(Empty),
}

impl Decision {
    pub fn from_rejected(rejected: bool) -> Self {
        if rejected {
            Decision::Rejected(Empty {})
        } else {
            Decision::Accepted(Empty {})
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    Approved(Empty),
    Rejected(Empty),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellCommandFinished {
    pub output: String,
    pub exit_code: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongRunningShellCommandSnapshot {
    pub command_id: String,
    pub output: String,
    pub is_alt_screen_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellOutcome {
    CommandFinished(ShellCommandFinished),
    LongRunningCommandSnapshot(LongRunningShellCommandSnapshot),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunShellCommandResult {
    pub command: String,
    #[serde(flatten)]
    pub result: Option<ShellOutcome>,
}

/// Result of writing to, or reading from, a long-running command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellOutputResult {
    pub command: String,
    #[serde(flatten)]
    pub result: Option<ShellOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFilesResult {
    TextFilesSuccess(FilesSuccess),
    Error(ToolError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesSuccess {
    pub files: Vec<FileContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyFileDiffsSuccess {
    pub updated_files_v2: Vec<FileContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrepFileMatch {
    pub file_path: String,
    pub matched_lines: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrepSuccess {
    pub matched_files: Vec<GrepFileMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGlobMatch {
    pub file_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGlobSuccess {
    pub matched_files: Vec<FileGlobMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubagentResult {
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsSuccess {
    pub documents: Vec<DocumentContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UseComputerSuccess {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<RawImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_position: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextResourceContent {
    pub uri: String,
    pub content: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpResourceContent {
    Text(TextResourceContent),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadMcpResourceSuccess {
    pub contents: Vec<McpResourceContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadSkillSuccess {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<FileContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpTextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpToolResultContent {
    Text(McpTextContent),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallMcpToolSuccess {
    pub results: Vec<McpToolResultContent>,
}
