//! `ToolCall` and its per-tool payloads.

use super::task::{LineRange, ReviewComment};
use super::tool_type::ToolType;
use super::Empty;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCall {
    pub tool_call_id: String,
    #[serde(flatten)]
    pub tool: Option<ToolCallKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallKind {
    RunShellCommand(RunShellCommand),
    SearchCodebase(SearchCodebase),
    ReadFiles(ReadFiles),
    ApplyFileDiffs(ApplyFileDiffs),
    SuggestPlan(SuggestPlan),
    SuggestCreatePlan(Empty),
    Grep(Grep),
    FileGlob(FileGlob),
    ReadMcpResource(ReadMcpResource),
    CallMcpTool(CallMcpTool),
    WriteToLongRunningShellCommand(WriteToLongRunningShellCommand),
    SuggestNewConversation(SuggestNewConversation),
    FileGlobV2(FileGlobV2),
    SuggestPrompt(SuggestPrompt),
    OpenCodeReview(Empty),
    InitProject(Empty),
    Subagent(Subagent),
    ReadDocuments(ReadDocuments),
    EditDocuments(EditDocuments),
    CreateDocuments(CreateDocuments),
    ReadShellCommandOutput(ReadShellCommandOutput),
    UseComputer(UseComputer),
    InsertReviewComments(InsertReviewComments),
    ReadSkill(ReadSkill),
    RequestComputerUse(RequestComputerUse),
}

impl ToolCallKind {
    pub fn tool_type(&self) -> ToolType {
        match self {
            ToolCallKind::RunShellCommand(_) => ToolType::RunShellCommand,
            ToolCallKind::SearchCodebase(_) => ToolType::SearchCodebase,
            ToolCallKind::ReadFiles(_) => ToolType::ReadFiles,
            ToolCallKind::ApplyFileDiffs(_) => ToolType::ApplyFileDiffs,
            ToolCallKind::SuggestPlan(_) => ToolType::SuggestPlan,
            ToolCallKind::SuggestCreatePlan(_) => ToolType::SuggestCreatePlan,
            ToolCallKind::Grep(_) => ToolType::Grep,
            ToolCallKind::FileGlob(_) => ToolType::FileGlob,
            ToolCallKind::ReadMcpResource(_) => ToolType::ReadMcpResource,
            ToolCallKind::CallMcpTool(_) => ToolType::CallMcpTool,
            ToolCallKind::WriteToLongRunningShellCommand(_) => {
                ToolType::WriteToLongRunningShellCommand
            }
            ToolCallKind::SuggestNewConversation(_) => ToolType::SuggestNewConversation,
            ToolCallKind::FileGlobV2(_) => ToolType::FileGlobV2,
            ToolCallKind::SuggestPrompt(_) => ToolType::SuggestPrompt,
            ToolCallKind::OpenCodeReview(_) => ToolType::OpenCodeReview,
            ToolCallKind::InitProject(_) => ToolType::InitProject,
            ToolCallKind::Subagent(_) => ToolType::Subagent,
            ToolCallKind::ReadDocuments(_) => ToolType::ReadDocuments,
            ToolCallKind::EditDocuments(_) => ToolType::EditDocuments,
            ToolCallKind::CreateDocuments(_) => ToolType::CreateDocuments,
            ToolCallKind::ReadShellCommandOutput(_) => ToolType::ReadShellCommandOutput,
            ToolCallKind::UseComputer(_) => ToolType::UseComputer,
            ToolCallKind::InsertReviewComments(_) => ToolType::InsertReviewComments,
            ToolCallKind::ReadSkill(_) => ToolType::ReadSkill,
            ToolCallKind::RequestComputerUse(_) => ToolType::RequestComputerUse,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunShellCommand {
    pub command: String,
    pub is_read_only: bool,
    pub uses_pager: bool,
    pub is_risky: bool,
    pub wait_until_complete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCodebase {
    pub query: String,
    pub path_filters: Vec<String>,
    pub codebase_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToRead {
    pub name: String,
    pub line_ranges: Vec<LineRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadFiles {
    pub files: Vec<FileToRead>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiff {
    pub file_path: String,
    pub search: String,
    pub replace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewFile {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletedFile {
    pub file_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct V4AHunk {
    pub context: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct V4AFileUpdate {
    pub file_path: String,
    pub move_to: String,
    pub hunks: Vec<V4AHunk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyFileDiffs {
    pub summary: String,
    pub diffs: Vec<FileDiff>,
    pub new_files: Vec<NewFile>,
    pub deleted_files: Vec<DeletedFile>,
    pub v4a_updates: Vec<V4AFileUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposedTask {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestPlan {
    pub summary: String,
    pub proposed_tasks: Vec<ProposedTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grep {
    pub queries: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGlob {
    pub patterns: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGlobV2 {
    pub patterns: Vec<String>,
    pub search_dir: String,
    pub max_matches: u32,
    pub max_depth: u32,
    pub min_depth: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadMcpResource {
    pub uri: String,
    pub server_id: String,
}

/// Generic external-tool call; also the fallback for unknown tool names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallMcpTool {
    pub name: String,
    pub args: Map<String, Value>,
    pub server_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellInputMode {
    Raw(Empty),
    Line(Empty),
    Block(Empty),
}

impl ShellInputMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "raw" => ShellInputMode::Raw(Empty {}),
            "block" => ShellInputMode::Block(Empty {}),
            _ => ShellInputMode::Line(Empty {}),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShellInputMode::Raw(_) => "raw",
            ShellInputMode::Line(_) => "line",
            ShellInputMode::Block(_) => "block",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteToLongRunningShellCommand {
    #[serde(with = "super::base64_bytes")]
    pub input: Vec<u8>,
    pub command_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ShellInputMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestNewConversation {
    pub message_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestPrompt {
    pub prompt: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subagent {
    pub task_id: String,
    pub payload: String,
    #[serde(flatten)]
    pub metadata: Option<SubagentMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubagentMetadata {
    Cli(CliSubagent),
    Research(Empty),
    Advice(Empty),
    ComputerUse(Empty),
    Summarization(Empty),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSubagent {
    pub command_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentToRead {
    pub document_id: String,
    pub line_ranges: Vec<LineRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadDocuments {
    pub documents: Vec<DocumentToRead>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentDiff {
    pub document_id: String,
    pub search: String,
    pub replace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditDocuments {
    pub diffs: Vec<DocumentDiff>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDocument {
    pub content: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateDocuments {
    pub new_documents: Vec<NewDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadShellCommandOutput {
    pub command_id: String,
    #[serde(flatten)]
    pub delay: Option<ShellOutputDelay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellOutputDelay {
    /// proto3 JSON duration, e.g. `"5s"`.
    Duration(String),
    OnCompletion(Empty),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrollDirection {
    #[default]
    Up,
    Down,
    ScrollLeft,
    ScrollRight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseMove {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseDown {
    pub button: MouseButton,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseUp {
    pub button: MouseButton,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseWheel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Coordinates>,
    pub direction: ScrollDirection,
    pub pixels: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Keycode(u32),
    Char(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wait {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputerAction {
    MouseMove(MouseMove),
    MouseDown(MouseDown),
    MouseUp(MouseUp),
    MouseWheel(MouseWheel),
    TypeText(TypeText),
    KeyDown(KeyPress),
    KeyUp(KeyPress),
    Wait(Wait),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotParams {
    pub max_long_edge_px: u32,
    pub max_total_px: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UseComputer {
    pub actions: Vec<ComputerAction>,
    pub action_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_actions_screenshot_params: Option<ScreenshotParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertReviewComments {
    pub repo_path: String,
    pub comments: Vec<ReviewComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadSkill {
    pub skill_path: String,
    pub skill_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestComputerUse {
    pub task_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_params: Option<ScreenshotParams>,
}
