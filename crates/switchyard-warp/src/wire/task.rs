//! Tasks and the messages they carry.

use super::request::InputContext;
use super::tool_call::ToolCall;
use super::tool_result::ToolCallResult;
use super::Empty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    pub messages: Vec<Message>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending(Empty),
    InProgress(Empty),
    Blocked(Empty),
    Succeeded(Empty),
    Failed(Empty),
    Aborted(Empty),
}

impl TaskStatus {
    pub fn in_progress() -> Self {
        TaskStatus::InProgress(Empty {})
    }
}

/// One entry in a task's history. Exactly one [`MessageKind`] per message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    pub task_id: String,
    #[serde(flatten)]
    pub message: Option<MessageKind>,
}

impl Message {
    pub fn new(id: impl Into<String>, task_id: impl Into<String>, message: MessageKind) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            message: Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    UserQuery(UserQuery),
    AgentOutput(AgentOutput),
    ToolCall(ToolCall),
    ToolCallResult(ToolCallResult),
    ServerEvent(ServerEvent),
    SystemQuery(SystemQuery),
    Summarization(Summarization),
    UpdateTodos(UpdateTodos),
    WebSearch(WebSearch),
    WebFetch(WebFetch),
    AgentReasoning(AgentReasoning),
    CodeReview(CodeReview),
    UpdateReviewComments(UpdateReviewComments),
    DebugOutput(DebugOutput),
}

impl MessageKind {
    pub fn name(&self) -> &'static str {
        match self {
            MessageKind::UserQuery(_) => "user_query",
            MessageKind::AgentOutput(_) => "agent_output",
            MessageKind::ToolCall(_) => "tool_call",
            MessageKind::ToolCallResult(_) => "tool_call_result",
            MessageKind::ServerEvent(_) => "server_event",
            MessageKind::SystemQuery(_) => "system_query",
            MessageKind::Summarization(_) => "summarization",
            MessageKind::UpdateTodos(_) => "update_todos",
            MessageKind::WebSearch(_) => "web_search",
            MessageKind::WebFetch(_) => "web_fetch",
            MessageKind::AgentReasoning(_) => "agent_reasoning",
            MessageKind::CodeReview(_) => "code_review",
            MessageKind::UpdateReviewComments(_) => "update_review_comments",
            MessageKind::DebugOutput(_) => "debug_output",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<InputContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_attachments: Option<ReferencedAttachments>,
    pub is_user_initiated: bool,
    pub mode: String,
    pub intended_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencedAttachments {
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attachment {
    PlainText(String),
    File(FileContent),
    Image(RawImage),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawImage {
    #[serde(with = "super::base64_bytes")]
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContent {
    pub file_path: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentContent {
    pub document_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citation {
    pub url: String,
    pub title: String,
    pub document_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOutput {
    pub text: String,
    pub reasoning: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentReasoning {
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEvent {
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemQuery {
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOutput {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summarization {
    #[serde(flatten)]
    pub summary: Option<SummaryKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    ConversationSummary(ConversationSummary),
    ToolCallResultSummary(ToolCallResultSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSummary {
    pub summary: String,
    pub token_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCallResultSummary {
    pub tool_call_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTodos {
    #[serde(flatten)]
    pub operation: Option<TodoOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoOperation {
    CreateTodoList(CreateTodoList),
    UpdatePendingTodos(UpdatePendingTodos),
    MarkTodosCompleted(MarkTodosCompleted),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTodoList {
    pub initial_todos: Vec<TodoItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePendingTodos {
    pub updated_pending_todos: Vec<TodoItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkTodosCompleted {
    pub todo_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebPage {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WebSearchStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebSearchStatus {
    Searching(WebSearchQuery),
    Success(WebSearchSuccess),
    Error(Empty),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchQuery {
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchSuccess {
    pub query: String,
    pub pages: Vec<WebPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebFetch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WebFetchStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebFetchStatus {
    Fetching(WebFetchTargets),
    Success(WebFetchSuccess),
    Error(Empty),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebFetchTargets {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchedPage {
    pub url: String,
    pub title: String,
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebFetchSuccess {
    pub pages: Vec<FetchedPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentLine {
    pub diff_hunk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<LineRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentLocation {
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<CommentLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewComment {
    pub comment_id: String,
    pub author: String,
    pub last_modified_timestamp: String,
    pub comment_body: String,
    pub parent_comment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<CommentLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeReview {
    pub comments: Vec<ReviewComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateReviewComments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_review_comments: Option<AddressReviewComments>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressReviewComments {
    pub comment_ids: Vec<String>,
}
