//! Server push events (`ResponseEvent`).

use super::task::{Message, Task, TaskStatus};
use super::Empty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseEvent {
    #[serde(flatten)]
    pub kind: Option<ResponseEventKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseEventKind {
    Init(StreamInit),
    ClientActions(ClientActions),
    Finished(StreamFinished),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamInit {
    pub conversation_id: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientActions {
    pub actions: Vec<ClientAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientAction {
    #[serde(flatten)]
    pub action: Option<ClientActionKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientActionKind {
    CreateTask(CreateTask),
    UpdateTaskStatus(UpdateTaskStatus),
    AddMessagesToTask(AddMessagesToTask),
    UpdateTaskMessage(TaskMessage),
    AppendToMessageContent(TaskMessage),
    UpdateTaskSummary(UpdateTaskSummary),
    UpdateTaskDescription(UpdateTaskDescription),
    UpdateTaskServerData(UpdateTaskServerData),
    ShowSuggestions(ShowSuggestions),
    BeginTransaction(Empty),
    CommitTransaction(Empty),
    RollbackTransaction(Empty),
    StartNewConversation(StartNewConversation),
    MoveMessagesToNewTask(MoveMessagesToNewTask),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTaskStatus {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddMessagesToTask {
    pub task_id: String,
    pub messages: Vec<Message>,
}

/// Payload of both `update_task_message` and `append_to_message_content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskMessage {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTaskSummary {
    pub task_id: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTaskDescription {
    pub task_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTaskServerData {
    pub task_id: String,
    pub server_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestedPrompt {
    pub prompt: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestedRule {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestions {
    pub prompts: Vec<SuggestedPrompt>,
    pub rules: Vec<SuggestedRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowSuggestions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Suggestions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartNewConversation {
    pub start_from_message_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveMessagesToNewTask {
    pub source_task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_task: Option<Task>,
    pub message_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub model_id: String,
    pub total_input: u32,
    pub output: u32,
    pub input_cache_read: u32,
    pub input_cache_write: u32,
    pub cost_in_cents: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalError {
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvalidApiKey {
    /// `LLMProvider` name, or its number when the value is not in the schema.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub provider: serde_json::Value,
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Done(Empty),
    QuotaLimit(Empty),
    MaxTokenLimit(Empty),
    ContextWindowExceeded(Empty),
    LlmUnavailable(Empty),
    InternalError(InternalError),
    InvalidApiKey(InvalidApiKey),
    Other(Empty),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamFinished {
    #[serde(flatten)]
    pub reason: Option<FinishReason>,
    pub token_usage: Vec<TokenUsage>,
    pub should_refresh_model_config: bool,
}
