//! Flatten decoded `ResponseEvent`s into the events the reassembler folds.

use crate::tools::{ToolMapper, ToolUse};
use crate::wire::{
    ClientActionKind, FetchedPage, FinishReason, Message, MessageKind, ResponseEvent,
    ResponseEventKind, StreamFinished, SummaryKind, TodoItem, TodoOperation, ToolCallResult,
    WebFetchStatus, WebPage, WebSearchStatus,
};
use serde_json::Value;
use switchyard_protocol::Usage;

pub mod stop_reason {
    pub const END_TURN: &str = "end_turn";
    pub const TOOL_USE: &str = "tool_use";
    pub const MAX_TOKENS: &str = "max_tokens";
    pub const QUOTA_LIMIT: &str = "quota_limit";
    pub const CONTEXT_WINDOW_EXCEEDED: &str = "context_window_exceeded";
    pub const LLM_UNAVAILABLE: &str = "llm_unavailable";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const INVALID_API_KEY: &str = "invalid_api_key";
    pub const OTHER: &str = "other";
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarpEvent {
    StreamInit {
        conversation_id: String,
        request_id: String,
    },
    TextDelta(String),
    Reasoning {
        text: String,
        finished_duration: Option<String>,
    },
    ToolUse(ToolUse),
    ToolResult(ToolCallResult),
    TodoCreate(Vec<TodoItem>),
    TodoUpdate(Vec<TodoItem>),
    TodoComplete(Vec<String>),
    WebSearchStart {
        query: String,
    },
    WebSearchResult {
        query: String,
        pages: Vec<WebPage>,
    },
    WebSearchError,
    WebFetchStart {
        urls: Vec<String>,
    },
    WebFetchResult {
        pages: Vec<FetchedPage>,
    },
    WebFetchError,
    Summarization {
        summary: String,
        token_count: u32,
    },
    StreamFinished(Finished),
    /// Anything the SSE contract has no place for; kept for diagnostics.
    Other {
        kind: &'static str,
        detail: Value,
    },
}

impl WarpEvent {
    fn other(kind: &'static str, detail: impl serde::Serialize) -> Self {
        WarpEvent::Other {
            kind,
            detail: serde_json::to_value(detail).unwrap_or(Value::Null),
        }
    }
}

/// Terminal summary of a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Finished {
    pub reason: &'static str,
    pub usage: Usage,
    pub cost_in_cents: f64,
    pub error_message: Option<String>,
    pub should_refresh_model_config: bool,
}

impl Default for Finished {
    fn default() -> Self {
        Self {
            reason: stop_reason::END_TURN,
            usage: Usage::default(),
            cost_in_cents: 0.0,
            error_message: None,
            should_refresh_model_config: false,
        }
    }
}

/// Everything one server push carries, in payload order.
pub fn parse_response_event(event: &ResponseEvent, mapper: &ToolMapper) -> Vec<WarpEvent> {
    let mut events = Vec::new();
    match &event.kind {
        Some(ResponseEventKind::Init(init)) => events.push(WarpEvent::StreamInit {
            conversation_id: init.conversation_id.clone(),
            request_id: init.request_id.clone(),
        }),
        Some(ResponseEventKind::ClientActions(actions)) => {
            for action in actions.actions.iter().filter_map(|a| a.action.as_ref()) {
                parse_action(action, mapper, &mut events);
            }
        }
        Some(ResponseEventKind::Finished(finished)) => {
            events.push(WarpEvent::StreamFinished(parse_finished(finished)))
        }
        None => {}
    }
    events
}

fn parse_action(action: &ClientActionKind, mapper: &ToolMapper, events: &mut Vec<WarpEvent>) {
    match action {
        ClientActionKind::AddMessagesToTask(add) => {
            for message in &add.messages {
                parse_message(message, mapper, events);
            }
        }
        ClientActionKind::UpdateTaskMessage(update)
        | ClientActionKind::AppendToMessageContent(update) => {
            if let Some(message) = &update.message {
                parse_message(message, mapper, events);
            }
        }
        ClientActionKind::CreateTask(create) => events.push(WarpEvent::other("task_created", create)),
        ClientActionKind::UpdateTaskStatus(status) => {
            events.push(WarpEvent::other("task_status", status))
        }
        ClientActionKind::UpdateTaskSummary(summary) => {
            events.push(WarpEvent::other("task_summary", summary))
        }
        ClientActionKind::UpdateTaskDescription(description) => {
            events.push(WarpEvent::other("task_description", description))
        }
        ClientActionKind::UpdateTaskServerData(data) => {
            events.push(WarpEvent::other("task_server_data", data))
        }
        ClientActionKind::ShowSuggestions(suggestions) => {
            events.push(WarpEvent::other("suggestions", suggestions))
        }
        ClientActionKind::BeginTransaction(_) => events.push(WarpEvent::other("transaction_begin", ())),
        ClientActionKind::CommitTransaction(_) => {
            events.push(WarpEvent::other("transaction_commit", ()))
        }
        ClientActionKind::RollbackTransaction(_) => {
            events.push(WarpEvent::other("transaction_rollback", ()))
        }
        ClientActionKind::StartNewConversation(start) => {
            events.push(WarpEvent::other("new_conversation", start))
        }
        ClientActionKind::MoveMessagesToNewTask(moved) => {
            events.push(WarpEvent::other("move_messages", moved))
        }
    }
}

fn parse_message(message: &Message, mapper: &ToolMapper, events: &mut Vec<WarpEvent>) {
    let Some(kind) = &message.message else {
        return;
    };
    match kind {
        MessageKind::AgentOutput(output) => {
            if !output.text.is_empty() {
                events.push(WarpEvent::TextDelta(output.text.clone()));
            }
        }
        MessageKind::AgentReasoning(reasoning) => events.push(WarpEvent::Reasoning {
            text: reasoning.reasoning.clone(),
            finished_duration: reasoning.finished_duration.clone(),
        }),
        MessageKind::ToolCall(call) => {
            if let Some(tool_use) = mapper.from_wire_tool_call(call) {
                events.push(WarpEvent::ToolUse(tool_use));
            }
        }
        MessageKind::ToolCallResult(result) => events.push(WarpEvent::ToolResult(result.clone())),
        MessageKind::UpdateTodos(update) => match &update.operation {
            Some(TodoOperation::CreateTodoList(list)) => {
                events.push(WarpEvent::TodoCreate(list.initial_todos.clone()))
            }
            Some(TodoOperation::UpdatePendingTodos(pending)) => {
                events.push(WarpEvent::TodoUpdate(pending.updated_pending_todos.clone()))
            }
            Some(TodoOperation::MarkTodosCompleted(done)) => {
                events.push(WarpEvent::TodoComplete(done.todo_ids.clone()))
            }
            None => {}
        },
        MessageKind::WebSearch(search) => match &search.status {
            Some(WebSearchStatus::Searching(q)) => events.push(WarpEvent::WebSearchStart {
                query: q.query.clone(),
            }),
            Some(WebSearchStatus::Success(found)) => events.push(WarpEvent::WebSearchResult {
                query: found.query.clone(),
                pages: found.pages.clone(),
            }),
            Some(WebSearchStatus::Error(_)) => events.push(WarpEvent::WebSearchError),
            None => {}
        },
        MessageKind::WebFetch(fetch) => match &fetch.status {
            Some(WebFetchStatus::Fetching(targets)) => events.push(WarpEvent::WebFetchStart {
                urls: targets.urls.clone(),
            }),
            Some(WebFetchStatus::Success(fetched)) => events.push(WarpEvent::WebFetchResult {
                pages: fetched.pages.clone(),
            }),
            Some(WebFetchStatus::Error(_)) => events.push(WarpEvent::WebFetchError),
            None => {}
        },
        MessageKind::Summarization(summarization) => match &summarization.summary {
            Some(SummaryKind::ConversationSummary(summary)) => {
                events.push(WarpEvent::Summarization {
                    summary: summary.summary.clone(),
                    token_count: summary.token_count,
                })
            }
            Some(SummaryKind::ToolCallResultSummary(summary)) => {
                events.push(WarpEvent::other("tool_result_summarization", summary))
            }
            None => {}
        },
        MessageKind::CodeReview(review) => events.push(WarpEvent::other("code_review", review)),
        MessageKind::UpdateReviewComments(update) => {
            events.push(WarpEvent::other("review_comments_addressed", update))
        }
        MessageKind::ServerEvent(server) => events.push(WarpEvent::other("server_event", server)),
        MessageKind::DebugOutput(debug) => events.push(WarpEvent::other("debug", debug)),
        MessageKind::UserQuery(query) => events.push(WarpEvent::other("user_query", query)),
        MessageKind::SystemQuery(query) => events.push(WarpEvent::other("system_query", query)),
    }
}

fn parse_finished(finished: &StreamFinished) -> Finished {
    let mut error_message = None;
    let reason = match &finished.reason {
        None | Some(FinishReason::Done(_)) => stop_reason::END_TURN,
        Some(FinishReason::QuotaLimit(_)) => stop_reason::QUOTA_LIMIT,
        Some(FinishReason::MaxTokenLimit(_)) => stop_reason::MAX_TOKENS,
        Some(FinishReason::ContextWindowExceeded(_)) => stop_reason::CONTEXT_WINDOW_EXCEEDED,
        Some(FinishReason::LlmUnavailable(_)) => stop_reason::LLM_UNAVAILABLE,
        Some(FinishReason::InternalError(err)) => {
            error_message = Some(err.message.clone()).filter(|m| !m.is_empty());
            stop_reason::INTERNAL_ERROR
        }
        Some(FinishReason::InvalidApiKey(key)) => {
            error_message = Some(format!("invalid API key for model {}", key.model_name));
            stop_reason::INVALID_API_KEY
        }
        Some(FinishReason::Other(_)) => stop_reason::OTHER,
    };

    let mut usage = Usage::default();
    let mut cache_read = 0u32;
    let mut cache_write = 0u32;
    let mut cost_in_cents = 0.0;
    for entry in &finished.token_usage {
        usage.input_tokens = usage.input_tokens.saturating_add(entry.total_input);
        usage.output_tokens = usage.output_tokens.saturating_add(entry.output);
        cache_read = cache_read.saturating_add(entry.input_cache_read);
        cache_write = cache_write.saturating_add(entry.input_cache_write);
        cost_in_cents += entry.cost_in_cents;
    }
    usage.cache_read_input_tokens = Some(cache_read);
    usage.cache_creation_input_tokens = Some(cache_write);

    Finished {
        reason,
        usage,
        cost_in_cents,
        error_message,
        should_refresh_model_config: finished.should_refresh_model_config,
    }
}
