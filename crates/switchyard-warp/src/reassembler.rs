//! Turn reassembly: fold [`WarpEvent`]s into Anthropic SSE events.
//!
//! Block rules:
//! - at most one of {text, thinking} is open at a time;
//! - tool-use blocks open and close within a single event and get their own index;
//! - the index only grows.
//!
//! Side-channel events (todos, web search/fetch, summaries) never touch the
//! block sequence; they are kept on the reassembler for the caller.

use crate::events::{stop_reason, Finished, WarpEvent};
use crate::tools::ToolUse;
use crate::wire::{FetchedPage, TodoItem, WebPage};
use switchyard_protocol::{
    BlockDelta, ContentBlock, DeltaUsage, MessageDelta, MessagesResponse, Role, StreamEvent, Usage,
};
use uuid::Uuid;

/// `msg_` followed by a v4 uuid in simple form.
pub fn new_message_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenBlock {
    Text,
    Thinking,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoState {
    pub items: Vec<TodoItem>,
    pub completed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebActivity {
    SearchStarted { query: String },
    SearchResult { query: String, pages: Vec<WebPage> },
    SearchFailed,
    FetchStarted { urls: Vec<String> },
    FetchResult { pages: Vec<FetchedPage> },
    FetchFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryNote {
    pub summary: String,
    pub token_count: u32,
}

/// Per-turn reassembly state. One instance per in-flight turn.
#[derive(Debug)]
pub struct Reassembler {
    message_id: String,
    model: String,
    input_tokens: u32,

    /// Index the next block will start at (or the open block's index).
    block_index: usize,
    open: Option<OpenBlock>,

    text: String,
    reasoning: String,
    tool_calls: Vec<ToolUse>,

    todos: TodoState,
    web: Vec<WebActivity>,
    summary: Option<SummaryNote>,
    diagnostics: Vec<WarpEvent>,

    conversation_id: Option<String>,
    finished: Option<Finished>,
    stop_reason: Option<&'static str>,
}

impl Reassembler {
    pub fn new(message_id: impl Into<String>, model: impl Into<String>, input_tokens: u32) -> Self {
        Self {
            message_id: message_id.into(),
            model: model.into(),
            input_tokens,
            block_index: 0,
            open: None,
            text: String::new(),
            reasoning: String::new(),
            tool_calls: Vec::new(),
            todos: TodoState::default(),
            web: Vec::new(),
            summary: None,
            diagnostics: Vec::new(),
            conversation_id: None,
            finished: None,
            stop_reason: None,
        }
    }

    /// The opening `message_start` event for this turn.
    pub fn message_start(&self) -> StreamEvent {
        StreamEvent::MessageStart {
            message: MessagesResponse {
                id: self.message_id.clone(),
                kind: "message".to_string(),
                role: Role::Assistant,
                content: Vec::new(),
                model: self.model.clone(),
                stop_reason: None,
                stop_sequence: None,
                usage: Usage {
                    input_tokens: self.input_tokens,
                    ..Default::default()
                },
            },
        }
    }

    /// Apply one event, returning the SSE events it produces.
    pub fn apply(&mut self, event: WarpEvent) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        if self.is_finished() {
            self.diagnostics.push(event);
            return out;
        }

        match event {
            WarpEvent::TextDelta(text) => {
                if self.open != Some(OpenBlock::Text) {
                    self.close_open_block(&mut out);
                    out.push(StreamEvent::ContentBlockStart {
                        index: self.block_index,
                        content_block: ContentBlock::text(""),
                    });
                    self.open = Some(OpenBlock::Text);
                }
                out.push(StreamEvent::ContentBlockDelta {
                    index: self.block_index,
                    delta: BlockDelta::TextDelta { text: text.clone() },
                });
                self.text.push_str(&text);
            }
            WarpEvent::Reasoning { text, .. } => {
                if self.open != Some(OpenBlock::Thinking) {
                    self.close_open_block(&mut out);
                    out.push(StreamEvent::ContentBlockStart {
                        index: self.block_index,
                        content_block: ContentBlock::Thinking {
                            thinking: String::new(),
                            signature: None,
                        },
                    });
                    self.open = Some(OpenBlock::Thinking);
                }
                if !text.is_empty() {
                    out.push(StreamEvent::ContentBlockDelta {
                        index: self.block_index,
                        delta: BlockDelta::ThinkingDelta {
                            thinking: text.clone(),
                        },
                    });
                    self.reasoning.push_str(&text);
                }
            }
            WarpEvent::ToolUse(tool_use) => {
                self.close_open_block(&mut out);
                let index = self.block_index;
                out.push(StreamEvent::ContentBlockStart {
                    index,
                    content_block: ContentBlock::ToolUse {
                        id: tool_use.id.clone(),
                        name: tool_use.name.clone(),
                        input: serde_json::json!({}),
                    },
                });
                out.push(StreamEvent::ContentBlockDelta {
                    index,
                    delta: BlockDelta::InputJsonDelta {
                        partial_json: tool_use.input.to_string(),
                    },
                });
                out.push(StreamEvent::ContentBlockStop { index });
                self.block_index += 1;
                self.tool_calls.push(tool_use);
            }
            WarpEvent::TodoCreate(items) | WarpEvent::TodoUpdate(items) => self.todos.items = items,
            WarpEvent::TodoComplete(ids) => self.todos.completed.extend(ids),
            WarpEvent::WebSearchStart { query } => {
                self.web.push(WebActivity::SearchStarted { query })
            }
            WarpEvent::WebSearchResult { query, pages } => {
                self.web.push(WebActivity::SearchResult { query, pages })
            }
            WarpEvent::WebSearchError => self.web.push(WebActivity::SearchFailed),
            WarpEvent::WebFetchStart { urls } => self.web.push(WebActivity::FetchStarted { urls }),
            WarpEvent::WebFetchResult { pages } => self.web.push(WebActivity::FetchResult { pages }),
            WarpEvent::WebFetchError => self.web.push(WebActivity::FetchFailed),
            WarpEvent::Summarization {
                summary,
                token_count,
            } => {
                self.summary = Some(SummaryNote {
                    summary,
                    token_count,
                })
            }
            WarpEvent::StreamInit {
                ref conversation_id,
                ..
            } => {
                self.conversation_id = Some(conversation_id.clone());
                self.diagnostics.push(event);
            }
            WarpEvent::StreamFinished(finished) => {
                self.close_open_block(&mut out);
                let reason = if self.tool_calls.is_empty() {
                    finished.reason
                } else {
                    stop_reason::TOOL_USE
                };
                out.push(StreamEvent::MessageDelta {
                    delta: MessageDelta {
                        stop_reason: Some(reason.to_string()),
                        stop_sequence: None,
                    },
                    usage: DeltaUsage {
                        output_tokens: finished.usage.output_tokens,
                    },
                });
                out.push(StreamEvent::MessageStop);
                self.stop_reason = Some(reason);
                self.finished = Some(finished);
            }
            WarpEvent::ToolResult(_) | WarpEvent::Other { .. } => self.diagnostics.push(event),
        }
        out
    }

    fn close_open_block(&mut self, out: &mut Vec<StreamEvent>) {
        if self.open.take().is_some() {
            out.push(StreamEvent::ContentBlockStop {
                index: self.block_index,
            });
            self.block_index += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn tool_calls(&self) -> &[ToolUse] {
        &self.tool_calls
    }

    pub fn todos(&self) -> &TodoState {
        &self.todos
    }

    pub fn web_activity(&self) -> &[WebActivity] {
        &self.web
    }

    pub fn summary(&self) -> Option<&SummaryNote> {
        self.summary.as_ref()
    }

    pub fn diagnostics(&self) -> &[WarpEvent] {
        &self.diagnostics
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Terminal summary, present once `stream_finished` was applied.
    pub fn finished(&self) -> Option<&Finished> {
        self.finished.as_ref()
    }

    /// Final stop reason, `tool_use` taking precedence over the upstream reason.
    pub fn stop_reason(&self) -> Option<&'static str> {
        self.stop_reason
    }

    pub fn usage(&self) -> Usage {
        let mut usage = self
            .finished
            .as_ref()
            .map(|f| f.usage)
            .unwrap_or_default();
        if usage.input_tokens == 0 {
            usage.input_tokens = self.input_tokens;
        }
        usage
    }

    /// Build the buffered (non-streaming) response.
    pub fn into_response(self) -> MessagesResponse {
        let usage = self.usage();
        let mut content = Vec::new();
        if !self.reasoning.is_empty() {
            content.push(ContentBlock::Thinking {
                thinking: self.reasoning,
                signature: None,
            });
        }
        if !self.text.is_empty() {
            content.push(ContentBlock::Text { text: self.text });
        }
        content.extend(self.tool_calls.into_iter().map(|t| ContentBlock::ToolUse {
            id: t.id,
            name: t.name,
            input: t.input,
        }));
        if content.is_empty() {
            content.push(ContentBlock::text(""));
        }

        MessagesResponse {
            id: self.message_id,
            kind: "message".to_string(),
            role: Role::Assistant,
            content,
            model: self.model,
            stop_reason: Some(self.stop_reason.unwrap_or(stop_reason::END_TURN).to_string()),
            stop_sequence: None,
            usage,
        }
    }
}
