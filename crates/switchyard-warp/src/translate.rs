//! Anthropic Messages request to wire `Request`.
//!
//! The last message is the turn being answered and goes to
//! `input.user_inputs`; everything before it becomes history on a single
//! in-progress task. Tool results are shaped by the tool that produced them,
//! which is looked up from the `tool_use` blocks seen earlier in the same
//! forward pass.

use crate::error::TranslationError;
use crate::models::map_model_to_warp;
use crate::tools::{names, supported_wire_tools, ToolMapper, ToolResult, ToolUse};
use crate::wire::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use switchyard_protocol::{Content, ContentBlock, ImageSource, Message as ChatMessage, MessagesRequest, Role};
use tracing::debug;
use uuid::Uuid;

/// Where the system prompt is presented to the upstream.
pub const RULES_FILE_PATH: &str = ".claude/rules.md";

pub const DEFAULT_WORKING_DIR: &str = "/tmp";
pub const DEFAULT_HOME_DIR: &str = "/root";
pub const SHELL_NAME: &str = "zsh";
pub const SHELL_VERSION: &str = "5.9";

/// Environment the request claims to run in.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub working_dir: String,
    pub home_dir: String,
    /// Overrides `metadata.session_id` from the request.
    pub conversation_id: Option<String>,
    /// Pinned clock for reproducible requests; `None` means now.
    pub current_time: Option<DateTime<Utc>>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            home_dir: DEFAULT_HOME_DIR.to_string(),
            conversation_id: None,
            current_time: None,
        }
    }
}

impl ExecutionContext {
    pub fn new(working_dir: impl Into<String>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_home_dir(mut self, home_dir: impl Into<String>) -> Self {
        self.home_dir = home_dir.into();
        self
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_current_time(mut self, time: DateTime<Utc>) -> Self {
        self.current_time = Some(time);
        self
    }

    /// The `InputContext` attached to user queries.
    pub fn input_context(&self) -> InputContext {
        InputContext {
            directory: Some(Directory {
                pwd: self.working_dir.clone(),
                home: self.home_dir.clone(),
                pwd_file_symbols_indexed: false,
            }),
            operating_system: Some(OperatingSystem {
                platform: Some(Platform {
                    name: String::new(),
                    fingerprint: OS_FINGERPRINT,
                }),
                distribution: String::new(),
            }),
            shell: Some(Shell {
                name: SHELL_NAME.to_string(),
                version: SHELL_VERSION.to_string(),
            }),
            current_time: Some(self.current_time.unwrap_or_else(Utc::now)),
            project_rules: Vec::new(),
        }
    }
}

/// Build the wire request for one turn. Never fails: blocks that cannot be
/// placed are logged at debug level and dropped.
pub fn build_wire_request(
    request: &MessagesRequest,
    context: &ExecutionContext,
    mapper: &ToolMapper,
) -> Request {
    let task_id = Uuid::new_v4().to_string();

    let mut input_context = context.input_context();
    if let Some(system) = &request.system {
        let text = system.to_plaintext();
        if !text.is_empty() {
            input_context.project_rules.push(ProjectRules {
                root_path: context.working_dir.clone(),
                active_rule_files: vec![RuleFile {
                    file_path: RULES_FILE_PATH.to_string(),
                    content: text,
                }],
                additional_rule_file_paths: Vec::new(),
            });
        }
    }

    let mut conversation = Conversation {
        mapper,
        task_id: &task_id,
        context: &input_context,
        tool_names: HashMap::new(),
        history: Vec::new(),
        inputs: Vec::new(),
    };
    let last = request.messages.len().saturating_sub(1);
    for (index, message) in request.messages.iter().enumerate() {
        conversation.push(index, message, index == last);
    }
    let Conversation { history, inputs, .. } = conversation;

    let model = map_model_to_warp(&request.model).to_string();
    let conversation_id = context
        .conversation_id
        .clone()
        .or_else(|| session_id(request))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Request {
        task_context: TaskContext {
            tasks: vec![Task {
                id: task_id.clone(),
                status: Some(TaskStatus::in_progress()),
                messages: history,
                ..Default::default()
            }],
            active_task_id: task_id,
        },
        input: Input {
            context: Some(input_context),
            user_inputs: Some(UserInputs { inputs }),
        },
        settings: Settings {
            model_config: Some(ModelConfig {
                base: model.clone(),
                planning: model.clone(),
                coding: model,
                cli_agent: String::new(),
            }),
            rules_enabled: true,
            supports_parallel_tool_calls: true,
            supports_create_files: true,
            supported_tools: supported_wire_tools(request.tools.as_deref()),
            supports_long_running_commands: true,
            supports_todos_ui: true,
            supports_linked_code_blocks: true,
            ..Default::default()
        },
        metadata: Metadata {
            conversation_id,
            logging: vec![
                LoggingEntry::enum_value("entrypoint", "USER_INITIATED"),
                LoggingEntry::bool_value("is_auto_resume_after_error", false),
                LoggingEntry::bool_value("is_autodetected_user_query", true),
            ],
        },
    }
}

fn session_id(request: &MessagesRequest) -> Option<String> {
    request
        .metadata
        .as_ref()?
        .get("session_id")?
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

struct Conversation<'a> {
    mapper: &'a ToolMapper,
    task_id: &'a str,
    context: &'a InputContext,
    /// tool_use id -> tool name, filled while walking assistant turns.
    tool_names: HashMap<String, String>,
    history: Vec<Message>,
    inputs: Vec<UserInput>,
}

impl Conversation<'_> {
    fn push(&mut self, index: usize, message: &ChatMessage, is_last: bool) {
        match message.role {
            Role::User => self.push_user(index, &message.content, is_last),
            Role::Assistant => self.push_assistant(index, &message.content),
        }
    }

    fn record(&mut self, kind: MessageKind) {
        self.history
            .push(Message::new(Uuid::new_v4().to_string(), self.task_id, kind));
    }

    fn user_query(&self, query: String, images: Vec<RawImage>, is_last: bool) -> UserQuery {
        UserQuery {
            query,
            context: Some(self.context.clone()),
            referenced_attachments: Some(ReferencedAttachments {
                attachments: images.into_iter().map(Attachment::Image).collect(),
            }),
            is_user_initiated: is_last,
            ..Default::default()
        }
    }

    fn push_user(&mut self, index: usize, content: &Content, is_last: bool) {
        let blocks = match content {
            Content::String(text) => {
                let query = self.user_query(text.clone(), Vec::new(), is_last);
                if is_last {
                    self.inputs.push(UserInput::UserQuery(query));
                } else {
                    self.record(MessageKind::UserQuery(query));
                }
                return;
            }
            Content::Blocks(blocks) => blocks,
        };

        let mut texts: Vec<&str> = Vec::new();
        let mut images = Vec::new();
        let mut results = Vec::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text } => texts.push(text),
                ContentBlock::Image { source } => match raw_image(source) {
                    Some(image) => images.push(image),
                    None => skip(TranslationError::UnsupportedBlock {
                        message_index: index,
                        block: "image",
                    }),
                },
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let tool_name = self
                        .tool_names
                        .get(tool_use_id)
                        .map(String::as_str)
                        .unwrap_or(names::BASH);
                    let result = ToolResult {
                        tool_use_id: tool_use_id.clone(),
                        content: content.clone(),
                        is_error: is_error.unwrap_or(false),
                    };
                    results.push(self.mapper.to_wire_tool_result(&result, tool_name));
                }
                ContentBlock::Thinking { .. } | ContentBlock::ToolUse { .. } => {
                    skip(TranslationError::MisplacedBlock {
                        message_index: index,
                        block: block.kind(),
                    })
                }
                ContentBlock::Unsupported => skip(TranslationError::UnsupportedBlock {
                    message_index: index,
                    block: block.kind(),
                }),
            }
        }

        let text = texts.concat();
        let has_query = !text.is_empty() || !images.is_empty();

        if is_last {
            if has_query {
                let query = self.user_query(text, images, true);
                self.inputs.push(UserInput::UserQuery(query));
            }
            self.inputs
                .extend(results.into_iter().map(UserInput::ToolCallResult));
        } else {
            if has_query {
                let query = self.user_query(text, images, false);
                self.record(MessageKind::UserQuery(query));
            }
            for result in results {
                self.record(MessageKind::ToolCallResult(result));
            }
        }
    }

    fn push_assistant(&mut self, index: usize, content: &Content) {
        let blocks = match content {
            Content::String(text) => {
                self.record(agent_output(text));
                return;
            }
            Content::Blocks(blocks) => blocks,
        };

        for block in blocks {
            match block {
                ContentBlock::Text { text } => self.record(agent_output(text)),
                ContentBlock::Thinking { thinking, .. } => {
                    self.record(MessageKind::AgentReasoning(AgentReasoning {
                        reasoning: thinking.clone(),
                        finished_duration: None,
                    }))
                }
                ContentBlock::ToolUse { id, name, input } => {
                    self.tool_names.insert(id.clone(), name.clone());
                    let call = self
                        .mapper
                        .to_wire_tool_call(&ToolUse::new(id.clone(), name.clone(), input.clone()));
                    self.record(MessageKind::ToolCall(call));
                }
                ContentBlock::ToolResult { .. } | ContentBlock::Image { .. } => {
                    skip(TranslationError::MisplacedBlock {
                        message_index: index,
                        block: block.kind(),
                    })
                }
                ContentBlock::Unsupported => skip(TranslationError::UnsupportedBlock {
                    message_index: index,
                    block: block.kind(),
                }),
            }
        }
    }
}

fn agent_output(text: &str) -> MessageKind {
    MessageKind::AgentOutput(AgentOutput {
        text: text.to_string(),
        ..Default::default()
    })
}

fn raw_image(source: &ImageSource) -> Option<RawImage> {
    if source.kind != "base64" {
        return None;
    }
    let data = STANDARD.decode(source.data.as_bytes()).ok()?;
    Some(RawImage {
        data,
        mime_type: source.media_type.clone(),
    })
}

fn skip(err: TranslationError) {
    debug!("skipping content block: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_protocol::{SystemContent, Tool, ToolResultContent};

    fn translate(request: &MessagesRequest) -> Request {
        build_wire_request(request, &ExecutionContext::new("/work"), &ToolMapper::new())
    }

    fn only_task(request: &Request) -> &Task {
        assert_eq!(request.task_context.tasks.len(), 1);
        &request.task_context.tasks[0]
    }

    fn inputs(request: &Request) -> &[UserInput] {
        &request.input.user_inputs.as_ref().unwrap().inputs
    }

    #[test]
    fn test_simple_chat_turn() {
        let request = MessagesRequest::new("claude-sonnet-4-20250514", vec![ChatMessage::user("hello")]);
        let wire = translate(&request);

        let task = only_task(&wire);
        assert!(task.messages.is_empty());
        assert_eq!(wire.task_context.active_task_id, task.id);
        assert_eq!(task.status, Some(TaskStatus::in_progress()));

        let inputs = inputs(&wire);
        assert_eq!(inputs.len(), 1);
        match &inputs[0] {
            UserInput::UserQuery(query) => {
                assert_eq!(query.query, "hello");
                assert!(query.is_user_initiated);
            }
            other => panic!("unexpected input: {:?}", other),
        }

        let model = wire.settings.model_config.as_ref().unwrap();
        assert_eq!(model.base, "claude-4-sonnet");
        assert_eq!(wire.settings.supported_tools, crate::tools::DEFAULT_SUPPORTED_TOOLS.to_vec());
        assert!(wire.input.context.as_ref().unwrap().project_rules.is_empty());
    }

    #[test]
    fn test_tool_result_uses_recorded_tool_name() {
        let request = MessagesRequest::new(
            "claude-sonnet-4-20250514",
            vec![
                ChatMessage::user("list files"),
                ChatMessage::assistant(vec![ContentBlock::ToolUse {
                    id: "t1".into(),
                    name: "Bash".into(),
                    input: json!({"command": "ls -la"}),
                }]),
                ChatMessage {
                    role: Role::User,
                    content: Content::Blocks(vec![ContentBlock::ToolResult {
                        tool_use_id: "t1".into(),
                        content: ToolResultContent::String("file1\nfile2".into()),
                        is_error: None,
                    }]),
                },
            ],
        );
        let wire = translate(&request);

        let history = &only_task(&wire).messages;
        assert_eq!(history.len(), 2);
        assert!(matches!(history[0].message, Some(MessageKind::UserQuery(_))));
        match &history[1].message {
            Some(MessageKind::ToolCall(call)) => {
                assert_eq!(call.tool_call_id, "t1");
                let Some(ToolCallKind::RunShellCommand(cmd)) = &call.tool else {
                    panic!("expected shell command");
                };
                assert_eq!(cmd.command, "ls -la");
                assert!(cmd.is_read_only);
            }
            other => panic!("unexpected history entry: {:?}", other),
        }

        let inputs = inputs(&wire);
        assert_eq!(inputs.len(), 1);
        let UserInput::ToolCallResult(result) = &inputs[0] else {
            panic!("expected tool result input");
        };
        assert_eq!(result.tool_call_id, "t1");
        assert_eq!(
            result.result,
            Some(ToolResultKind::RunShellCommand(RunShellCommandResult {
                command: String::new(),
                result: Some(ShellOutcome::CommandFinished(ShellCommandFinished {
                    output: "file1\nfile2".into(),
                    exit_code: 0,
                })),
            }))
        );
    }

    #[test]
    fn test_last_turn_with_text_and_results_keeps_query_first() {
        let request = MessagesRequest::new(
            "claude-opus-4-5-20251101",
            vec![
                ChatMessage::assistant(vec![ContentBlock::ToolUse {
                    id: "r1".into(),
                    name: "Read".into(),
                    input: json!({"file_path": "/work/a.rs"}),
                }]),
                ChatMessage {
                    role: Role::User,
                    content: Content::Blocks(vec![
                        ContentBlock::ToolResult {
                            tool_use_id: "r1".into(),
                            content: ToolResultContent::String("fn main() {}".into()),
                            is_error: None,
                        },
                        ContentBlock::text("now explain it"),
                    ]),
                },
            ],
        );
        let wire = translate(&request);
        let inputs = inputs(&wire);
        assert_eq!(inputs.len(), 2);
        assert!(matches!(&inputs[0], UserInput::UserQuery(q) if q.query == "now explain it"));
        assert!(matches!(
            &inputs[1],
            UserInput::ToolCallResult(ToolCallResult {
                result: Some(ToolResultKind::ReadFiles(_)),
                ..
            })
        ));
    }

    #[test]
    fn test_text_blocks_concatenate_without_separator() {
        let request = MessagesRequest::new(
            "claude-sonnet-4-20250514",
            vec![ChatMessage {
                role: Role::User,
                content: Content::Blocks(vec![
                    ContentBlock::text("fix the "),
                    ContentBlock::text("failing test"),
                ]),
            }],
        );
        let wire = translate(&request);
        assert!(matches!(
            &inputs(&wire)[0],
            UserInput::UserQuery(q) if q.query == "fix the failing test"
        ));
    }

    #[test]
    fn test_unknown_tool_result_defaults_to_shell_shape() {
        let request = MessagesRequest::new(
            "claude-4-sonnet",
            vec![ChatMessage {
                role: Role::User,
                content: Content::Blocks(vec![ContentBlock::ToolResult {
                    tool_use_id: "orphan".into(),
                    content: ToolResultContent::String("ok".into()),
                    is_error: Some(true),
                }]),
            }],
        );
        let wire = translate(&request);
        assert!(matches!(
            &inputs(&wire)[0],
            UserInput::ToolCallResult(ToolCallResult {
                result: Some(ToolResultKind::RunShellCommand(_)),
                ..
            })
        ));
    }

    #[test]
    fn test_system_prompt_becomes_project_rule() {
        let mut request = MessagesRequest::new("claude-4-sonnet", vec![ChatMessage::user("hi")]);
        request.system = Some(SystemContent::String("Be terse.".into()));
        let wire = translate(&request);

        let rules = &wire.input.context.as_ref().unwrap().project_rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].root_path, "/work");
        assert_eq!(rules[0].active_rule_files[0].file_path, RULES_FILE_PATH);
        assert_eq!(rules[0].active_rule_files[0].content, "Be terse.");
        assert!(only_task(&wire).messages.is_empty());
    }

    #[test]
    fn test_assistant_blocks_in_order_and_odd_blocks_skipped() {
        let request = MessagesRequest::new(
            "claude-4-sonnet",
            vec![
                ChatMessage::user("q"),
                ChatMessage::assistant(vec![
                    ContentBlock::Thinking {
                        thinking: "hmm".into(),
                        signature: None,
                    },
                    ContentBlock::text("answer"),
                    ContentBlock::Unsupported,
                    ContentBlock::ToolUse {
                        id: "g1".into(),
                        name: "mcp__search__query".into(),
                        input: json!({"q": "rust"}),
                    },
                ]),
                ChatMessage::user("thanks"),
            ],
        );
        let wire = translate(&request);
        let kinds: Vec<_> = only_task(&wire)
            .messages
            .iter()
            .map(|m| m.message.as_ref().unwrap().name())
            .collect();
        assert_eq!(
            kinds,
            vec!["user_query", "agent_reasoning", "agent_output", "tool_call"]
        );
        assert!(only_task(&wire).messages.iter().all(|m| m.task_id == wire.task_context.active_task_id));
    }

    #[test]
    fn test_conversation_id_precedence() {
        let mut request = MessagesRequest::new("claude-4-sonnet", vec![ChatMessage::user("hi")]);
        request.metadata = Some(json!({"session_id": "sess-1"}));

        let wire = translate(&request);
        assert_eq!(wire.metadata.conversation_id, "sess-1");

        let context = ExecutionContext::default().with_conversation_id("conv-9");
        let wire = build_wire_request(&request, &context, &ToolMapper::new());
        assert_eq!(wire.metadata.conversation_id, "conv-9");

        request.metadata = None;
        let wire = translate(&request);
        assert!(Uuid::parse_str(&wire.metadata.conversation_id).is_ok());
    }

    #[test]
    fn test_declared_tools_reduce_to_wire_types() {
        let mut request = MessagesRequest::new("claude-4-sonnet", vec![ChatMessage::user("hi")]);
        request.tools = Some(
            ["Bash", "Read", "Edit", "Write", "WebFetch", "NotebookEdit"]
                .iter()
                .map(|name| Tool {
                    name: name.to_string(),
                    description: None,
                    input_schema: json!({}),
                })
                .collect(),
        );
        let wire = translate(&request);
        assert_eq!(
            wire.settings.supported_tools,
            vec![
                ToolType::RunShellCommand,
                ToolType::ReadFiles,
                ToolType::ApplyFileDiffs,
                ToolType::CallMcpTool
            ]
        );
    }
}
