//! The outbound `Request` tree and its input context.

use super::task::{Task, UserQuery};
use super::tool_result::ToolCallResult;
use super::tool_type::ToolType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fingerprint the upstream expects in `Platform.fingerprint` (fixed32).
pub const OS_FINGERPRINT: u32 = 0x534f_6361;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub task_context: TaskContext,
    pub input: Input,
    pub settings: Settings,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskContext {
    pub tasks: Vec<Task>,
    pub active_task_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Input {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<InputContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_inputs: Option<UserInputs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInputs {
    pub inputs: Vec<UserInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInput {
    UserQuery(UserQuery),
    ToolCallResult(ToolCallResult),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<Directory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<OperatingSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<Shell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_time: Option<DateTime<Utc>>,
    pub project_rules: Vec<ProjectRules>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directory {
    pub pwd: String,
    pub home: String,
    pub pwd_file_symbols_indexed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingSystem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    pub distribution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Platform {
    pub name: String,
    pub fingerprint: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shell {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFile {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRules {
    pub root_path: String,
    pub active_rule_files: Vec<RuleFile>,
    pub additional_rule_file_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base: String,
    pub planning: String,
    pub coding: String,
    pub cli_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfig>,
    pub rules_enabled: bool,
    pub web_context_retrieval_enabled: bool,
    pub supports_parallel_tool_calls: bool,
    pub use_anthropic_text_editor_tools: bool,
    pub planning_enabled: bool,
    pub warp_drive_context_enabled: bool,
    pub supports_create_files: bool,
    pub supported_tools: Vec<ToolType>,
    pub supports_long_running_commands: bool,
    pub should_preserve_file_content_in_history: bool,
    pub supports_todos_ui: bool,
    pub supports_linked_code_blocks: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub conversation_id: String,
    pub logging: Vec<LoggingEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<LoggingValue>,
}

impl LoggingEntry {
    pub fn enum_value(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Some(LoggingValue::EnumValue(EnumValue {
                name: name.to_string(),
            })),
        }
    }

    pub fn bool_value(key: &str, value: bool) -> Self {
        Self {
            key: key.to_string(),
            value: Some(LoggingValue::BoolValue(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingValue {
    EnumValue(EnumValue),
    BoolValue(bool),
    StringValue(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumValue {
    pub name: String,
}
