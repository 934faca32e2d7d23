use serde::{Deserialize, Serialize};

/// `ToolType` enum; discriminants are the wire numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolType {
    RunShellCommand = 0,
    SearchCodebase = 1,
    ReadFiles = 2,
    ApplyFileDiffs = 3,
    SuggestPlan = 4,
    SuggestCreatePlan = 5,
    Grep = 6,
    FileGlob = 7,
    ReadMcpResource = 8,
    CallMcpTool = 9,
    WriteToLongRunningShellCommand = 10,
    SuggestNewConversation = 11,
    FileGlobV2 = 12,
    SuggestPrompt = 13,
    OpenCodeReview = 14,
    InitProject = 15,
    Subagent = 16,
    ReadDocuments = 17,
    EditDocuments = 18,
    CreateDocuments = 19,
    ReadShellCommandOutput = 20,
    UseComputer = 21,
    InsertReviewComments = 22,
    ReadSkill = 23,
    RequestComputerUse = 24,
}
