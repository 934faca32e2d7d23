//! Error types for the Warp backend

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// One schema file could not be read or compiled. Logged and skipped during load.
    #[error("failed to load schema file {file}: {message}")]
    Load { file: String, message: String },

    #[error("schema registry has not been loaded")]
    NotReady,

    #[error("schema type not found: {0}")]
    TypeNotFound(String),

    #[error("schema loader task failed: {0}")]
    LoaderTask(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid value at `{path}`: {reason}")]
    Encoding { path: String, reason: String },

    #[error("failed to decode frame: {0}")]
    Decoding(String),
}

/// A content block the translator could not place. Never returned to callers;
/// the block is logged and skipped.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("message {message_index}: unsupported {block} block")]
    UnsupportedBlock {
        message_index: usize,
        block: &'static str,
    },

    #[error("message {message_index}: {block} block is not valid for this role")]
    MisplacedBlock {
        message_index: usize,
        block: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum WarpError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("stream aborted: {0}")]
    StreamAborted(String),

    #[error("stream ended before the upstream finished the turn")]
    IncompleteStream,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<SchemaError> for WarpError {
    fn from(err: SchemaError) -> Self {
        WarpError::Codec(CodecError::Schema(err))
    }
}

impl WarpError {
    /// True when the turn ended abnormally after output may already have been emitted.
    pub fn is_mid_stream(&self) -> bool {
        matches!(self, Self::StreamAborted(_) | Self::IncompleteStream)
    }
}

pub type Result<T, E = WarpError> = std::result::Result<T, E>;
