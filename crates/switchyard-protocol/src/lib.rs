//! Normalized Anthropic "Messages" surface shared by every switchyard backend.
//!
//! Backends translate their own wire formats into these types: a single
//! [`MessagesResponse`] for buffered calls, or an ordered run of
//! [`StreamEvent`]s for streaming ones.

pub mod messages;
pub mod stream;

pub use messages::*;
pub use stream::*;
