//! Chat error types.
//!
//! Backend and `.env` read failures surface as [`ChatError`].  The chat
//! handler turns most of them into a user-facing reply instead of
//! propagating them to the dispatcher.

/// Unified error type for the chat plugin.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The HTTP request to the completion endpoint failed.
    #[error("chat request failed: {reason}")]
    RequestFailed { reason: String },

    /// The completion response could not be parsed.
    #[error("chat response parse error: {reason}")]
    ParseFailed { reason: String },

    /// An output-cleaning pattern failed to compile.
    #[error("invalid cleaning pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Reading the `.env` file failed.
    #[error("dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// Convenience alias used throughout the chat crate.
pub type Result<T> = std::result::Result<T, ChatError>;

