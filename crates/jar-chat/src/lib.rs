//! Jar chat plugin.
//!
//! Provides the conversational fallback intent for the Jar assistant:
//!
//! - **[`backend`]** -- [`ConversationBackend`] trait and an OpenAI-compatible
//!   Chat Completions client (Groq by default).
//! - **[`credentials`]** -- API key lookup in the environment, then `.env`.
//! - **[`clean`]** -- Strips `<think>` blocks and final-answer markers from
//!   model output.
//! - **[`handler`]** -- [`ChatHandler`], which keeps the conversation history
//!   in the session.
//! - **[`plugin`]** -- The `chat` plugin source.

pub mod backend;
pub mod clean;
pub mod credentials;
pub mod error;
pub mod handler;
pub mod plugin;

pub use backend::{ChatBackendConfig, ConversationBackend, OpenAiCompatibleBackend};
pub use clean::OutputCleaner;
pub use credentials::{API_KEY_ENV, ApiKeyResolver};
pub use error::{ChatError, Result};
pub use handler::{ChatHandler, NO_KEY_REPLY, SYSTEM_PROMPT};
pub use plugin::{CHAT_HANDLER, CHAT_PLUGIN, chat_descriptor, chat_source, default_chat_handler};
