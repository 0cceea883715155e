//! The `chat` plugin source.

use std::sync::Arc;

use jar_kernel::{IntentDescriptor, SharedHandler, StaticSource};

use crate::backend::{ChatBackendConfig, OpenAiCompatibleBackend};
use crate::credentials::ApiKeyResolver;
use crate::error::Result;
use crate::handler::ChatHandler;

/// Source name and intent name.
pub const CHAT_PLUGIN: &str = "chat";

/// Name under which the chat handler is exported.
pub const CHAT_HANDLER: &str = "handle_chat";

pub const CHAT_EXAMPLES: [&str; 7] = [
    "chat",
    "talk to jarvis",
    "let's talk",
    "hey",
    "hello",
    "hi",
    "help",
];

/// The intent declared by the chat plugin.
pub fn chat_descriptor() -> IntentDescriptor {
    IntentDescriptor::new(CHAT_PLUGIN, CHAT_EXAMPLES, CHAT_HANDLER)
        .with_threshold(0.2)
        .with_description("General conversation with Jarvis.")
}

/// A source exporting `handler` as [`CHAT_HANDLER`] with the chat intent.
pub fn chat_source(handler: SharedHandler) -> StaticSource {
    StaticSource::new(CHAT_PLUGIN)
        .handler(CHAT_HANDLER, handler)
        .intent(chat_descriptor())
}

/// A [`ChatHandler`] over the OpenAI-compatible backend configured from the
/// environment.
pub fn default_chat_handler() -> Result<SharedHandler> {
    let backend = OpenAiCompatibleBackend::new(ChatBackendConfig::from_env(), ApiKeyResolver::new())?;
    Ok(Arc::new(ChatHandler::new(Arc::new(backend))?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
