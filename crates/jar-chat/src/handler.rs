//! The conversational handler.

use std::sync::Arc;

use async_trait::async_trait;
use jar_kernel::{Handler, SessionState, Turn};
use tracing::{debug, warn};

use crate::backend::ConversationBackend;
use crate::clean::OutputCleaner;
use crate::error::Result;

/// System prompt seeded into every new conversation.
pub const SYSTEM_PROMPT: &str = "You are Jarvis, a friendly, helpful, and highly capable personal AI assistant. \
Always respond politely and clearly, with concise and actionable answers. \
Never reveal internal reasoning. If you need to think, put it ONLY inside <think>...</think> tags. \
Your output to the user must contain ONLY the final answer (no analysis, no scratchpad, no meta commentary).";

/// Reply when no API key is configured.
pub const NO_KEY_REPLY: &str = "To enable chat, set `GROQ_API_KEY`.";

/// Free-form conversation backed by a [`ConversationBackend`].
///
/// History lives in the session, so it survives plugin rediscovery.
/// Backend failures become a `Chat failed: ...` reply rather than an error.
pub struct ChatHandler {
    backend: Arc<dyn ConversationBackend>,
    cleaner: OutputCleaner,
}

impl ChatHandler {
    pub fn new(backend: Arc<dyn ConversationBackend>) -> Result<Self> {
        Ok(Self {
            backend,
            cleaner: OutputCleaner::new()?,
        })
    }
}

#[async_trait]
impl Handler for ChatHandler {
    async fn handle(
        &self,
        text: &str,
        session: &mut SessionState,
    ) -> jar_kernel::Result<Option<String>> {
        let Some(api_key) = self.backend.api_key() else {
            return Ok(Some(NO_KEY_REPLY.to_owned()));
        };

        session.conversation_or_seed(SYSTEM_PROMPT).push(Turn::user(text));

        match self.backend.complete(&api_key, session.conversation()).await {
            Ok(raw) => {
                let reply = self.cleaner.clean(&raw);
                debug!(
                    raw_len = raw.len(),
                    reply_len = reply.len(),
                    turns = session.conversation().len(),
                    "chat completion received"
                );
                session.push_turn(Turn::assistant(reply.clone()));
                Ok(Some(reply))
            }
            Err(e) => {
                warn!(error = %e, "chat backend failed");
                Ok(Some(format!("Chat failed: {e}")))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
