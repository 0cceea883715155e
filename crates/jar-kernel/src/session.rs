//! Per-process session state shared with every handler.
//!
//! The [`crate::Dispatcher`] owns exactly one [`SessionState`] and lends it
//! mutably to each handler call.  Nothing here is persisted; the state lives
//! as long as the process.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity used when the configuration does not provide one.
pub const DEFAULT_IDENTITY: &str = "Jarvis, an AI assistant";

/// Role of a participant in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation history, assistant identity, and free-form handler data.
#[derive(Debug, Clone)]
pub struct SessionState {
    identity: String,
    conversation: Vec<Turn>,
    values: HashMap<String, Value>,
}

impl SessionState {
    /// Create a session for the given assistant identity.
    ///
    /// The identity is also exposed under the `identity` key so handlers that
    /// only look at [`SessionState::get`] can find it.
    pub fn new(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        let mut values = HashMap::new();
        values.insert("identity".to_owned(), Value::String(identity.clone()));
        Self {
            identity,
            conversation: Vec::new(),
            values,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The conversation so far, oldest first.
    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    /// Mutable access to the conversation, seeding it with a system turn the
    /// first time it is used.
    pub fn conversation_or_seed(&mut self, system_prompt: &str) -> &mut Vec<Turn> {
        if self.conversation.is_empty() {
            self.conversation.push(Turn::system(system_prompt));
        }
        &mut self.conversation
    }

    /// Append a turn to the conversation.
    pub fn push_turn(&mut self, turn: Turn) {
        self.conversation.push(turn);
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Store a value, returning the previous one if present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Return the value for `key`, inserting `default()` first if absent.
    pub fn get_or_insert_with<F>(&mut self, key: &str, default: F) -> &mut Value
    where
        F: FnOnce() -> Value,
    {
        self.values.entry(key.to_owned()).or_insert_with(default)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_mirrored_into_values() {
        let session = SessionState::default();
        assert_eq!(session.identity(), DEFAULT_IDENTITY);
        assert_eq!(
            session.get("identity").and_then(Value::as_str),
            Some(DEFAULT_IDENTITY)
        );
    }

    #[test]
    fn conversation_is_seeded_once() {
        let mut session = SessionState::default();
        session.conversation_or_seed("be nice").push(Turn::user("hi"));
        session.conversation_or_seed("ignored").push(Turn::assistant("hello"));

        let turns = session.conversation();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0], Turn::system("be nice"));
        assert_eq!(turns[2].role, Role::Assistant);
    }

    #[test]
    fn get_or_insert_with_keeps_existing() {
        let mut session = SessionState::default();
        session.insert("counter", 1);
        let v = session.get_or_insert_with("counter", || Value::from(99));
        assert_eq!(v.as_i64(), Some(1));
    }
}
