//! Confidence-fallback dispatch.
//!
//! The dispatcher trusts the router's best match only when its score clears
//! [`CONFIDENCE_FLOOR`].  Anything weaker (or no match at all) is redirected
//! to the intent named [`FALLBACK_INTENT`]; without one the request gets the
//! fixed [`NOT_UNDERSTOOD`] reply.
//!
//! The floor is global.  Per-intent thresholds are carried on
//! [`crate::Intent`] but not consulted here.

use tracing::{debug, info};

use crate::error::Result;
use crate::intent::{Intent, IntentMatch};
use crate::registry::IntentRegistry;
use crate::router::Router;
use crate::session::SessionState;

/// Minimum blended score for a match to be dispatched directly.
pub const CONFIDENCE_FLOOR: f64 = 0.4;

/// Name of the conversational intent that catches low-confidence input.
pub const FALLBACK_INTENT: &str = "chat";

/// Reply when nothing matched and no fallback intent is registered.
pub const NOT_UNDERSTOOD: &str = "I don't understand.";

/// Which handler a request ends up with.
#[derive(Debug, Clone)]
pub enum Decision {
    /// The router's best match cleared the floor.
    Matched(IntentMatch),
    /// Confidence was too low; the fallback intent takes over.  Carries the
    /// rejected best match, if there was one.
    Fallback {
        intent: Intent,
        rejected: Option<IntentMatch>,
    },
    /// Nothing suitable and no fallback intent registered.
    NotUnderstood { rejected: Option<IntentMatch> },
}

impl Decision {
    /// Apply the confidence policy to a routing result.
    pub fn decide(registry: &IntentRegistry, best: Option<IntentMatch>) -> Self {
        match best {
            Some(m) if m.score >= CONFIDENCE_FLOOR => Self::Matched(m),
            rejected => match registry.find(FALLBACK_INTENT) {
                Some(chat) => Self::Fallback {
                    intent: chat.clone(),
                    rejected,
                },
                None => Self::NotUnderstood { rejected },
            },
        }
    }

    /// The intent that will handle the request.
    pub fn intent(&self) -> Option<&Intent> {
        match self {
            Self::Matched(m) => Some(&m.intent),
            Self::Fallback { intent, .. } => Some(intent),
            Self::NotUnderstood { .. } => None,
        }
    }
}

/// Routes input, applies the fallback policy, and calls handlers with the
/// session it owns.
#[derive(Debug, Default)]
pub struct Dispatcher {
    session: SessionState,
}

impl Dispatcher {
    pub fn new(session: SessionState) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// Route `text` against `registry` and invoke the chosen handler.
    ///
    /// Handler errors are returned unchanged; the caller decides how to
    /// surface them.
    pub async fn dispatch(&mut self, registry: &IntentRegistry, text: &str) -> Result<Option<String>> {
        let best = Router::new(registry).route(text);
        let decision = Decision::decide(registry, best);
        self.execute(decision, text).await
    }

    /// Invoke the handler selected by `decision`.
    pub async fn execute(&mut self, decision: Decision, text: &str) -> Result<Option<String>> {
        let intent = match decision {
            Decision::Matched(m) => {
                debug!(intent = %m.intent.name(), score = m.score, "dispatching");
                m.intent
            }
            Decision::Fallback { intent, rejected } => {
                info!(
                    rejected = rejected.as_ref().map(|m| m.intent.name()).unwrap_or("<none>"),
                    score = rejected.as_ref().map(|m| m.score).unwrap_or(0.0),
                    fallback = %intent.name(),
                    "low confidence, falling back"
                );
                intent
            }
            Decision::NotUnderstood { .. } => {
                info!("low confidence and no fallback intent registered");
                return Ok(Some(NOT_UNDERSTOOD.to_owned()));
            }
        };

        intent.handler().handle(text, &mut self.session).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::handler::{handler_fn, text_handler};

    fn reply(name: &'static str) -> crate::handler::SharedHandler {
        text_handler(move |_| Ok(Some(name.to_owned())))
    }

    fn registry_with(intents: Vec<Intent>) -> IntentRegistry {
        let mut reg = IntentRegistry::new(Arc::new(HashingEmbedder::new()));
        for i in intents {
            reg.register(i);
        }
        reg.rebuild_matchers();
        reg
    }

    #[tokio::test]
    async fn empty_registry_does_not_understand() {
        let reg = registry_with(Vec::new());
        let mut dispatcher = Dispatcher::default();
        let out = dispatcher.dispatch(&reg, "hello").await.unwrap();
        assert_eq!(out.as_deref(), Some(NOT_UNDERSTOOD));
    }

    #[tokio::test]
    async fn confident_match_is_dispatched() {
        let reg = registry_with(vec![
            Intent::new("chat", ["hey"], reply("chat"), "chat"),
            Intent::new("timer", ["set a timer"], reply("timer"), "timer"),
        ]);
        let mut dispatcher = Dispatcher::default();
        let out = dispatcher.dispatch(&reg, "set a timer").await.unwrap();
        assert_eq!(out.as_deref(), Some("timer"));
    }

    #[tokio::test]
    async fn low_confidence_goes_to_chat() {
        let reg = registry_with(vec![
            Intent::new("timer", ["set a timer"], reply("timer"), "timer"),
            Intent::new("chat", ["hey"], reply("chat"), "chat"),
        ]);
        let best = Router::new(&reg).route("quantum chromodynamics");
        assert!(best.as_ref().unwrap().score < CONFIDENCE_FLOOR);

        let mut dispatcher = Dispatcher::default();
        let out = dispatcher
            .dispatch(&reg, "quantum chromodynamics")
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("chat"));
    }

    #[tokio::test]
    async fn low_confidence_without_chat_does_not_understand() {
        let reg = registry_with(vec![Intent::new(
            "timer",
            ["set a timer"],
            reply("timer"),
            "timer",
        )]);
        let mut dispatcher = Dispatcher::default();
        let out = dispatcher.dispatch(&reg, "zzz").await.unwrap();
        assert_eq!(out.as_deref(), Some(NOT_UNDERSTOOD));
    }

    #[tokio::test]
    async fn per_intent_threshold_is_not_enforced() {
        let strict = Intent::new("timer", ["set a timer"], reply("timer"), "timer")
            .with_threshold(0.99);
        let reg = registry_with(vec![strict]);

        let decision = Decision::decide(&reg, Router::new(&reg).route("set a timer please"));
        assert!(matches!(decision, Decision::Matched(_)));
    }

    #[tokio::test]
    async fn handler_mutates_owned_session() {
        let counting = handler_fn(|_, session| {
            let n = session.get("turns").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
            session.insert("turns", n);
            Ok(None)
        });
        let reg = registry_with(vec![Intent::new("chat", ["hello"], counting, "chat")]);

        let mut dispatcher = Dispatcher::default();
        dispatcher.dispatch(&reg, "hello").await.unwrap();
        dispatcher.dispatch(&reg, "hello").await.unwrap();

        assert_eq!(
            dispatcher.session().get("turns").and_then(|v| v.as_u64()),
            Some(2)
        );
    }

    #[tokio::test]
    async fn handler_errors_are_not_swallowed() {
        let failing = text_handler(|_| Err(crate::KernelError::handler("backend down")));
        let reg = registry_with(vec![Intent::new("chat", ["hello"], failing, "chat")]);

        let mut dispatcher = Dispatcher::default();
        assert!(dispatcher.dispatch(&reg, "hello").await.is_err());
    }
}
