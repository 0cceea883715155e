//! The assistant façade.
//!
//! Ties the embedder, registry, plugin loader and dispatcher together.
//! Front ends (the REPL, one-shot commands, tests) only talk to this type.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::config::JarConfig;
use crate::dispatcher::{Decision, Dispatcher};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::intent::{Intent, IntentMatch};
use crate::plugin::PluginLoader;
use crate::registry::IntentRegistry;
use crate::router::Router;
use crate::session::SessionState;

/// A ready-to-use assistant.
pub struct Assistant {
    name: String,
    registry: IntentRegistry,
    loader: PluginLoader,
    dispatcher: Dispatcher,
}

impl Assistant {
    /// Build the assistant and run an initial discovery pass.
    pub fn new(
        config: &JarConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        loader: PluginLoader,
    ) -> Self {
        let session = SessionState::new(config.assistant.identity.clone());
        let mut assistant = Self {
            name: config.assistant.name.clone(),
            registry: IntentRegistry::new(embedder),
            loader,
            dispatcher: Dispatcher::new(session),
        };
        assistant.discover();
        assistant
    }

    /// Re-run plugin discovery, replacing every registered intent.
    ///
    /// The session (conversation history included) survives.
    pub fn discover(&mut self) {
        self.loader.discover(&mut self.registry);
        info!(
            assistant = %self.name,
            intents = self.registry.len(),
            failed = self.loader.errors().len(),
            "assistant ready"
        );
    }

    pub fn route(&self, text: &str) -> Option<IntentMatch> {
        Router::new(&self.registry).route(text)
    }

    pub fn score_all(&self, text: &str) -> Vec<IntentMatch> {
        Router::new(&self.registry).score_all(text)
    }

    /// Route `text` and apply the confidence policy without running a handler.
    pub fn decide(&self, text: &str) -> Decision {
        Decision::decide(&self.registry, self.route(text))
    }

    /// Route and dispatch one line of user input.
    pub async fn handle(&mut self, text: &str) -> Result<Option<String>> {
        self.dispatcher.dispatch(&self.registry, text).await
    }

    /// Failures recorded by the last discovery pass.
    pub fn plugin_errors(&self) -> &BTreeMap<String, String> {
        self.loader.errors()
    }

    pub fn intents(&self) -> &[Intent] {
        self.registry.intents()
    }

    pub fn registry(&self) -> &IntentRegistry {
        &self.registry
    }

    pub fn session(&self) -> &SessionState {
        self.dispatcher.session()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::NOT_UNDERSTOOD;
    use crate::embedding::HashingEmbedder;
    use crate::handler::{handler_fn, text_handler};
    use crate::intent::IntentDescriptor;
    use crate::plugin::StaticSource;

    fn assistant(loader: PluginLoader) -> Assistant {
        Assistant::new(
            &JarConfig::default(),
            Arc::new(HashingEmbedder::new()),
            loader,
        )
    }

    fn greeter() -> StaticSource {
        StaticSource::new("greeter")
            .handler("greet", text_handler(|_| Ok(Some("hello there".into()))))
            .intent(IntentDescriptor::new("greet", ["good morning"], "greet"))
    }

    #[test]
    fn new_runs_discovery() {
        let a = assistant(PluginLoader::new().with_source(greeter()));
        assert_eq!(a.intents().len(), 1);
        assert!(a.plugin_errors().is_empty());
        assert_eq!(a.name(), "Jarvis");
    }

    #[test]
    fn session_uses_configured_identity() {
        let mut config = JarConfig::default();
        config.assistant.identity = "Friday, a helper".into();
        let a = Assistant::new(&config, Arc::new(HashingEmbedder::new()), PluginLoader::new());
        assert_eq!(a.session().identity(), "Friday, a helper");
    }

    #[test]
    fn decide_reports_not_understood_without_intents() {
        let a = assistant(PluginLoader::new());
        assert!(matches!(a.decide("anything"), Decision::NotUnderstood { rejected: None }));
    }

    #[tokio::test]
    async fn handle_dispatches_through_registry() {
        let mut a = assistant(PluginLoader::new().with_source(greeter()));
        let out = a.handle("good morning").await.unwrap();
        assert_eq!(out.as_deref(), Some("hello there"));
    }

    #[tokio::test]
    async fn empty_assistant_does_not_understand() {
        let mut a = assistant(PluginLoader::new());
        let out = a.handle("hello").await.unwrap();
        assert_eq!(out.as_deref(), Some(NOT_UNDERSTOOD));
    }

    #[tokio::test]
    async fn rediscovery_keeps_session() {
        let remember = handler_fn(|text, session| {
            session.insert("last", text);
            Ok(None)
        });
        let source = StaticSource::new("memo")
            .intent(IntentDescriptor::new("memo", ["remember this"], remember));

        let mut a = assistant(PluginLoader::new().with_source(source));
        a.handle("remember this").await.unwrap();
        a.discover();

        assert_eq!(
            a.session().get("last").and_then(|v| v.as_str()),
            Some("remember this")
        );
        assert_eq!(a.intents().len(), 1);
    }
}
