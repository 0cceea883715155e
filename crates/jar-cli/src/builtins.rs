//! Statically linked handlers and assistant assembly.
//!
//! Manifests in the modules directory can only bind to handlers listed in
//! the catalog built here.

use std::sync::Arc;

use anyhow::{Context, Result};
use jar_chat::{CHAT_HANDLER, chat_source, default_chat_handler};
use jar_kernel::plugin::DEFAULT_CHAT_HANDLER;
use jar_kernel::{
    Assistant, HandlerCatalog, HashingEmbedder, JarConfig, ManifestDirectory, PluginLoader,
    SharedHandler, handler_fn, nullary_handler,
};
use tracing::info;

/// Handler names available to manifests.
pub const CURRENT_TIME: &str = "current_time";
pub const CURRENT_DATE: &str = "current_date";
pub const WHOAMI: &str = "whoami";
pub const FORGET: &str = "forget_conversation";

/// Build the catalog, exposing `chat` under both chat handler names.
pub fn handler_catalog(chat: SharedHandler) -> HandlerCatalog {
    HandlerCatalog::new()
        .with(
            CURRENT_TIME,
            nullary_handler(|| {
                let now = chrono::Local::now();
                Ok(Some(format!("It's {}.", now.format("%H:%M"))))
            }),
        )
        .with(
            CURRENT_DATE,
            nullary_handler(|| {
                let today = chrono::Local::now();
                Ok(Some(format!("Today is {}.", today.format("%A, %B %-d, %Y"))))
            }),
        )
        .with(
            WHOAMI,
            handler_fn(|_, session| Ok(Some(format!("I'm {}.", session.identity())))),
        )
        .with(
            FORGET,
            handler_fn(|_, session| {
                session.clear_conversation();
                Ok(Some("Okay, I've forgotten our conversation.".to_owned()))
            }),
        )
        .with(CHAT_HANDLER, chat.clone())
        .with(DEFAULT_CHAT_HANDLER, chat)
}

/// Wire the chat plugin and the manifest directory into an [`Assistant`].
pub fn build_assistant(config: &JarConfig) -> Result<Assistant> {
    let chat = default_chat_handler().context("failed to initialise chat backend")?;
    Ok(assemble(config, chat))
}

/// Same as [`build_assistant`] with a caller-supplied chat handler.
pub fn assemble(config: &JarConfig, chat: SharedHandler) -> Assistant {
    let modules_dir = config.assistant.modules_dir.clone();
    info!(dir = %modules_dir.display(), "using modules directory");

    let loader = PluginLoader::new()
        .with_source(chat_source(chat.clone()))
        .with_manifest_dir(ManifestDirectory::new(modules_dir, handler_catalog(chat)));

    Assistant::new(config, Arc::new(HashingEmbedder::new()), loader)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jar_kernel::{SessionState, text_handler};

    fn stub_chat() -> SharedHandler {
        text_handler(|t| Ok(Some(format!("chat: {t}"))))
    }

    #[test]
    fn catalog_lists_builtins() {
        let catalog = handler_catalog(stub_chat());
        for name in [
            CURRENT_TIME,
            CURRENT_DATE,
            WHOAMI,
            FORGET,
            CHAT_HANDLER,
            DEFAULT_CHAT_HANDLER,
        ] {
            assert!(catalog.contains(name), "{name} missing");
        }
    }

    #[tokio::test]
    async fn whoami_reads_session_identity() {
        let catalog = handler_catalog(stub_chat());
        let mut session = SessionState::new("Friday, a helper");
        let out = catalog
            .get(WHOAMI)
            .unwrap()
            .handle("who are you", &mut session)
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("I'm Friday, a helper."));
    }

    #[tokio::test]
    async fn current_time_formats_clock() {
        let catalog = handler_catalog(stub_chat());
        let mut session = SessionState::default();
        let out = catalog
            .get(CURRENT_TIME)
            .unwrap()
            .handle("", &mut session)
            .await
            .unwrap()
            .unwrap();
        assert!(out.starts_with("It's "));
        assert_eq!(out.len(), "It's 12:34.".len());
    }

    #[tokio::test]
    async fn assembled_assistant_loads_manifests() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("identity.toml"),
            "[[intents]]\nname = \"whoami\"\nexamples = [\"who are you\"]\nhandler = \"whoami\"\n",
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("broken.toml"),
            "[[intents]]\nname = \"weather\"\nexamples = [\"weather\"]\nhandler = \"weather_api\"\n",
        )
        .unwrap();

        let mut config = JarConfig::default();
        config.assistant.modules_dir = tmp.path().to_path_buf();

        let mut assistant = assemble(&config, stub_chat());
        let names: Vec<&str> = assistant.intents().iter().map(|i| i.name()).collect();
        assert_eq!(names, ["chat", "whoami"]);
        assert!(assistant.plugin_errors()["broken"].contains("weather_api"));

        let out = assistant.handle("who are you").await.unwrap();
        assert_eq!(out.as_deref(), Some("I'm Jarvis, an AI assistant."));

        let out = assistant.handle("tell me about octopuses").await.unwrap();
        assert_eq!(out.as_deref(), Some("chat: tell me about octopuses"));
    }
}
