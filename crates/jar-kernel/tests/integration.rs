//! Integration tests for the jar-kernel crate.
//!
//! These exercise the full discover -> route -> dispatch pipeline through the
//! public API only.

use std::sync::{Arc, Mutex};

use jar_kernel::{
    Assistant, CONFIDENCE_FLOOR, Decision, EmbeddingProvider, HandlerCatalog, HashingEmbedder,
    IntentDescriptor, JarConfig, KernelError, ManifestDirectory, NOT_UNDERSTOOD, PluginLoader,
    PluginModule, PluginSource, StaticSource, handler_fn, nullary_handler, text_handler,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build(loader: PluginLoader) -> Assistant {
    Assistant::new(
        &JarConfig::default(),
        Arc::new(HashingEmbedder::new()),
        loader,
    )
}

fn replying(name: &'static str, examples: &[&'static str]) -> StaticSource {
    StaticSource::new(name).intent(IntentDescriptor::new(
        name,
        examples.iter().copied(),
        text_handler(move |_| Ok(Some(name.to_owned()))),
    ))
}

struct Failing(&'static str, &'static str);

impl PluginSource for Failing {
    fn name(&self) -> &str {
        self.0
    }

    fn load(&self) -> jar_kernel::Result<PluginModule> {
        Err(KernelError::ConfigError {
            reason: self.1.to_owned(),
        })
    }
}

struct Exploding;

impl PluginSource for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    fn load(&self) -> jar_kernel::Result<PluginModule> {
        Err(KernelError::InvalidManifest {
            path: "exploding.toml".into(),
            reason: "syntax error in module".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hello_routes_to_chat_with_phrase_hit() {
    let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
    let sink = seen.clone();

    let chat = handler_fn(move |text, session| {
        if let Ok(mut calls) = sink.lock() {
            calls.push((text.to_owned(), session.identity().to_owned()));
        }
        Ok(Some("hi!".into()))
    });

    let mut assistant = build(
        PluginLoader::new()
            .with_source(
                StaticSource::new("chat")
                    .intent(IntentDescriptor::new("chat", ["hey", "hello", "hi"], chat)),
            )
            .with_source(replying("weather", &["what's the weather"])),
    );

    let best = assistant.route("hello").unwrap();
    assert_eq!(best.intent.name(), "chat");
    assert_eq!(best.lexical, 1.0);
    assert!(best.score >= CONFIDENCE_FLOOR);

    let out = assistant.handle("hello").await.unwrap();
    assert_eq!(out.as_deref(), Some("hi!"));

    let calls = seen.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "hello");
    assert_eq!(calls[0].1, "Jarvis, an AI assistant");
}

#[test]
fn scores_stay_in_unit_interval() {
    let assistant = build(
        PluginLoader::new()
            .with_source(replying("timer", &["set a timer", "start a countdown"]))
            .with_source(replying("notes", &["take a note", "write this down"])),
    );

    for text in ["", "set a timer", "TAKE A NOTE now", "ünïcödé ☃", "a"] {
        for m in assistant.score_all(text) {
            assert!((0.0..=1.0).contains(&m.score), "{text}: {}", m.score);
            assert!((0.0..=1.0).contains(&m.semantic));
        }
    }
}

#[test]
fn example_embeds_identically_to_itself() {
    let embedder = HashingEmbedder::new();
    for example in ["what time is it", "hello", "tell me a joke"] {
        let a = embedder.embed(example).unwrap();
        let b = embedder.embed(example).unwrap();
        assert_eq!(embedder.similarity(&a, &b), 1.0);
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_intents_means_not_understood() {
    let mut assistant = build(PluginLoader::new());
    assert!(assistant.route("hello").is_none());
    assert_eq!(
        assistant.handle("hello").await.unwrap().as_deref(),
        Some(NOT_UNDERSTOOD)
    );
}

#[tokio::test]
async fn weak_match_falls_back_to_chat() {
    let mut assistant = build(
        PluginLoader::new()
            .with_source(replying("chat", &["hey"]))
            .with_source(replying("timer", &["set a timer"])),
    );

    let decision = assistant.decide("photosynthesis in cacti");
    assert!(matches!(decision, Decision::Fallback { .. }));

    let out = assistant.handle("photosynthesis in cacti").await.unwrap();
    assert_eq!(out.as_deref(), Some("chat"));
}

#[tokio::test]
async fn text_only_and_nullary_handlers_dispatch() {
    let mut assistant = build(
        PluginLoader::new()
            .with_source(
                StaticSource::new("echo")
                    .handler("echo", text_handler(|t| Ok(Some(t.to_uppercase()))))
                    .intent(IntentDescriptor::new("echo", ["echo this"], "echo")),
            )
            .with_source(StaticSource::new("ping").intent(IntentDescriptor::new(
                "ping",
                ["ping"],
                nullary_handler(|| Ok(Some("pong".into()))),
            ))),
    );

    assert_eq!(
        assistant.handle("echo this").await.unwrap().as_deref(),
        Some("ECHO THIS")
    );
    assert_eq!(assistant.handle("ping").await.unwrap().as_deref(), Some("pong"));
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn one_failing_source_does_not_block_others() {
    let assistant = build(
        PluginLoader::new()
            .with_source(replying("alarm", &["wake me up"]))
            .with_source(Exploding)
            .with_source(replying("weather", &["what's the weather"])),
    );

    let names: Vec<&str> = assistant.intents().iter().map(|i| i.name()).collect();
    assert_eq!(names, ["alarm", "weather"]);
    assert_eq!(assistant.plugin_errors().len(), 1);
    assert!(assistant.plugin_errors()["exploding"].contains("syntax error"));
}

#[tokio::test]
async fn manifest_directory_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("modules");
    std::fs::create_dir_all(&dir).unwrap();

    std::fs::write(
        dir.join("clock.toml"),
        r#"
description = "Tells the time."

[[intents]]
name = "time"
examples = ["what time is it", "current time"]
handler = "current_time"
threshold = 0.3
"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("music.toml"),
        r#"
requires = ["audio_output"]

[[intents]]
name = "play"
examples = ["play some music"]
handler = "play_music"
"#,
    )
    .unwrap();
    std::fs::write(dir.join("_draft.toml"), "not = [valid").unwrap();

    let catalog =
        HandlerCatalog::new().with("current_time", nullary_handler(|| Ok(Some("noon".into()))));

    let mut assistant = build(PluginLoader::new().with_manifest_dir(ManifestDirectory::new(
        &dir, catalog,
    )));

    assert_eq!(assistant.intents().len(), 1);
    assert_eq!(assistant.intents()[0].threshold(), 0.3);
    assert!(assistant.plugin_errors()["music"].contains("audio_output"));

    let out = assistant.handle("what time is it").await.unwrap();
    assert_eq!(out.as_deref(), Some("noon"));

    std::fs::remove_file(dir.join("music.toml")).unwrap();
    assistant.discover();
    assert!(assistant.plugin_errors().is_empty());
}

#[test]
fn same_named_source_failures_are_both_reported() {
    let assistant = build(
        PluginLoader::new()
            .with_source(Failing("chat", "static chat module missing"))
            .with_source(Failing("chat", "chat.toml is malformed")),
    );

    let errors = assistant.plugin_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors["chat"].contains("static chat module missing"));
    assert!(errors["chat"].contains("chat.toml is malformed"));
}
