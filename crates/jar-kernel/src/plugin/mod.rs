//! Plugin discovery and intent loading.
//!
//! A [`PluginSource`] produces a [`PluginModule`]: the intent descriptors it
//! declares plus the named handlers it exports.  The [`PluginLoader`] turns
//! every module into validated [`Intent`]s and registers them.
//!
//! Each source is loaded in isolation.  When a source fails (it cannot be
//! read, declares a handler it does not export, or depends on a missing
//! capability) the failure is recorded under the source name and discovery
//! carries on with the next source.  A failing source contributes no
//! intents at all.
//!
//! Sources are processed in lexicographic order of their name, so
//! registration order (and therefore router tie-breaking) is reproducible.

pub mod manifest;
pub mod static_source;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{KernelError, Result};
use crate::handler::SharedHandler;
use crate::intent::{HandlerRef, Intent, IntentDescriptor};
use crate::registry::IntentRegistry;

pub use manifest::{HandlerCatalog, ManifestDirectory, ManifestSource};
pub use static_source::StaticSource;

/// Exported handler name that marks a module as a conversational plugin
/// when it declares no intents of its own.
pub const DEFAULT_CHAT_HANDLER: &str = "chat_with_jarvis";

/// Examples of the intent synthesized for [`DEFAULT_CHAT_HANDLER`].
pub const DEFAULT_CHAT_EXAMPLES: [&str; 3] = ["talk", "chat", "hey"];

// ---------------------------------------------------------------------------
// Source trait and module
// ---------------------------------------------------------------------------

/// An external unit contributing intents.
pub trait PluginSource: Send + Sync {
    /// Identifier used for ordering and error attribution.
    fn name(&self) -> &str;

    /// Load the module.  Called once per discovery pass.
    fn load(&self) -> Result<PluginModule>;
}

/// What a source yields: descriptors plus exported handlers.
#[derive(Clone, Default)]
pub struct PluginModule {
    intents: Vec<IntentDescriptor>,
    handlers: HashMap<String, SharedHandler>,
}

impl PluginModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_intent(mut self, descriptor: IntentDescriptor) -> Self {
        self.intents.push(descriptor);
        self
    }

    #[must_use]
    pub fn with_handler(mut self, name: impl Into<String>, handler: SharedHandler) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn add_intent(&mut self, descriptor: IntentDescriptor) {
        self.intents.push(descriptor);
    }

    pub fn add_handler(&mut self, name: impl Into<String>, handler: SharedHandler) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn intents(&self) -> &[IntentDescriptor] {
        &self.intents
    }

    /// Look up an exported handler by name.
    pub fn handler(&self, name: &str) -> Option<SharedHandler> {
        self.handlers.get(name).cloned()
    }
}

impl std::fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginModule")
            .field("intents", &self.intents)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Descriptor extraction
// ---------------------------------------------------------------------------

/// The descriptors a module contributes.
///
/// A module that declares nothing but exports [`DEFAULT_CHAT_HANDLER`] gets
/// a single synthesized `chat` intent bound to that handler.
pub fn extract_intents(module: &PluginModule) -> Vec<IntentDescriptor> {
    if !module.intents().is_empty() {
        return module.intents().to_vec();
    }

    if module.handler(DEFAULT_CHAT_HANDLER).is_some() {
        return vec![IntentDescriptor::new(
            "chat",
            DEFAULT_CHAT_EXAMPLES,
            DEFAULT_CHAT_HANDLER,
        )];
    }

    Vec::new()
}

/// Validate a descriptor against its module and build the [`Intent`].
pub fn intent_from_descriptor(
    descriptor: IntentDescriptor,
    module: &PluginModule,
    plugin_name: &str,
) -> Result<Intent> {
    let handler = match descriptor.handler {
        HandlerRef::Callable(handler) => handler,
        HandlerRef::Named(ref name) => {
            module
                .handler(name)
                .ok_or_else(|| KernelError::HandlerNotCallable {
                    intent: descriptor.name.clone(),
                    handler: name.clone(),
                })?
        }
    };

    let mut intent = Intent::new(descriptor.name, descriptor.examples, handler, plugin_name);
    if let Some(threshold) = descriptor.threshold {
        intent = intent.with_threshold(threshold);
    }
    if let Some(description) = descriptor.description {
        intent = intent.with_description(description);
    }
    Ok(intent)
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Discovers plugin sources and (re)populates an [`IntentRegistry`].
#[derive(Default)]
pub struct PluginLoader {
    /// Sources registered in code.
    sources: Vec<Arc<dyn PluginSource>>,

    /// Optional directory of manifest files, re-scanned on every pass.
    manifests: Option<ManifestDirectory>,

    /// Failures from the most recent pass, keyed by source name.
    errors: BTreeMap<String, String>,
}

impl PluginLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, source: impl PluginSource + 'static) -> Self {
        self.add_source(source);
        self
    }

    #[must_use]
    pub fn with_manifest_dir(mut self, manifests: ManifestDirectory) -> Self {
        self.manifests = Some(manifests);
        self
    }

    pub fn add_source(&mut self, source: impl PluginSource + 'static) {
        self.sources.push(Arc::new(source));
    }

    /// Failures recorded by the most recent [`PluginLoader::discover`].
    ///
    /// Keyed by source name; repeated failures under one name are joined
    /// with `"; "`.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Clear `registry` and repopulate it from every source.
    ///
    /// Never fails: per-source errors are recorded in
    /// [`PluginLoader::errors`].  Matchers are rebuilt once at the end.
    pub fn discover(&mut self, registry: &mut IntentRegistry) {
        registry.clear();
        self.errors.clear();

        let mut sources: Vec<Arc<dyn PluginSource>> = self.sources.clone();

        if let Some(ref manifests) = self.manifests {
            match manifests.scan() {
                Ok(found) => sources.extend(found),
                Err(e) => {
                    warn!(
                        dir = %manifests.dir().display(),
                        error = %e,
                        "failed to scan plugin manifests"
                    );
                    let dir = manifests.dir().display().to_string();
                    self.record_error(dir, e.to_string());
                }
            }
        }

        sources.sort_by(|a, b| a.name().cmp(b.name()));

        for source in &sources {
            match load_source(source.as_ref()) {
                Ok(intents) => {
                    info!(plugin = %source.name(), intents = intents.len(), "plugin loaded");
                    for intent in intents {
                        registry.register(intent);
                    }
                }
                Err(e) => {
                    warn!(plugin = %source.name(), error = %e, "failed to load plugin");
                    self.record_error(source.name().to_owned(), e.to_string());
                }
            }
        }

        registry.rebuild_matchers();

        info!(
            sources = sources.len(),
            intents = registry.len(),
            failed = self.errors.len(),
            "plugin discovery complete"
        );
    }

    /// Record a failure, appending to any earlier failure under the same name.
    fn record_error(&mut self, name: String, message: String) {
        self.errors
            .entry(name)
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(&message);
            })
            .or_insert(message);
    }
}

/// Load one source and validate all of its descriptors.
fn load_source(source: &dyn PluginSource) -> Result<Vec<Intent>> {
    let module = source.load()?;
    extract_intents(&module)
        .into_iter()
        .map(|d| intent_from_descriptor(d, &module, source.name()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
