//! File-based plugin manifests.
//!
//! A manifest is a TOML file in the modules directory.  It declares intents
//! and binds them to handlers from a [`HandlerCatalog`], the table of
//! handlers linked into the running binary:
//!
//! ```toml
//! description = "Clock utilities"
//! requires = ["current_time"]
//!
//! [[intents]]
//! name = "time"
//! examples = ["what time is it", "current time"]
//! handler = "current_time"
//! threshold = 0.5
//! ```
//!
//! Before a manifest contributes anything, every capability it names
//! (`requires`, `exports`, and each intent's `handler`) is checked against
//! the catalog.  Missing capabilities fail the manifest with a diagnostic
//! listing all of them.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::{KernelError, Result};
use crate::handler::SharedHandler;
use crate::intent::IntentDescriptor;
use crate::plugin::{PluginModule, PluginSource};

/// Environment variable overriding the modules directory.
pub const MODULES_DIR_ENV: &str = "JAR_MODULES_DIR";

/// File extension of plugin manifests.
const MANIFEST_EXTENSION: &str = "toml";

// ---------------------------------------------------------------------------
// Handler catalog
// ---------------------------------------------------------------------------

/// Named handlers available to manifests.
#[derive(Clone, Default)]
pub struct HandlerCatalog {
    handlers: HashMap<String, SharedHandler>,
}

impl HandlerCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, handler: SharedHandler) -> Self {
        self.register(name, handler);
        self
    }

    /// Add or replace a handler.
    pub fn register(&mut self, name: impl Into<String>, handler: SharedHandler) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<SharedHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// Manifest format
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    description: Option<String>,

    /// Capabilities the manifest needs beyond its intent handlers.
    #[serde(default)]
    requires: Vec<String>,

    /// Catalog handlers re-exported by this module.  Exporting
    /// `chat_with_jarvis` without declaring intents yields the default chat
    /// intent.
    #[serde(default)]
    exports: Vec<String>,

    #[serde(default)]
    intents: Vec<ManifestIntent>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestIntent {
    name: String,
    examples: Vec<String>,
    handler: String,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default)]
    description: Option<String>,
}

impl Manifest {
    /// Every catalog name this manifest depends on, sorted and deduplicated.
    fn capabilities(&self) -> BTreeSet<&str> {
        self.requires
            .iter()
            .chain(&self.exports)
            .chain(self.intents.iter().map(|i| &i.handler))
            .map(String::as_str)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ManifestSource
// ---------------------------------------------------------------------------

/// A single manifest file.  The source name is the file stem.
pub struct ManifestSource {
    name: String,
    path: PathBuf,
    catalog: Arc<HandlerCatalog>,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>, catalog: Arc<HandlerCatalog>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            catalog,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Manifest> {
        toml::from_str(content).map_err(|e| KernelError::InvalidManifest {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Fail fast if any required capability is not linked in.
    fn check_capabilities(&self, manifest: &Manifest) -> Result<()> {
        let missing: Vec<&str> = manifest
            .capabilities()
            .into_iter()
            .filter(|name| !self.catalog.contains(name))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(KernelError::MissingCapability {
            plugin: self.name.clone(),
            capabilities: missing.join(", "),
        })
    }
}

impl PluginSource for ManifestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<PluginModule> {
        let content = std::fs::read_to_string(&self.path)?;
        let manifest = self.parse(&content)?;
        self.check_capabilities(&manifest)?;

        let description = manifest.description.clone().unwrap_or_default();

        let mut module = PluginModule::new();
        for name in manifest.capabilities() {
            if let Some(handler) = self.catalog.get(name) {
                module.add_handler(name, handler);
            }
        }

        for intent in manifest.intents {
            let mut descriptor =
                IntentDescriptor::new(intent.name, intent.examples, intent.handler);
            descriptor.threshold = intent.threshold;
            descriptor.description = intent.description;
            module.add_intent(descriptor);
        }

        debug!(
            plugin = %self.name,
            description = %description,
            intents = module.intents().len(),
            "manifest parsed"
        );
        Ok(module)
    }
}

// ---------------------------------------------------------------------------
// ManifestDirectory
// ---------------------------------------------------------------------------

/// A directory of manifests, scanned afresh on every discovery pass.
#[derive(Clone)]
pub struct ManifestDirectory {
    dir: PathBuf,
    catalog: Arc<HandlerCatalog>,
}

impl ManifestDirectory {
    pub fn new(dir: impl Into<PathBuf>, catalog: HandlerCatalog) -> Self {
        Self {
            dir: dir.into(),
            catalog: Arc::new(catalog),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog(&self) -> &HandlerCatalog {
        &self.catalog
    }

    /// List manifest sources, creating the directory if it does not exist.
    ///
    /// Files whose name starts with `_` are skipped.  The result is sorted
    /// by path.
    pub fn scan(&self) -> Result<Vec<Arc<dyn PluginSource>>> {
        std::fs::create_dir_all(&self.dir)?;

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();

            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(MANIFEST_EXTENSION) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('_'))
            {
                trace!(path = %path.display(), "skipping private manifest");
                continue;
            }

            paths.push(path);
        }

        paths.sort();

        Ok(paths
            .into_iter()
            .map(|p| Arc::new(ManifestSource::new(p, self.catalog.clone())) as Arc<dyn PluginSource>)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
