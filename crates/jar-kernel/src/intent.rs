//! Intent data model.
//!
//! - [`IntentDescriptor`] is what a plugin source hands to the loader: a
//!   schema whose handler may still be an unresolved name.
//! - [`Intent`] is the validated, immutable value stored in the registry.
//! - [`IntentMatch`] is the per-request routing result.

use std::fmt;
use std::sync::Arc;

use crate::handler::{Handler, SharedHandler};

/// Per-intent confidence threshold used when a descriptor omits one.
pub const DEFAULT_THRESHOLD: f64 = 0.55;

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// How a descriptor refers to its handler.
#[derive(Clone)]
pub enum HandlerRef {
    /// The name of a handler exported by the same plugin module.
    Named(String),
    /// A handler supplied directly.
    Callable(SharedHandler),
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl From<&str> for HandlerRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for HandlerRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<SharedHandler> for HandlerRef {
    fn from(handler: SharedHandler) -> Self {
        Self::Callable(handler)
    }
}

/// An intent as declared by a plugin source, before validation.
#[derive(Debug, Clone)]
pub struct IntentDescriptor {
    pub name: String,
    pub examples: Vec<String>,
    pub handler: HandlerRef,
    pub threshold: Option<f64>,
    pub description: Option<String>,
}

impl IntentDescriptor {
    pub fn new<I, S>(name: impl Into<String>, examples: I, handler: impl Into<HandlerRef>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            examples: examples.into_iter().map(Into::into).collect(),
            handler: handler.into(),
            threshold: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// A named, routable capability.
///
/// Cheap to clone: the handler is reference-counted.
#[derive(Clone)]
pub struct Intent {
    name: String,
    examples: Vec<String>,
    handler: SharedHandler,
    plugin: String,
    description: String,
    threshold: f64,
}

impl Intent {
    pub fn new<I, S>(
        name: impl Into<String>,
        examples: I,
        handler: SharedHandler,
        plugin: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            examples: examples.into_iter().map(Into::into).collect(),
            handler,
            plugin: plugin.into(),
            description: String::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Name of the plugin source that contributed this intent.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared minimum confidence.  Informational only: dispatch applies
    /// the global floor instead.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intent")
            .field("name", &self.name)
            .field("examples", &self.examples)
            .field("plugin", &self.plugin)
            .field("description", &self.description)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// The outcome of scoring one intent against an input.
#[derive(Debug, Clone)]
pub struct IntentMatch {
    pub intent: Intent,
    /// Blended score in `[0, 1]`.
    pub score: f64,
    /// Best example similarity in `[0, 1]`.
    pub semantic: f64,
    /// 1.0 on an exact phrase hit, otherwise 0.0.
    pub lexical: f64,
    /// Human-readable breakdown, e.g. `sim=0.83, phrase=1.0`.
    pub reason: String,
}
