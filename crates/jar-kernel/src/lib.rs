//! Jar kernel.
//!
//! The intent-routing core of the Jar assistant:
//!
//! - **[`plugin`]** -- Discovers plugin sources (in-code modules and TOML
//!   manifests), validates their intent descriptors and tolerates individual
//!   load failures.
//! - **[`registry`]** -- Holds registered intents, caches example embeddings
//!   and maintains an aho-corasick phrase index over all examples.
//! - **[`router`]** -- Hybrid scorer blending semantic similarity (0.6) with
//!   exact phrase hits (0.4).
//! - **[`dispatcher`]** -- Applies the confidence floor with a fallback to
//!   the `chat` intent and invokes the chosen [`Handler`].
//! - **[`assistant`]** -- Façade owning all of the above plus the session.
//!
//! Embeddings come from any [`EmbeddingProvider`]; [`HashingEmbedder`] is a
//! dependency-free default.

pub mod assistant;
pub mod config;
pub mod dispatcher;
pub mod embedding;
pub mod error;
pub mod handler;
pub mod intent;
pub mod matcher;
pub mod plugin;
pub mod registry;
pub mod router;
pub mod session;

// Re-export the most commonly used types at the crate root for convenience.
pub use assistant::Assistant;
pub use config::{AssistantConfig, JarConfig};
pub use dispatcher::{CONFIDENCE_FLOOR, Decision, Dispatcher, FALLBACK_INTENT, NOT_UNDERSTOOD};
pub use embedding::{Embedding, EmbeddingProvider, HashingEmbedder};
pub use error::{KernelError, Result};
pub use handler::{Handler, SharedHandler, handler_fn, nullary_handler, text_handler};
pub use intent::{DEFAULT_THRESHOLD, HandlerRef, Intent, IntentDescriptor, IntentMatch};
pub use plugin::{
    HandlerCatalog, ManifestDirectory, ManifestSource, PluginLoader, PluginModule, PluginSource,
    StaticSource,
};
pub use registry::IntentRegistry;
pub use router::Router;
pub use session::{Role, SessionState, Turn};
