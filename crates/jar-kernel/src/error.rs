//! Kernel error types.
//!
//! Every fallible API in this crate returns [`KernelError`].  Plugin load
//! failures are converted to strings and recorded by the loader rather than
//! propagated, so most variants only ever reach a caller through
//! [`crate::PluginLoader::errors`] or a handler invocation.

use std::path::PathBuf;

/// Unified error type for the Jar kernel.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    // -- Embedding errors ---------------------------------------------------
    /// The embedding provider could not process the given text.
    #[error("embedding failed for `{text}`: {reason}")]
    EmbeddingFailed { text: String, reason: String },

    // -- Router errors ------------------------------------------------------
    /// An example phrase has no cached embedding.  Indicates the registry was
    /// queried while out of sync with its intent list.
    #[error("no cached embedding for example `{example}` of intent `{intent}`")]
    MissingEmbedding { intent: String, example: String },

    /// The similarity function returned NaN or an infinite value.
    #[error("non-finite similarity score for intent `{intent}`")]
    InvalidScore { intent: String },

    /// Building the phrase index automaton failed.
    #[error("phrase index build error: {reason}")]
    MatcherBuildError { reason: String },

    // -- Plugin errors ------------------------------------------------------
    /// A descriptor names a handler the plugin does not export.
    #[error("handler for intent '{intent}' is not callable: {handler}")]
    HandlerNotCallable { intent: String, handler: String },

    /// A plugin depends on capabilities that are not linked into this build.
    #[error("plugin `{plugin}` requires missing capabilities: {capabilities}")]
    MissingCapability {
        plugin: String,
        capabilities: String,
    },

    /// A plugin manifest could not be parsed.
    #[error("invalid plugin manifest `{path}`: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    // -- Dispatch errors ----------------------------------------------------
    /// A handler reported a failure while serving a request.
    #[error("handler failed: {reason}")]
    HandlerFailed { reason: String },

    // -- Configuration errors -----------------------------------------------
    /// Configuration loading or validation failed.
    #[error("config error: {reason}")]
    ConfigError { reason: String },

    // -- Upstream errors ----------------------------------------------------
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl KernelError {
    /// Build a [`KernelError::HandlerFailed`] from any displayable reason.
    pub fn handler(reason: impl std::fmt::Display) -> Self {
        Self::HandlerFailed {
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the kernel crate.
pub type Result<T> = std::result::Result<T, KernelError>;
