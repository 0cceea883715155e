//! Assistant configuration.
//!
//! Loaded from `config/default.toml` when present, then overridden by
//! environment variables:
//!
//! - `JAR_ASSISTANT_NAME`: display name used by the REPL
//! - `JAR_MODULES_DIR`: directory scanned for plugin manifests
//!
//! ```toml
//! [assistant]
//! name = "Jarvis"
//! identity = "Jarvis, an AI assistant"
//! modules_dir = "modules"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{KernelError, Result};
use crate::plugin::manifest::MODULES_DIR_ENV;
use crate::session::DEFAULT_IDENTITY;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable overriding the assistant display name.
pub const ASSISTANT_NAME_ENV: &str = "JAR_ASSISTANT_NAME";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JarConfig {
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// The `[assistant]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Name printed in front of every reply.
    pub name: String,
    /// Identity stored in the session for handlers to use.
    pub identity: String,
    /// Directory of plugin manifests.
    pub modules_dir: PathBuf,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Jarvis".to_owned(),
            identity: DEFAULT_IDENTITY.to_owned(),
            modules_dir: PathBuf::from("modules"),
        }
    }
}

impl JarConfig {
    /// Load from `path` (defaults if it does not exist), then apply
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| KernelError::ConfigError {
                reason: format!("failed to read {}: {e}", path.display()),
            })?;
            let parsed = Self::from_toml(&content)?;
            info!(path = %path.display(), "configuration loaded");
            parsed
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Load from [`DEFAULT_CONFIG_PATH`].
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// Parse a TOML document without touching the environment.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| KernelError::ConfigError {
            reason: format!("invalid TOML config: {e}"),
        })
    }

    /// Apply `JAR_*` environment overrides in place.
    pub fn apply_env(&mut self) {
        if let Some(name) = env_non_empty(ASSISTANT_NAME_ENV) {
            self.assistant.name = name;
        }
        if let Some(dir) = env_non_empty(MODULES_DIR_ENV) {
            self.assistant.modules_dir = PathBuf::from(dir);
        }
    }
}

/// Read a non-empty environment variable.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
