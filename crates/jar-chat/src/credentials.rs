//! API key resolution.
//!
//! The key is looked up in the process environment first, then in a `.env`
//! file (working directory by default).  The resolver parses the file itself
//! and leaves the environment untouched, so it also works for library callers
//! that never load `.env`.  The `jar` binary loads `.env` into the environment
//! at startup as well, in which case the first lookup already succeeds.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default dotenv file consulted after the environment.
pub const DOTENV_FILE: &str = ".env";

/// Finds the API key for the chat backend.
#[derive(Debug, Clone)]
pub struct ApiKeyResolver {
    var: String,
    dotenv_path: Option<PathBuf>,
}

impl Default for ApiKeyResolver {
    fn default() -> Self {
        Self {
            var: API_KEY_ENV.to_owned(),
            dotenv_path: Some(PathBuf::from(DOTENV_FILE)),
        }
    }
}

impl ApiKeyResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different variable name.
    #[must_use]
    pub fn with_var(mut self, var: impl Into<String>) -> Self {
        self.var = var.into();
        self
    }

    /// Read the fallback from `path` instead of `./.env`.
    #[must_use]
    pub fn with_dotenv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv_path = Some(path.into());
        self
    }

    /// Only consult the environment.
    #[must_use]
    pub fn without_dotenv(mut self) -> Self {
        self.dotenv_path = None;
        self
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    /// Resolve the key, or `None` if it is not configured anywhere.
    ///
    /// An unreadable `.env` file is logged and treated as absent.
    pub fn resolve(&self) -> Option<String> {
        if let Ok(key) = std::env::var(&self.var)
            && !key.trim().is_empty()
        {
            debug!(var = %self.var, "api key found in environment");
            return Some(key.trim().to_owned());
        }

        let path = self.dotenv_path.as_deref()?;
        match read_dotenv_key(path, &self.var) {
            Ok(found) => found,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read dotenv file");
                None
            }
        }
    }
}

/// Look `var` up in a dotenv file.  A missing file yields `Ok(None)`.
fn read_dotenv_key(path: &Path, var: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        if key == var && !value.trim().is_empty() {
            debug!(var = %var, path = %path.display(), "api key found in dotenv file");
            return Ok(Some(value.trim().to_owned()));
        }
    }

    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
