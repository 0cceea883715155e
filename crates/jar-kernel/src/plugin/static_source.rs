//! Plugin sources assembled in code.

use crate::error::Result;
use crate::handler::SharedHandler;
use crate::intent::IntentDescriptor;
use crate::plugin::{PluginModule, PluginSource};

/// A source whose module is built up front by the caller.
///
/// ```rust
/// # use jar_kernel::{IntentDescriptor, StaticSource, text_handler};
/// let source = StaticSource::new("echo")
///     .handler("echo_fn", text_handler(|t| Ok(Some(t.to_owned()))))
///     .intent(IntentDescriptor::new("echo", ["echo", "repeat after me"], "echo_fn"));
/// ```
#[derive(Clone)]
pub struct StaticSource {
    name: String,
    module: PluginModule,
}

impl StaticSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: PluginModule::new(),
        }
    }

    /// Export a named handler.
    #[must_use]
    pub fn handler(mut self, name: impl Into<String>, handler: SharedHandler) -> Self {
        self.module.add_handler(name, handler);
        self
    }

    /// Declare an intent.
    #[must_use]
    pub fn intent(mut self, descriptor: IntentDescriptor) -> Self {
        self.module.add_intent(descriptor);
        self
    }
}

impl PluginSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<PluginModule> {
        Ok(self.module.clone())
    }
}
