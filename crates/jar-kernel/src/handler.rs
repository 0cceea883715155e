//! The handler capability invoked by the dispatcher.
//!
//! Every handler implements one fixed interface, [`Handler::handle`], taking
//! the user text and the shared session.  Handlers that need less can be
//! built from simpler closures with [`handler_fn`], [`text_handler`] and
//! [`nullary_handler`]; they simply never see the arguments they don't ask
//! for.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::session::SessionState;

/// A routable capability.
///
/// `Ok(None)` means the request was served but there is nothing to display.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, text: &str, session: &mut SessionState) -> Result<Option<String>>;
}

/// Shared, type-erased handler reference.
pub type SharedHandler = Arc<dyn Handler>;

// ---------------------------------------------------------------------------
// Closure adapters
// ---------------------------------------------------------------------------

/// A synchronous closure wrapped as a [`Handler`].
pub struct FnHandler<F> {
    func: F,
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&str, &mut SessionState) -> Result<Option<String>> + Send + Sync,
{
    async fn handle(&self, text: &str, session: &mut SessionState) -> Result<Option<String>> {
        (self.func)(text, session)
    }
}

/// Wrap a closure that takes the text and the session.
pub fn handler_fn<F>(func: F) -> SharedHandler
where
    F: Fn(&str, &mut SessionState) -> Result<Option<String>> + Send + Sync + 'static,
{
    Arc::new(FnHandler { func })
}

/// Wrap a closure that only needs the user text.
pub fn text_handler<F>(func: F) -> SharedHandler
where
    F: Fn(&str) -> Result<Option<String>> + Send + Sync + 'static,
{
    handler_fn(move |text: &str, _session: &mut SessionState| func(text))
}

/// Wrap a closure that takes no arguments.
pub fn nullary_handler<F>(func: F) -> SharedHandler
where
    F: Fn() -> Result<Option<String>> + Send + Sync + 'static,
{
    handler_fn(move |_text: &str, _session: &mut SessionState| func())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
