//! Precondition middleware
//!
//! `Guarded` runs a `Precondition` before delegating to an operation handler.
//! The one precondition shipped here is `InitialContextGate`: callers must load
//! the initial context before any other operation.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{OpsError, Result};

/// Name under which the context operation is exempt from the gate.
pub const INITIAL_CONTEXT_OPERATION: &str = "initial_context";

/// A check run before an operation is allowed to proceed.
pub trait Precondition: Send + Sync {
    fn check(&self, operation: &str) -> Result<()>;
}

impl<P: Precondition + ?Sized> Precondition for Arc<P> {
    fn check(&self, operation: &str) -> Result<()> {
        (**self).check(operation)
    }
}

/// Refuses operations until the initial context has been loaded.
#[derive(Debug)]
pub struct InitialContextGate {
    loaded: AtomicBool,
    exempt: Vec<String>,
}

impl Default for InitialContextGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InitialContextGate {
    pub fn new() -> Self {
        Self {
            loaded: AtomicBool::new(false),
            exempt: vec![INITIAL_CONTEXT_OPERATION.to_string()],
        }
    }

    /// Additional operations that may run before the context is loaded.
    pub fn with_exempt<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exempt.extend(operations.into_iter().map(Into::into));
        self
    }

    pub fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::SeqCst);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }
}

impl Precondition for InitialContextGate {
    fn check(&self, operation: &str) -> Result<()> {
        if self.is_loaded() || self.exempt.iter().any(|name| name == operation) {
            return Ok(());
        }
        Err(OpsError::PreconditionFailed {
            operation: operation.to_string(),
            reason: format!(
                "the initial context has not been loaded; call {} first to get project \
                 context and usage instructions",
                INITIAL_CONTEXT_OPERATION
            ),
        })
    }
}

/// Wraps operation handlers with a precondition check.
pub struct Guarded<P> {
    precondition: P,
}

impl<P: Precondition> Guarded<P> {
    pub fn new(precondition: P) -> Self {
        Self { precondition }
    }

    pub fn precondition(&self) -> &P {
        &self.precondition
    }

    /// Check the precondition for `operation`, then run `handler`.
    pub async fn call<T, F, Fut>(&self, operation: &str, handler: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.precondition.check(operation)?;
        debug!(operation, "precondition passed");
        handler().await
    }
}
