#![forbid(unsafe_code)]

//! Exactly-once completion reporting.
//!
//! Every transition hands its host a [`CompletionToken`]. Reporting consumes
//! the token, so a second report cannot compile. A token that is dropped
//! without reporting (a driver torn down mid-flight) reports `false` from
//! its destructor, so the host always hears back exactly once.

use std::fmt;

use tracing::warn;

type Callback = Box<dyn FnOnce(bool)>;

/// One-shot "transition finished" callback.
pub struct CompletionToken {
    callback: Option<Callback>,
}

impl fmt::Debug for CompletionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionToken")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

impl CompletionToken {
    /// Wrap a callback receiving `true` on success.
    pub fn new(callback: impl FnOnce(bool) + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// A token nobody listens to.
    #[must_use]
    pub fn noop() -> Self {
        Self { callback: None }
    }

    /// Report the outcome.
    pub fn complete(mut self, success: bool) {
        if let Some(callback) = self.callback.take() {
            callback(success);
        }
    }
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!("completion token dropped without a report; reporting failure");
            callback(false);
        }
    }
}
