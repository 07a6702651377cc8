#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported
//! here (and at the crate root). Without it, same-named macros expand to
//! nothing, so call sites never need their own `cfg` attributes.
//!
//! The `tracing-json` feature adds [`init_json_logging`], which installs a
//! JSON formatter filtered by `RUST_LOG` (default `info`).

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

#[cfg(not(feature = "tracing"))]
mod noop {
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __cardmotion_noop_event {
        ($($arg:tt)*) => {{}};
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! __cardmotion_noop_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    pub use crate::__cardmotion_noop_event as debug;
    pub use crate::__cardmotion_noop_event as error;
    pub use crate::__cardmotion_noop_event as info;
    pub use crate::__cardmotion_noop_event as trace;
    pub use crate::__cardmotion_noop_event as warn;
    pub use crate::__cardmotion_noop_span as debug_span;
    pub use crate::__cardmotion_noop_span as error_span;
    pub use crate::__cardmotion_noop_span as info_span;
    pub use crate::__cardmotion_noop_span as trace_span;
    pub use crate::__cardmotion_noop_span as warn_span;
}

#[cfg(not(feature = "tracing"))]
pub use noop::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Stand-in for a span when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `tracing::Span::entered`.
    #[must_use]
    pub fn entered(self) -> Self {
        self
    }
}

/// Install a global JSON subscriber honoring `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .is_ok()
}
