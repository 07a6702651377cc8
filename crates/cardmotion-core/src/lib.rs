// Forbid unsafe in production; deny (with targeted allows) in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: geometry, timing curves, interruptible animators, and pan gestures.
//!
//! # Role in cardmotion
//! `cardmotion-core` holds the toolkit-independent primitives the card
//! transition engine is built from. Nothing here knows about cards, screens,
//! or presentation; it is all motion and input.
//!
//! # Primary responsibilities
//! - **Geometry**: `Point`, `Size`, `Rect` in floating-point screen points.
//! - **Animation**: easing, damped spring timing, and the
//!   [`InterruptibleAnimator`](animation::InterruptibleAnimator).
//! - **Gestures**: single-touch and screen-edge pan recognizers with
//!   "defer to" arbitration.
//! - **Logging**: a tracing facade that compiles away when disabled.

pub mod animation;
pub mod geometry;
pub mod gesture;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
