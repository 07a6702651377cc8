// Forbid unsafe in production; deny (with targeted allows) in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Card transition engine: card → full screen and back, with drag-to-dismiss.
//!
//! # Role in cardmotion
//! `cardmotion-transition` is the presentation subsystem. A grid of cards
//! hands it the tapped card's geometry; it carries the detail content out of
//! the card, keeps the card hidden while the detail is up, lets the user drag
//! the detail away (gated on the answer being revealed), and lands the
//! content back in the card.
//!
//! # Primary responsibilities
//! - **Scene**: a headless retained node tree the drivers animate.
//! - **Drivers**: [`PresentDriver`] and [`DismissDriver`], each a single
//!   spring-timed interruptible animator over a temporary container.
//! - **Interactive dismissal**: [`InteractiveDismissController`] maps pans
//!   to shrink progress and arbitrates commit, reject, and spring-back.
//! - **Lifecycle**: [`TransitionCoordinator`] and its explicit state machine.
//! - **Reveal gating**: [`RevealTracker`] and the [`NotificationSink`] back to
//!   the grid.
//!
//! # How it fits in the system
//! Geometry, timing curves, animators, and gesture recognition come from
//! `cardmotion-core`. Hosts mirror the [`Scene`] into real views and call
//! `tick` once per frame.

pub mod completion;
pub mod config;
pub mod coordinator;
pub mod dismiss;
pub mod error;
pub mod interactive;
pub mod origin;
pub mod overlay;
pub mod params;
pub mod present;
pub mod reveal;
pub mod scene;
pub mod screen;
pub mod sink;
pub mod state;

pub use completion::CompletionToken;
pub use config::{
    BackdropConfig, ConfigError, DismissConfig, GestureConfig, PresentConfig, TransitionConfig,
};
pub use coordinator::{TransitionCoordinator, TransitionOutcome};
pub use dismiss::{DismissDriver, DismissOutcome};
pub use error::{Result, TransitionError};
pub use interactive::{
    DismissHost, DragPhase, InteractiveDismissController, InteractiveSignal, PanSample, PanSource,
    SessionPhase,
};
pub use origin::OriginGuard;
pub use overlay::PresentationOverlay;
pub use params::{EntityId, TransitionParameters};
pub use present::{PresentDriver, PresentOutcome, PresentSpring};
pub use reveal::{RevealState, RevealTracker};
pub use scene::{Layout, NodeId, Scene, SharedScene};
pub use screen::{PresentedScreen, ScreenNodes};
pub use sink::{NotificationSink, weak_sink};
#[cfg(any(test, feature = "test-helpers"))]
pub use sink::{RecordingSink, SinkEvent};
pub use state::{StateMachine, TransitionEvent, TransitionState};
