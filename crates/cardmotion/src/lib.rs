#![forbid(unsafe_code)]

//! cardmotion public facade crate.
//!
//! Re-exports the motion primitives from `cardmotion-core` and the card
//! transition engine from `cardmotion-transition`, plus a prelude with the
//! types a host app touches every day.

// --- Core re-exports -------------------------------------------------------

pub use cardmotion_core::animation::{
    AnimatingPosition, Animation, AnimatorState, InterruptibleAnimator, SpringTiming, TimingCurve,
};
pub use cardmotion_core::geometry::{Point, Rect, Size};
pub use cardmotion_core::gesture::{Edges, TouchEvent, TouchPhase};

#[cfg(feature = "tracing-json")]
pub use cardmotion_core::logging::init_json_logging;

// --- Transition re-exports -------------------------------------------------

pub use cardmotion_transition::{
    CompletionToken, ConfigError, DismissHost, EntityId, InteractiveDismissController,
    InteractiveSignal, NodeId, NotificationSink, PresentedScreen, RevealState, RevealTracker,
    Scene, ScreenNodes, SharedScene, TransitionConfig, TransitionCoordinator, TransitionError,
    TransitionOutcome, TransitionParameters, TransitionState, weak_sink,
};

/// Standard result type for cardmotion APIs.
pub type Result<T> = cardmotion_transition::Result<T>;

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CompletionToken, DismissHost, EntityId, InteractiveDismissController, NotificationSink,
        Point, PresentedScreen, Rect, RevealState, RevealTracker, Result, Scene, ScreenNodes,
        Size, TransitionConfig, TransitionCoordinator, TransitionParameters, TransitionState,
    };

    pub use crate::{core, transition};
}

pub use cardmotion_core as core;
pub use cardmotion_transition as transition;
