#![forbid(unsafe_code)]

//! Error types for the transition engine.

use thiserror::Error;

use crate::params::EntityId;
use crate::state::{TransitionEvent, TransitionState};

/// Errors reported by the transition coordinator and its drivers.
///
/// # Failure Modes
///
/// None of these are fatal: the scene is always left consistent and any
/// completion token involved has already reported `false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    /// The tapped card was removed from the scene before the presentation
    /// could begin.
    #[error("origin view for entity {entity_id} is no longer in the scene")]
    OriginDetached { entity_id: EntityId },

    /// The screen handed to a driver has no content node in the scene.
    #[error("content node {node} of the presented screen is not in the scene")]
    ContentMissing { node: u64 },

    /// A dismissal was requested with nothing presented.
    #[error("no presented card to dismiss")]
    NoActivePresentation,

    /// A presentation was requested while another transition is running.
    #[error("a transition is already in flight (state: {state})")]
    TransitionInFlight { state: TransitionState },

    /// The event is not legal in the current state.
    #[error("illegal transition: {event:?} while {from}")]
    IllegalTransition {
        from: TransitionState,
        event: TransitionEvent,
    },
}

/// Result alias for transition operations.
pub type Result<T> = std::result::Result<T, TransitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_state() {
        let err = TransitionError::IllegalTransition {
            from: TransitionState::Presenting,
            event: TransitionEvent::CommitDismiss,
        };
        assert_eq!(
            err.to_string(),
            "illegal transition: CommitDismiss while presenting"
        );

        let err = TransitionError::OriginDetached {
            entity_id: EntityId::new(42),
        };
        assert_eq!(
            err.to_string(),
            "origin view for entity #42 is no longer in the scene"
        );
    }
}
