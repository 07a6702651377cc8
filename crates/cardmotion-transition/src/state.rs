#![forbid(unsafe_code)]

//! Presentation lifecycle state machine.
//!
//! | From                      | Event                     | To                      |
//! |---------------------------|---------------------------|-------------------------|
//! | Idle                      | BeginPresent              | Presenting              |
//! | Presenting                | PresentFinished           | Presented               |
//! | Presenting                | PresentAborted            | Idle                    |
//! | Presented                 | BeginInteractiveDismiss   | InteractiveDismissing   |
//! | Presented, Interactive..  | CommitDismiss             | CommittingDismiss       |
//! | InteractiveDismissing     | CancelDismiss             | CancellingDismiss       |
//! | Cancelling/CommittingDis. | DismissReverted           | Presented               |
//! | CommittingDismiss         | DismissFinished           | Dismissed               |
//! | Dismissed                 | Reset                     | Idle                    |
//!
//! # Invariants
//!
//! 1. Every state change goes through [`StateMachine::dispatch`]; an event
//!    missing from the table is rejected and leaves the state unchanged.
//! 2. A dismissal can only begin from `Presented` or `InteractiveDismissing`,
//!    so it never overlaps a running presentation.

use std::fmt;

use tracing::debug;

use crate::error::{Result, TransitionError};

/// Where a card presentation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    Presenting,
    Presented,
    InteractiveDismissing,
    CommittingDismiss,
    CancellingDismiss,
    Dismissed,
}

impl TransitionState {
    /// Whether no animation is running.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Idle | Self::Presented | Self::Dismissed)
    }

    /// Whether a detail screen is on screen in any form.
    #[must_use]
    pub fn has_presentation(self) -> bool {
        !matches!(self, Self::Idle | Self::Dismissed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Presenting => "presenting",
            Self::Presented => "presented",
            Self::InteractiveDismissing => "interactive-dismissing",
            Self::CommittingDismiss => "committing-dismiss",
            Self::CancellingDismiss => "cancelling-dismiss",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for TransitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionEvent {
    BeginPresent,
    PresentFinished,
    PresentAborted,
    BeginInteractiveDismiss,
    CommitDismiss,
    CancelDismiss,
    DismissFinished,
    DismissReverted,
    Reset,
}

/// The transition table. `None` means the event is illegal in `from`.
#[must_use]
pub fn next_state(from: TransitionState, event: TransitionEvent) -> Option<TransitionState> {
    use TransitionEvent as E;
    use TransitionState as S;
    match (from, event) {
        (S::Idle, E::BeginPresent) => Some(S::Presenting),
        (S::Presenting, E::PresentFinished) => Some(S::Presented),
        (S::Presenting, E::PresentAborted) => Some(S::Idle),
        (S::Presented, E::BeginInteractiveDismiss) => Some(S::InteractiveDismissing),
        (S::Presented | S::InteractiveDismissing, E::CommitDismiss) => Some(S::CommittingDismiss),
        (S::InteractiveDismissing, E::CancelDismiss) => Some(S::CancellingDismiss),
        (S::CancellingDismiss | S::CommittingDismiss, E::DismissReverted) => Some(S::Presented),
        (S::CommittingDismiss, E::DismissFinished) => Some(S::Dismissed),
        (S::Dismissed, E::Reset) => Some(S::Idle),
        _ => None,
    }
}

/// Current state plus a count of accepted transitions.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: TransitionState,
    transitions: u64,
}

impl StateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Accepted transitions since creation.
    #[inline]
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Whether `event` would be accepted right now.
    #[must_use]
    pub fn can_dispatch(&self, event: TransitionEvent) -> bool {
        next_state(self.state, event).is_some()
    }

    /// Apply `event`, returning the new state.
    pub fn dispatch(&mut self, event: TransitionEvent) -> Result<TransitionState> {
        let from = self.state;
        let Some(to) = next_state(from, event) else {
            debug!(from = from.as_str(), ?event, "rejected transition event");
            return Err(TransitionError::IllegalTransition { from, event });
        };
        self.state = to;
        self.transitions += 1;
        debug!(from = from.as_str(), to = to.as_str(), ?event, "transition");
        Ok(to)
    }
}
