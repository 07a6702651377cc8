#![forbid(unsafe_code)]

//! Reveal state of a presented card, and the dismissal gate derived from it.
//!
//! A detail screen opens with its answer hidden. The user can ask for a hint,
//! reveal the answer outright, or guess. Interactive dismissal is only
//! allowed once the answer has been revealed or correctly answered.
//!
//! # Invariants
//!
//! 1. The state only moves forward: `FullyHidden → HintShown → Revealed`.
//! 2. `notify_revealed` fires at most once per tracker, whichever of
//!    [`RevealTracker::reveal`] / [`RevealTracker::answer`] gets there first.

use std::rc::Weak;

use tracing::debug;

use crate::params::{EntityId, TransitionParameters};
use crate::sink::NotificationSink;

/// How much of the answer the user has seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RevealState {
    #[default]
    FullyHidden,
    HintShown,
    /// Revealed or answered.
    Revealed,
}

impl RevealState {
    /// The dismissal gate.
    #[inline]
    #[must_use]
    pub fn permits_dismissal(self) -> bool {
        self == Self::Revealed
    }
}

/// Reveal/favorite/advance bookkeeping for one presented entity.
pub struct RevealTracker {
    entity_id: EntityId,
    state: RevealState,
    favorite: bool,
    revealed_notified: bool,
    sink: Option<Weak<dyn NotificationSink>>,
}

impl std::fmt::Debug for RevealTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealTracker")
            .field("entity_id", &self.entity_id)
            .field("state", &self.state)
            .field("favorite", &self.favorite)
            .field("revealed_notified", &self.revealed_notified)
            .finish_non_exhaustive()
    }
}

impl RevealTracker {
    #[must_use]
    pub fn new(entity_id: EntityId, start_hidden: bool) -> Self {
        Self {
            entity_id,
            state: if start_hidden {
                RevealState::FullyHidden
            } else {
                RevealState::Revealed
            },
            favorite: false,
            // A card that opens revealed was already reported by its grid.
            revealed_notified: !start_hidden,
            sink: None,
        }
    }

    /// Tracker for the entity and sink carried by `params`.
    #[must_use]
    pub fn from_params(params: &TransitionParameters) -> Self {
        let mut tracker = Self::new(params.entity_id, params.start_hidden);
        tracker.sink = params.notification_sink.clone();
        tracker
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Weak<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Start from a known favorite status.
    #[must_use]
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> RevealState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    /// Show the hint. No effect once revealed.
    pub fn show_hint(&mut self) {
        if self.state == RevealState::FullyHidden {
            self.state = RevealState::HintShown;
        }
    }

    /// Give up and reveal the answer.
    pub fn reveal(&mut self) {
        self.mark_revealed(false);
    }

    /// Submit a guess. A correct guess reveals; a wrong one leaves the state
    /// alone so the user may guess again or reveal. Returns `correct`.
    pub fn answer(&mut self, correct: bool) -> bool {
        if correct {
            self.mark_revealed(true);
        }
        correct
    }

    /// Flip favorite status and report the new value.
    pub fn toggle_favorite(&mut self) -> bool {
        self.favorite = !self.favorite;
        let (entity, added) = (self.entity_id, self.favorite);
        self.with_live_sink(|sink| sink.notify_favorite_toggled(entity, added));
        self.favorite
    }

    /// Ask the grid for the next entity.
    pub fn request_advance(&self) {
        let entity = self.entity_id;
        self.with_live_sink(|sink| sink.notify_advance_requested(entity));
    }

    fn mark_revealed(&mut self, was_correct: bool) {
        self.state = RevealState::Revealed;
        if self.revealed_notified {
            return;
        }
        self.revealed_notified = true;
        debug!(entity_id = self.entity_id.get(), was_correct, "entity revealed");
        let entity = self.entity_id;
        self.with_live_sink(|sink| sink.notify_revealed(entity, was_correct));
    }

    fn with_live_sink(&self, f: impl FnOnce(&dyn NotificationSink)) {
        if let Some(sink) = self.sink.as_ref().and_then(Weak::upgrade) {
            f(sink.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{RecordingSink, SinkEvent, weak_sink};
    use std::rc::Rc;

    fn tracker(sink: &Rc<RecordingSink>) -> RevealTracker {
        RevealTracker::new(EntityId::new(5), true).with_sink(weak_sink(sink))
    }

    #[test]
    fn gate_opens_only_when_revealed() {
        assert!(!RevealState::FullyHidden.permits_dismissal());
        assert!(!RevealState::HintShown.permits_dismissal());
        assert!(RevealState::Revealed.permits_dismissal());
    }

    #[test]
    fn hint_does_not_open_gate() {
        let sink = Rc::new(RecordingSink::new());
        let mut t = tracker(&sink);
        t.show_hint();
        assert_eq!(t.state(), RevealState::HintShown);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn reveal_then_correct_answer_notifies_once() {
        let sink = Rc::new(RecordingSink::new());
        let mut t = tracker(&sink);
        t.reveal();
        t.answer(true);
        t.reveal();
        assert_eq!(sink.reveal_count(EntityId::new(5)), 1);
        assert_eq!(
            sink.events()[0],
            SinkEvent::Revealed {
                entity: EntityId::new(5),
                was_correct: false
            }
        );
    }

    #[test]
    fn wrong_answer_keeps_gate_closed() {
        let sink = Rc::new(RecordingSink::new());
        let mut t = tracker(&sink);
        assert!(!t.answer(false));
        assert_eq!(t.state(), RevealState::FullyHidden);
        assert!(t.answer(true));
        assert_eq!(t.state(), RevealState::Revealed);
        assert_eq!(
            sink.events(),
            vec![SinkEvent::Revealed {
                entity: EntityId::new(5),
                was_correct: true
            }]
        );
    }

    #[test]
    fn favorite_and_advance_fire_every_time() {
        let sink = Rc::new(RecordingSink::new());
        let mut t = tracker(&sink);
        assert!(t.toggle_favorite());
        assert!(!t.toggle_favorite());
        t.request_advance();
        t.request_advance();
        assert_eq!(sink.events().len(), 4);
    }

    #[test]
    fn dropped_sink_is_silent() {
        let sink = Rc::new(RecordingSink::new());
        let mut t = tracker(&sink);
        drop(sink);
        t.reveal();
        t.toggle_favorite();
        assert_eq!(t.state(), RevealState::Revealed);
    }

    #[test]
    fn starting_revealed_does_not_renotify() {
        let sink = Rc::new(RecordingSink::new());
        let mut t = RevealTracker::new(EntityId::new(1), false).with_sink(weak_sink(&sink));
        assert!(t.state().permits_dismissal());
        t.answer(true);
        assert!(sink.events().is_empty());
    }
}
