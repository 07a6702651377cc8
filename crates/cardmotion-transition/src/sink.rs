#![forbid(unsafe_code)]

//! Notifications from the detail screen back to the grid that launched it.
//!
//! The sink is held weakly by [`TransitionParameters`](crate::TransitionParameters):
//! the grid owns itself, and a notification sent after the grid is gone is
//! silently dropped.

use std::rc::{Rc, Weak};

use crate::params::EntityId;

/// Receiver of per-entity events raised while a card is presented.
///
/// Methods take `&self`; implementations use interior mutability.
pub trait NotificationSink {
    /// The entity's answer was revealed. `was_correct` is true when the user
    /// guessed it rather than giving up.
    fn notify_revealed(&self, entity: EntityId, was_correct: bool);

    /// The user added (`true`) or removed (`false`) the entity from favorites.
    fn notify_favorite_toggled(&self, entity: EntityId, added: bool);

    /// The user asked to move on to the next entity.
    fn notify_advance_requested(&self, entity: EntityId);
}

/// Downgrade a concrete sink to the weak trait object the parameters hold.
#[must_use]
pub fn weak_sink<S: NotificationSink + 'static>(sink: &Rc<S>) -> Weak<dyn NotificationSink> {
    let strong: Rc<dyn NotificationSink> = sink.clone();
    Rc::downgrade(&strong)
}

/// Events recorded by [`RecordingSink`].
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Revealed { entity: EntityId, was_correct: bool },
    FavoriteToggled { entity: EntityId, added: bool },
    AdvanceRequested { entity: EntityId },
}

/// A sink that records everything it receives, in order.
///
/// Test double for hosts and integration tests (requires `test-helpers`).
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::cell::RefCell<Vec<SinkEvent>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.borrow().clone()
    }

    /// How many reveal notifications arrived for `entity`.
    #[must_use]
    pub fn reveal_count(&self, entity: EntityId) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Revealed { entity: id, .. } if *id == entity))
            .count()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl NotificationSink for RecordingSink {
    fn notify_revealed(&self, entity: EntityId, was_correct: bool) {
        self.events
            .borrow_mut()
            .push(SinkEvent::Revealed { entity, was_correct });
    }

    fn notify_favorite_toggled(&self, entity: EntityId, added: bool) {
        self.events
            .borrow_mut()
            .push(SinkEvent::FavoriteToggled { entity, added });
    }

    fn notify_advance_requested(&self, entity: EntityId) {
        self.events
            .borrow_mut()
            .push(SinkEvent::AdvanceRequested { entity });
    }
}
