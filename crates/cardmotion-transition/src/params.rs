#![forbid(unsafe_code)]

//! Parameters captured when a card is tapped.
//!
//! A [`TransitionParameters`] snapshot is taken at tap time and shared
//! read-only (via `Rc`) by the present driver, the dismiss driver, and the
//! detail screen for the whole lifetime of one presentation.
//!
//! # Invariants
//!
//! 1. `origin_frame_on_screen` is the card's rendered frame at tap time,
//!    including any press-down scale.
//! 2. `origin_frame_at_rest` is the same card with its transform removed;
//!    it is the dismissal target.
//! 3. `origin_view` is a non-owning reference. If the grid drops the card
//!    the id simply stops resolving.

use std::fmt;
use std::rc::Weak;

use cardmotion_core::geometry::Rect;

use crate::error::{Result, TransitionError};
use crate::scene::{NodeId, Scene};
use crate::sink::NotificationSink;

/// Identifier of the entity (movie, TV show, person) a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(i64);

impl EntityId {
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of the tapped card.
#[derive(Clone)]
pub struct TransitionParameters {
    pub origin_frame_on_screen: Rect,
    pub origin_frame_at_rest: Rect,
    pub origin_view: NodeId,
    /// Corner radius of the card, mirrored by the detail content while it
    /// travels between card and full screen.
    pub origin_corner_radius: f64,
    /// Whether the detail screen opens with its answer hidden.
    pub start_hidden: bool,
    pub notification_sink: Option<Weak<dyn NotificationSink>>,
    pub entity_id: EntityId,
}

impl fmt::Debug for TransitionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionParameters")
            .field("origin_frame_on_screen", &self.origin_frame_on_screen)
            .field("origin_frame_at_rest", &self.origin_frame_at_rest)
            .field("origin_view", &self.origin_view)
            .field("origin_corner_radius", &self.origin_corner_radius)
            .field("start_hidden", &self.start_hidden)
            .field("has_sink", &self.notification_sink.is_some())
            .field("entity_id", &self.entity_id)
            .finish()
    }
}

impl TransitionParameters {
    /// Build parameters from frames the host measured itself.
    #[must_use]
    pub fn new(
        origin_view: NodeId,
        origin_frame_on_screen: Rect,
        origin_frame_at_rest: Rect,
        entity_id: EntityId,
    ) -> Self {
        Self {
            origin_frame_on_screen,
            origin_frame_at_rest,
            origin_view,
            origin_corner_radius: 0.0,
            start_hidden: true,
            notification_sink: None,
            entity_id,
        }
    }

    /// Measure the card `origin` in `scene` right now.
    ///
    /// Fails with [`TransitionError::OriginDetached`] when the card is gone
    /// or no longer attached to the screen.
    pub fn capture(scene: &Scene, origin: NodeId, entity_id: EntityId) -> Result<Self> {
        let detached = || TransitionError::OriginDetached { entity_id };
        let on_screen = scene.screen_frame(origin).ok_or_else(detached)?;
        let at_rest = scene.frame_at_rest(origin).ok_or_else(detached)?;
        let radius = scene.corner_radius(origin).unwrap_or(0.0);
        Ok(Self::new(origin, on_screen, at_rest, entity_id).with_corner_radius(radius))
    }

    #[must_use]
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.origin_corner_radius = radius.max(0.0);
        self
    }

    #[must_use]
    pub fn with_start_hidden(mut self, start_hidden: bool) -> Self {
        self.start_hidden = start_hidden;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Weak<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    /// Whether the card sat above the top edge of the screen when tapped.
    #[inline]
    #[must_use]
    pub fn origin_above_screen(&self) -> bool {
        self.origin_frame_on_screen.y < 0.0
    }
}
