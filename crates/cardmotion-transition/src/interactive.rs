#![forbid(unsafe_code)]

//! Drag-to-dismiss controller embedded in a presented detail screen.
//!
//! Two pans drive dismissal: a vertical pan anywhere on the content and a
//! left-edge pan. Both map drag distance to a unit-less progress where
//! `progress_distance` points (100 by default) is full progress. Progress
//! scrubs a paused shrink animator; the host renders the shrink.
//!
//! ```text
//!            drag start                 progress >= 1, gate open
//!   Idle ───────────────▶ Tracking ──────────────────────────────▶ Committed
//!    ▲                     │    │                                  (host dismisses)
//!    │ reversal done       │    │ progress >= 1, gate closed
//!    └──── Reversing ◀─────┘◀───┘ (banner, scroll cancelled)
//!              release
//! ```
//!
//! # Invariants
//!
//! 1. The dismissal animator is only constructed when none exists; it lives
//!    for exactly one drag session.
//! 2. Once committed, further gesture input is ignored until [`reset`].
//! 3. Recognizers disabled for a reversal are re-enabled when it completes
//!    (plus the optional rejection delay), so a fresh drag always works.
//!
//! # Failure Modes
//!
//! A release that arrives before any drag began is a silent reset.
//!
//! [`reset`]: InteractiveDismissController::reset

use std::time::Duration;

use cardmotion_core::animation::{AnimatingPosition, InterruptibleAnimator, TimingCurve};
use cardmotion_core::geometry::{Point, Rect, lerp};
use cardmotion_core::gesture::{
    Edges, GestureArena, GestureUpdate, PanKind, PanRecognizer, RecognizerId, RecognizerState,
    TouchEvent,
};
use tracing::{debug, trace};

use crate::config::GestureConfig;
use crate::reveal::RevealState;

/// Lifecycle notifications sent to the host while a drag is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveSignal {
    /// A drag session started shrinking the content.
    Began,
    /// The drag crossed the threshold with the gate open; a dismissal
    /// request follows.
    Committed,
    /// The drag was released or rejected; the content is springing back.
    Cancelling,
    /// The content is back at full size.
    Restored,
}

/// What the controller needs from the screen it is embedded in.
pub trait DismissHost {
    /// The dismissal gate.
    fn reveal_state(&self) -> RevealState;

    /// Whether a vertical drag may start a dismissal right now (content
    /// scrolled to the top).
    fn allows_vertical_dismiss(&self) -> bool {
        true
    }

    /// Render the shrink: content scale and corner radius.
    fn apply_shrink(&mut self, scale: f64, corner_radius: f64);

    /// Stop any scroll in progress.
    fn cancel_scroll(&mut self);

    /// Show a short, self-dismissing message.
    fn show_transient_banner(&mut self, message: &str);

    /// Run the screen's standard dismissal.
    fn request_dismiss(&mut self);

    /// Session lifecycle for whoever tracks the transition state. Hosts
    /// embedded in a [`TransitionCoordinator`](crate::TransitionCoordinator)
    /// forward these to
    /// [`interactive_signal`](crate::TransitionCoordinator::interactive_signal);
    /// otherwise the coordinator never leaves `presented` during a drag.
    fn interactive_signal(&mut self, _signal: InteractiveSignal) {}
}

/// Which recognizer a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanSource {
    Edge,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// One pan callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSample {
    pub source: PanSource,
    pub phase: DragPhase,
    pub location: Point,
    /// Offset from the touch-down point.
    pub translation: Point,
}

impl PanSample {
    #[must_use]
    pub fn new(source: PanSource, phase: DragPhase, location: Point, translation: Point) -> Self {
        Self {
            source,
            phase,
            location,
            translation,
        }
    }

    /// A vertical-pan sample at `y` (x fixed mid-screen).
    #[must_use]
    pub fn vertical(phase: DragPhase, y: f64) -> Self {
        Self::new(PanSource::Vertical, phase, Point::new(200.0, y), Point::ZERO)
    }

    /// An edge-pan sample `dx` points in from the touch-down point.
    #[must_use]
    pub fn edge(phase: DragPhase, dx: f64) -> Self {
        Self::new(
            PanSource::Edge,
            phase,
            Point::new(dx, 400.0),
            Point::new(dx, 0.0),
        )
    }
}

/// Where the controller is in a drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Tracking,
    Reversing,
    Committed,
}

/// Translates drags into dismissal progress and arbitrates commit vs cancel.
#[derive(Debug, Clone)]
pub struct InteractiveDismissController {
    config: GestureConfig,
    arena: GestureArena,
    edge: RecognizerId,
    pan: RecognizerId,
    scroll: RecognizerId,
    phase: SessionPhase,
    source: Option<PanSource>,
    interactive_starting_point: Option<Point>,
    dismissal_animator: Option<InterruptibleAnimator>,
    recognizers_enabled: bool,
    cooldown: Option<Duration>,
    animators_built: u64,
    rejections: u64,
}

impl InteractiveDismissController {
    /// Controller for content covering `bounds`.
    #[must_use]
    pub fn new(bounds: Rect, config: GestureConfig) -> Self {
        let mut arena = GestureArena::new(bounds, config.to_pan_config());
        let edge = arena.add(PanRecognizer::new(PanKind::ScreenEdge(Edges::LEFT)));
        let pan = arena.add(PanRecognizer::new(PanKind::Free));
        let scroll = arena.add(PanRecognizer::new(PanKind::Free));
        arena.defer_to(pan, edge);
        arena.defer_to(scroll, edge);
        Self {
            config,
            arena,
            edge,
            pan,
            scroll,
            phase: SessionPhase::Idle,
            source: None,
            interactive_starting_point: None,
            dismissal_animator: None,
            recognizers_enabled: true,
            cooldown: None,
            animators_built: 0,
            rejections: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn arena(&self) -> &GestureArena {
        &self.arena
    }

    /// Recognizer the content's own scrolling is arbitrated through.
    #[inline]
    #[must_use]
    pub fn scroll_recognizer(&self) -> RecognizerId {
        self.scroll
    }

    #[inline]
    #[must_use]
    pub fn interactive_starting_point(&self) -> Option<Point> {
        self.interactive_starting_point
    }

    #[inline]
    #[must_use]
    pub fn dismissal_animator(&self) -> Option<&InterruptibleAnimator> {
        self.dismissal_animator.as_ref()
    }

    /// Dismissal animators constructed over the controller's lifetime.
    #[inline]
    #[must_use]
    pub fn animators_built(&self) -> u64 {
        self.animators_built
    }

    /// Drags rejected by the reveal gate.
    #[inline]
    #[must_use]
    pub fn rejections(&self) -> u64 {
        self.rejections
    }

    #[must_use]
    pub fn is_recognizer_enabled(&self, source: PanSource) -> bool {
        self.arena
            .recognizer(self.recognizer_for(source))
            .is_some_and(PanRecognizer::is_enabled)
    }

    /// Update the edge-detection bounds (e.g. after rotation).
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.arena.set_bounds(bounds);
    }

    fn recognizer_for(&self, source: PanSource) -> RecognizerId {
        match source {
            PanSource::Edge => self.edge,
            PanSource::Vertical => self.pan,
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Feed a raw touch through the gesture arena.
    pub fn handle_touch(&mut self, event: &TouchEvent, host: &mut dyn DismissHost) {
        for update in self.arena.process(event) {
            self.handle_update(update, host);
        }
    }

    fn handle_update(&mut self, update: GestureUpdate, host: &mut dyn DismissHost) {
        let source = if update.recognizer == self.edge {
            PanSource::Edge
        } else if update.recognizer == self.pan {
            PanSource::Vertical
        } else {
            return;
        };
        let phase = match update.state {
            RecognizerState::Began => DragPhase::Began,
            RecognizerState::Changed => DragPhase::Changed,
            RecognizerState::Ended => DragPhase::Ended,
            RecognizerState::Cancelled | RecognizerState::Failed => DragPhase::Cancelled,
            RecognizerState::Possible => return,
        };
        self.handle_pan(
            PanSample::new(source, phase, update.location, update.translation),
            host,
        );
    }

    /// Handle one pan callback.
    pub fn handle_pan(&mut self, sample: PanSample, host: &mut dyn DismissHost) {
        match sample.phase {
            DragPhase::Began | DragPhase::Changed => self.drag_moved(sample, host),
            DragPhase::Ended | DragPhase::Cancelled => self.drag_released(sample, host),
        }
    }

    /// Dismissal progress for `sample`; may be negative or exceed 1.
    #[must_use]
    pub fn progress(&self, sample: &PanSample) -> f64 {
        let distance = self.config.progress_distance;
        match sample.source {
            PanSource::Edge => sample.translation.x / distance,
            PanSource::Vertical => {
                let start = self.interactive_starting_point.unwrap_or(sample.location);
                (sample.location.y - start.y) / distance
            }
        }
    }

    /// The session's shrink animator, created paused at `progress` if this
    /// session has none yet.
    pub fn create_dismissal_animator_if_needed(
        &mut self,
        progress: f64,
    ) -> &mut InterruptibleAnimator {
        let duration = self.config.reversal_duration();
        let built = &mut self.animators_built;
        self.dismissal_animator.get_or_insert_with(|| {
            *built += 1;
            trace!(progress, "dismissal animator created");
            let mut animator = InterruptibleAnimator::new(duration, TimingCurve::Linear);
            animator.pause();
            animator.set_fraction_complete(progress);
            animator
        })
    }

    fn drag_moved(&mut self, sample: PanSample, host: &mut dyn DismissHost) {
        match self.phase {
            SessionPhase::Idle => {
                if !self.recognizers_enabled {
                    return;
                }
                if sample.source == PanSource::Vertical && !host.allows_vertical_dismiss() {
                    return;
                }
                self.phase = SessionPhase::Tracking;
                self.source = Some(sample.source);
                self.interactive_starting_point = Some(sample.location);
                debug!(source = ?sample.source, "interactive dismiss began");
                host.interactive_signal(InteractiveSignal::Began);
            }
            SessionPhase::Tracking if self.source == Some(sample.source) => {}
            _ => return,
        }

        let progress = self.progress(&sample);
        let animator = self.create_dismissal_animator_if_needed(progress);
        animator.set_fraction_complete(progress);
        let shown = animator.progress();
        self.render_shrink(shown, host);

        if progress >= 1.0 {
            if host.reveal_state().permits_dismissal() {
                self.commit(host);
            } else {
                self.reject(sample.source, host);
            }
        }
    }

    fn drag_released(&mut self, sample: PanSample, host: &mut dyn DismissHost) {
        match self.phase {
            SessionPhase::Idle => {
                // Released before any drag began.
                trace!(source = ?sample.source, "release without a drag session");
                self.clear_session();
            }
            SessionPhase::Tracking if self.source == Some(sample.source) => {
                self.begin_reversal(host);
            }
            _ => {}
        }
    }

    fn commit(&mut self, host: &mut dyn DismissHost) {
        let Some(animator) = self.dismissal_animator.as_mut() else {
            return;
        };
        animator.stop(false);
        let finished = animator.finish_at(AnimatingPosition::End);
        self.phase = SessionPhase::Committed;
        self.set_recognizers_enabled(false);
        self.render_shrink(1.0, host);
        debug!("interactive dismiss committed");
        host.interactive_signal(InteractiveSignal::Committed);
        if finished.is_some() {
            host.request_dismiss();
        }
        self.interactive_starting_point = None;
        self.dismissal_animator = None;
    }

    fn reject(&mut self, source: PanSource, host: &mut dyn DismissHost) {
        self.rejections += 1;
        debug!(?source, "interactive dismiss rejected; reveal first");
        // Cancels the live gesture; the rest of this touch is ignored.
        let _ = self.arena.set_enabled(self.recognizer_for(source), false);
        host.cancel_scroll();
        host.show_transient_banner(&self.config.rejection_message);
        self.cooldown = self.config.rejection_reenable_delay();
        self.begin_reversal(host);
    }

    fn begin_reversal(&mut self, host: &mut dyn DismissHost) {
        let Some(animator) = self.dismissal_animator.as_mut() else {
            self.clear_session();
            return;
        };
        animator.pause();
        animator.set_reversed(true);
        let from = animator.fraction_complete();
        animator.start();
        self.set_recognizers_enabled(false);
        self.phase = SessionPhase::Reversing;
        debug!(from, "interactive dismiss cancelled; reversing");
        host.interactive_signal(InteractiveSignal::Cancelling);
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance the reversal animation and any rejection cooldown.
    pub fn tick(&mut self, dt: Duration, host: &mut dyn DismissHost) {
        if let Some(remaining) = self.cooldown {
            self.cooldown = remaining.checked_sub(dt).filter(|r| !r.is_zero());
        }

        if self.phase == SessionPhase::Reversing {
            let step = self
                .dismissal_animator
                .as_mut()
                .map(|a| (a.advance(dt), a.progress()));
            match step {
                Some((done, shown)) => {
                    self.render_shrink(shown, host);
                    if done.is_some() {
                        self.finish_reversal(host);
                    }
                }
                None => self.finish_reversal(host),
            }
        }

        if self.phase == SessionPhase::Idle && !self.recognizers_enabled && self.cooldown.is_none()
        {
            self.set_recognizers_enabled(true);
        }
    }

    fn finish_reversal(&mut self, host: &mut dyn DismissHost) {
        self.clear_session();
        debug!("interactive dismiss restored");
        host.interactive_signal(InteractiveSignal::Restored);
        if self.cooldown.is_none() {
            self.set_recognizers_enabled(true);
        }
    }

    /// Return to idle with recognizers enabled, e.g. after a committed
    /// dismissal was reverted.
    pub fn reset(&mut self) {
        self.clear_session();
        self.cooldown = None;
        self.set_recognizers_enabled(true);
    }

    fn clear_session(&mut self) {
        self.phase = SessionPhase::Idle;
        self.source = None;
        self.interactive_starting_point = None;
        self.dismissal_animator = None;
    }

    fn set_recognizers_enabled(&mut self, enabled: bool) {
        self.recognizers_enabled = enabled;
        for id in [self.edge, self.pan] {
            // Cancellations caused by disabling are handled by the caller.
            let _ = self.arena.set_enabled(id, enabled);
        }
        trace!(enabled, "dismiss recognizers toggled");
    }

    fn render_shrink(&self, fraction: f64, host: &mut dyn DismissHost) {
        let scale = lerp(1.0, self.config.shrink_scale, fraction);
        let radius = lerp(0.0, self.config.target_corner_radius, fraction);
        host.apply_shrink(scale, radius);
    }
}
