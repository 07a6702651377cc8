#![forbid(unsafe_code)]

//! Interruptible animator: a timed animation that can be paused, scrubbed,
//! reversed, stopped, and force-finished before its natural end.
//!
//! The animator tracks a normalized time position (`fraction_complete`) and
//! evaluates a primary [`TimingCurve`] plus any number of labeled tracks.
//! Each track starts at an offset and runs for a fraction of the base
//! duration with its own curve, which is how a nested sub-animation (for
//! example a linear expand that takes 60% of a spring's duration) is
//! expressed.
//!
//! # Lifecycle
//!
//! ```text
//! Inactive ──start/pause/set_fraction──▶ Active ──stop(false)──▶ Stopped
//!    ▲                                     │                        │
//!    └──────── natural end / finish_at ◀───┴──────── finish_at ◀────┘
//! ```
//!
//! # Invariants
//!
//! 1. `fraction_complete()` is always in `[0.0, 1.0]`.
//! 2. Completion is reported exactly once, by the call that finishes the
//!    animator (`tick` reaching an end, or `finish_at`). Afterwards every
//!    operation is a no-op until `reset()`.
//! 3. `stop(true)` ends the animator without reporting a completion.
//! 4. A reversed animator runs toward `fraction = 0` and finishes at
//!    [`AnimatingPosition::Start`].
//!
//! # Failure Modes
//!
//! - `finish_at` outside the `Stopped` state is refused and returns `None`.
//! - Zero duration: the next running tick finishes immediately.

use std::time::Duration;

use super::{Animation, TimingCurve};
use crate::logging::debug;

/// Where an animator ended up when it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatingPosition {
    /// Values are at their starting point.
    Start,
    /// Values are at their final point.
    End,
    /// Values were left wherever the animator was.
    Current,
}

/// Lifecycle state of an [`InterruptibleAnimator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimatorState {
    /// Not started, or finished.
    #[default]
    Inactive,
    /// Started (running or paused).
    Active,
    /// Stopped; waiting for [`InterruptibleAnimator::finish_at`].
    Stopped,
}

/// A nested animation running over part of the base duration.
#[derive(Debug, Clone)]
struct Track {
    label: String,
    /// Start offset as a fraction of the base duration.
    offset: f64,
    /// Length as a fraction of the base duration.
    length: f64,
    curve: TimingCurve,
}

impl Track {
    fn local_time(&self, fraction: f64) -> f64 {
        if self.length <= 0.0 {
            return if fraction >= self.offset { 1.0 } else { 0.0 };
        }
        ((fraction - self.offset) / self.length).clamp(0.0, 1.0)
    }
}

/// A timed, interruptible animation.
#[derive(Debug, Clone)]
pub struct InterruptibleAnimator {
    duration: Duration,
    curve: TimingCurve,
    tracks: Vec<Track>,
    state: AnimatorState,
    running: bool,
    reversed: bool,
    fraction: f64,
    /// Multiplier on the base duration for the remaining run.
    duration_factor: f64,
    finished_at: Option<AnimatingPosition>,
    overshoot: Duration,
}

impl InterruptibleAnimator {
    /// Create an inactive animator.
    #[must_use]
    pub fn new(duration: Duration, curve: TimingCurve) -> Self {
        Self {
            duration,
            curve,
            tracks: Vec::new(),
            state: AnimatorState::Inactive,
            running: false,
            reversed: false,
            fraction: 0.0,
            duration_factor: 1.0,
            finished_at: None,
            overshoot: Duration::ZERO,
        }
    }

    /// Add a labeled track (builder pattern).
    ///
    /// `offset` and `length` are fractions of the base duration and are
    /// clamped to `[0, 1]`.
    #[must_use]
    pub fn with_track(mut self, label: &str, offset: f64, length: f64, curve: TimingCurve) -> Self {
        self.add_track(label, offset, length, curve);
        self
    }

    /// Add a labeled track.
    pub fn add_track(&mut self, label: &str, offset: f64, length: f64, curve: TimingCurve) {
        let offset = offset.clamp(0.0, 1.0);
        let length = length.clamp(0.0, 1.0 - offset);
        self.tracks.push(Track {
            label: label.to_string(),
            offset,
            length,
            curve,
        });
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Normalized time position in `[0.0, 1.0]`.
    #[inline]
    #[must_use]
    pub fn fraction_complete(&self) -> f64 {
        self.fraction
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn curve(&self) -> TimingCurve {
        self.curve
    }

    /// Whether the animator has reported its completion.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Position reported at completion, if finished.
    #[inline]
    #[must_use]
    pub fn finished_at(&self) -> Option<AnimatingPosition> {
        self.finished_at
    }

    /// Eased progress of the primary curve.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.curve.evaluate(self.fraction)
    }

    /// Eased progress of a labeled track, or `None` if no such track exists.
    #[must_use]
    pub fn track_value(&self, label: &str) -> Option<f64> {
        self.tracks
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.curve.evaluate(t.local_time(self.fraction)))
    }

    // -----------------------------------------------------------------------
    // Control
    // -----------------------------------------------------------------------

    /// Start or resume running. No-op once finished or while stopped.
    pub fn start(&mut self) {
        if self.is_finished() || self.state == AnimatorState::Stopped {
            return;
        }
        self.state = AnimatorState::Active;
        self.running = true;
    }

    /// Pause. An inactive animator becomes active and paused.
    pub fn pause(&mut self) {
        if self.is_finished() || self.state == AnimatorState::Stopped {
            return;
        }
        self.state = AnimatorState::Active;
        self.running = false;
    }

    /// Scrub to a normalized time position (clamped to `[0, 1]`).
    ///
    /// An inactive animator becomes active and paused.
    pub fn set_fraction_complete(&mut self, fraction: f64) {
        if self.is_finished() || self.state == AnimatorState::Stopped {
            return;
        }
        if self.state == AnimatorState::Inactive {
            self.state = AnimatorState::Active;
            self.running = false;
        }
        self.fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
    }

    /// Set the direction of travel for subsequent running.
    pub fn set_reversed(&mut self, reversed: bool) {
        if self.is_finished() {
            return;
        }
        self.reversed = reversed;
    }

    /// Resume running with the remaining time scaled by `duration_factor`.
    pub fn continue_animation(&mut self, duration_factor: f64) {
        if self.is_finished() || self.state == AnimatorState::Stopped {
            return;
        }
        self.duration_factor = duration_factor.max(0.0);
        self.start();
    }

    /// Stop the animator.
    ///
    /// With `without_finishing = true` the animator ends immediately and no
    /// completion is ever reported. Otherwise it moves to `Stopped` and
    /// waits for [`finish_at`](Self::finish_at).
    pub fn stop(&mut self, without_finishing: bool) {
        if self.is_finished() {
            return;
        }
        self.running = false;
        if without_finishing {
            self.state = AnimatorState::Inactive;
            self.finished_at = Some(AnimatingPosition::Current);
        } else {
            self.state = AnimatorState::Stopped;
        }
    }

    /// Finish a stopped animator at `position`, reporting completion.
    ///
    /// Returns `None` (and changes nothing) unless the animator is `Stopped`.
    pub fn finish_at(&mut self, position: AnimatingPosition) -> Option<AnimatingPosition> {
        if self.state != AnimatorState::Stopped || self.is_finished() {
            debug!(
                state = ?self.state,
                finished = self.is_finished(),
                "finish_at refused outside the stopped state"
            );
            return None;
        }
        match position {
            AnimatingPosition::Start => self.fraction = 0.0,
            AnimatingPosition::End => self.fraction = 1.0,
            AnimatingPosition::Current => {}
        }
        Some(self.complete(position))
    }

    /// Advance by `dt`, returning the completion position if this tick
    /// finished the animator.
    pub fn advance(&mut self, dt: Duration) -> Option<AnimatingPosition> {
        if !self.running || self.is_finished() {
            return None;
        }

        let span = self.duration.as_secs_f64() * self.duration_factor;
        let step = if span <= 0.0 {
            1.0
        } else {
            dt.as_secs_f64() / span
        };

        if self.reversed {
            let next = self.fraction - step;
            if next <= 0.0 {
                self.overshoot = Duration::from_secs_f64((-next * span).max(0.0));
                self.fraction = 0.0;
                return Some(self.complete(AnimatingPosition::Start));
            }
            self.fraction = next;
        } else {
            let next = self.fraction + step;
            if next >= 1.0 {
                self.overshoot = Duration::from_secs_f64(((next - 1.0) * span).max(0.0));
                self.fraction = 1.0;
                return Some(self.complete(AnimatingPosition::End));
            }
            self.fraction = next;
        }
        None
    }

    fn complete(&mut self, position: AnimatingPosition) -> AnimatingPosition {
        self.running = false;
        self.state = AnimatorState::Inactive;
        self.finished_at = Some(position);
        position
    }
}

impl Animation for InterruptibleAnimator {
    fn tick(&mut self, dt: Duration) {
        let _ = self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.is_finished()
    }

    fn value(&self) -> f64 {
        self.progress()
    }

    fn reset(&mut self) {
        self.state = AnimatorState::Inactive;
        self.running = false;
        self.reversed = false;
        self.fraction = 0.0;
        self.duration_factor = 1.0;
        self.finished_at = None;
        self.overshoot = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.overshoot
    }
}
