#![forbid(unsafe_code)]

//! Animation primitives: easing, spring timing, and the interruptible animator.
//!
//! Everything here is driven by explicit `tick(dt)` calls. Nothing reads a
//! wall clock, so the same sequence of ticks always produces the same values.

pub mod animator;
pub mod curve;
pub mod spring;

use std::time::Duration;

pub use animator::{AnimatingPosition, AnimatorState, InterruptibleAnimator};
pub use curve::TimingCurve;
pub use spring::SpringTiming;

/// A value that evolves over time as it is ticked.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current eased value. Usually in `[0.0, 1.0]`, but spring curves may
    /// overshoot.
    fn value(&self) -> f64;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Time consumed past the end by the last tick.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// An easing function over normalized time.
pub type EasingFn = fn(f64) -> f64;

/// Constant speed.
#[must_use]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-in (accelerating).
#[must_use]
pub fn ease_in(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Cubic ease-out (decelerating).
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Cubic S-curve.
#[must_use]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let inv = -2.0 * t + 2.0;
        1.0 - inv * inv * inv / 2.0
    }
}
