#![forbid(unsafe_code)]

//! Timing curves mapping normalized time to animation progress.

use super::{SpringTiming, ease_in, ease_in_out, ease_out, linear};

/// Timing curve applied to an animator or one of its tracks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimingCurve {
    /// Constant speed.
    #[default]
    Linear,
    /// Starts slow, ends fast.
    EaseIn,
    /// Starts fast, ends slow.
    EaseOut,
    /// Slow start and end.
    EaseInOut,
    /// Damped spring (can overshoot).
    Spring(SpringTiming),
}

impl TimingCurve {
    /// Spring curve with the given damping ratio and zero initial velocity.
    #[must_use]
    pub fn spring(damping_ratio: f64) -> Self {
        Self::Spring(SpringTiming::new(damping_ratio))
    }

    /// Evaluate at normalized time `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => linear(t),
            Self::EaseIn => ease_in(t),
            Self::EaseOut => ease_out(t),
            Self::EaseInOut => ease_in_out(t),
            Self::Spring(spring) => spring.evaluate(t),
        }
    }

    /// Check if this curve can produce values above 1.0.
    #[must_use]
    pub fn can_overshoot(&self) -> bool {
        matches!(self, Self::Spring(s) if s.damping_ratio() < 1.0)
    }
}
