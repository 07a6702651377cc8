#![forbid(unsafe_code)]

//! Damped harmonic oscillator expressed as a timing curve.
//!
//! A spring here is described the way motion designers talk about it: a
//! damping ratio and a duration, not stiffness and mass. The natural
//! frequency is chosen so the oscillation envelope has decayed to a fraction
//! of a percent by the end of the duration, which makes the curve usable as
//! a normalized timing function over `t ∈ [0, 1]`.
//!
//! With displacement `u(t) = x(t) - 1`, `u(0) = -1`, `u'(0) = v0`:
//!
//! - Underdamped (ζ < 1): `u = e^(-ζω t) (A cos ω_d t + B sin ω_d t)`
//! - Critically damped (ζ = 1): `u = (A + B t) e^(-ω t)`
//!
//! # Invariants
//!
//! 1. `evaluate(0.0) == 0.0` and `evaluate(t) == 1.0` for every `t >= 1.0`.
//! 2. Damping ratio is clamped to `[MIN_DAMPING_RATIO, 1.0]`; overdamped
//!    springs are treated as critically damped.
//! 3. Lower damping ratios overshoot more.

/// Envelope decay exponent reached at `t = 1`: `e^-9 ≈ 1.2e-4`.
const SETTLE_EXPONENT: f64 = 9.0;

/// Below this the curve oscillates so fast it stops being useful UI motion.
pub const MIN_DAMPING_RATIO: f64 = 0.05;

/// Spring timing described by damping ratio and initial velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringTiming {
    damping_ratio: f64,
    initial_velocity: f64,
}

impl SpringTiming {
    /// Create a spring timing with zero initial velocity.
    #[must_use]
    pub fn new(damping_ratio: f64) -> Self {
        Self {
            damping_ratio: damping_ratio.clamp(MIN_DAMPING_RATIO, 1.0),
            initial_velocity: 0.0,
        }
    }

    /// Set the initial velocity, in units of total travel per duration.
    #[must_use]
    pub fn with_initial_velocity(mut self, velocity: f64) -> Self {
        self.initial_velocity = velocity;
        self
    }

    #[inline]
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    #[inline]
    #[must_use]
    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    /// Natural angular frequency in radians per unit of normalized time.
    #[must_use]
    pub fn natural_frequency(&self) -> f64 {
        SETTLE_EXPONENT / self.damping_ratio
    }

    /// Evaluate the spring position at normalized time `t`.
    ///
    /// Returns values that may exceed 1.0 while the spring overshoots.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        let zeta = self.damping_ratio;
        let omega = self.natural_frequency();
        let v0 = self.initial_velocity;

        let displacement = if zeta < 1.0 - 1e-9 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let a = -1.0;
            let b = (v0 + zeta * omega * a) / omega_d;
            (-zeta * omega * t).exp() * (a * (omega_d * t).cos() + b * (omega_d * t).sin())
        } else {
            let a = -1.0;
            let b = v0 + omega * a;
            (a + b * t) * (-omega * t).exp()
        };

        1.0 + displacement
    }

    /// Largest value reached over `[0, 1]`, sampled.
    #[must_use]
    pub fn peak(&self) -> f64 {
        (0..=400)
            .map(|i| self.evaluate(f64::from(i) / 400.0))
            .fold(0.0, f64::max)
    }
}

impl Default for SpringTiming {
    /// Slightly underdamped: a subtle bounce.
    fn default() -> Self {
        Self::new(0.8)
    }
}
