#![forbid(unsafe_code)]

//! Tunables for the card transition, loadable as data.
//!
//! Every knob the drivers and the interactive controller use lives in one
//! [`TransitionConfig`]. With the `config` feature it can be loaded from TOML
//! or JSON at startup:
//!
//! ```toml
//! [present]
//! max_duration_secs = 0.8
//!
//! [gesture]
//! progress_distance = 120.0
//! rejection_message = "Reveal the answer first"
//! ```
//!
//! ```rust,ignore
//! let config = TransitionConfig::from_toml_file("cardmotion.toml")?;
//! ```
//!
//! # Defaults
//!
//! `TransitionConfig::default()` reproduces the stock card motion: a spring
//! whose damping falls from 1.0 toward 0.7 with travel distance, 0.5 to 0.9s
//! long, a 100pt drag for full dismissal progress, and a shrink to 86%.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cardmotion_core::gesture::PanConfig;

// ---------------------------------------------------------------------------
// Top-level TransitionConfig
// ---------------------------------------------------------------------------

/// All transition tunables.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TransitionConfig {
    pub present: PresentConfig,
    pub dismiss: DismissConfig,
    pub gesture: GestureConfig,
    pub backdrop: BackdropConfig,
}

impl TransitionConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing wrong.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Check every parameter is in range.
    ///
    /// Returns a list of problems; empty means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let p = &self.present;
        let d = &self.dismiss;
        let g = &self.gesture;

        if !(0.0..=1.0).contains(&p.damping_interval) {
            errors.push(format!(
                "present.damping_interval must be in [0, 1], got {}",
                p.damping_interval
            ));
        }
        if !(p.min_damping > 0.0 && p.min_damping <= p.max_damping && p.max_damping <= 1.0) {
            errors.push(format!(
                "present damping range must satisfy 0 < min <= max <= 1, got {}..{}",
                p.min_damping, p.max_damping
            ));
        }
        if !positive_finite(p.baseline_duration_secs) {
            errors.push(format!(
                "present.baseline_duration_secs must be finite and > 0, got {}",
                p.baseline_duration_secs
            ));
        }
        if !p.max_duration_secs.is_finite() {
            errors.push(format!(
                "present.max_duration_secs must be finite, got {}",
                p.max_duration_secs
            ));
        } else if p.max_duration_secs < p.baseline_duration_secs {
            errors.push(format!(
                "present.max_duration_secs ({}) must be >= baseline_duration_secs ({})",
                p.max_duration_secs, p.baseline_duration_secs
            ));
        }
        if !(p.expand_factor > 0.0 && p.expand_factor <= 1.0) {
            errors.push(format!(
                "present.expand_factor must be in (0, 1], got {}",
                p.expand_factor
            ));
        }

        if !(d.damping > 0.0 && d.damping <= 1.0) {
            errors.push(format!("dismiss.damping must be in (0, 1], got {}", d.damping));
        }
        if !positive_finite(d.duration_secs) {
            errors.push(format!(
                "dismiss.duration_secs must be finite and > 0, got {}",
                d.duration_secs
            ));
        }
        if !(d.scroll_reset_factor > 0.0 && d.scroll_reset_factor <= 1.0) {
            errors.push(format!(
                "dismiss.scroll_reset_factor must be in (0, 1], got {}",
                d.scroll_reset_factor
            ));
        }

        if g.progress_distance <= 0.0 {
            errors.push(format!(
                "gesture.progress_distance must be > 0, got {}",
                g.progress_distance
            ));
        }
        if !(g.shrink_scale > 0.0 && g.shrink_scale <= 1.0) {
            errors.push(format!(
                "gesture.shrink_scale must be in (0, 1], got {}",
                g.shrink_scale
            ));
        }
        if g.target_corner_radius < 0.0 {
            errors.push(format!(
                "gesture.target_corner_radius must be >= 0, got {}",
                g.target_corner_radius
            ));
        }
        if !positive_finite(g.reversal_duration_secs) {
            errors.push(format!(
                "gesture.reversal_duration_secs must be finite and > 0, got {}",
                g.reversal_duration_secs
            ));
        }
        if g.edge_inset <= 0.0 {
            errors.push(format!("gesture.edge_inset must be > 0, got {}", g.edge_inset));
        }
        if g.pan_slop < 0.0 {
            errors.push(format!("gesture.pan_slop must be >= 0, got {}", g.pan_slop));
        }
        if let Some(delay) = g.rejection_reenable_delay_secs
            && !(delay >= 0.0 && delay.is_finite())
        {
            errors.push(format!(
                "gesture.rejection_reenable_delay_secs must be finite and >= 0, got {delay}"
            ));
        }

        if !(0.0..=1.0).contains(&self.backdrop.max_opacity) {
            errors.push(format!(
                "backdrop.max_opacity must be in [0, 1], got {}",
                self.backdrop.max_opacity
            ));
        }

        errors
    }
}

fn positive_finite(secs: f64) -> bool {
    secs > 0.0 && secs.is_finite()
}

/// Seconds to a `Duration`. Negative and NaN clamp to zero; values too
/// large to represent (including infinity) also fall back to zero, so a
/// config that skipped `validate` animates instantly instead of panicking.
pub(crate) fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Card-to-full-screen presentation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PresentConfig {
    /// How much damping drops over a full-length travel.
    pub damping_interval: f64,
    pub min_damping: f64,
    pub max_damping: f64,
    /// Duration for zero travel.
    pub baseline_duration_secs: f64,
    /// Duration for a full-screen travel.
    pub max_duration_secs: f64,
    /// Fraction of the duration spent growing from card to screen size.
    pub expand_factor: f64,
}

impl Default for PresentConfig {
    fn default() -> Self {
        Self {
            damping_interval: 0.3,
            min_damping: 0.7,
            max_damping: 1.0,
            baseline_duration_secs: 0.5,
            max_duration_secs: 0.9,
            expand_factor: 0.6,
        }
    }
}

/// Full-screen-to-card dismissal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DismissConfig {
    pub damping: f64,
    pub duration_secs: f64,
    /// Fraction of the duration spent scrolling back to the top.
    pub scroll_reset_factor: f64,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            damping: 0.7,
            duration_secs: 0.5,
            scroll_reset_factor: 0.6,
        }
    }
}

impl DismissConfig {
    #[must_use]
    pub fn duration(&self) -> Duration {
        secs_to_duration(self.duration_secs)
    }
}

/// Drag-to-dismiss.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GestureConfig {
    /// Drag distance, in points, that equals full dismissal progress.
    pub progress_distance: f64,
    /// Content scale at full progress.
    pub shrink_scale: f64,
    /// Content corner radius at full progress.
    pub target_corner_radius: f64,
    /// Time for a released drag to spring back from full progress.
    pub reversal_duration_secs: f64,
    pub edge_inset: f64,
    pub pan_slop: f64,
    /// Extra time a rejected gesture stays disabled after it has sprung
    /// back. `None` re-enables as soon as the reversal completes.
    pub rejection_reenable_delay_secs: Option<f64>,
    pub rejection_message: String,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            progress_distance: 100.0,
            shrink_scale: 0.86,
            target_corner_radius: 16.0,
            reversal_duration_secs: 0.25,
            edge_inset: 20.0,
            pan_slop: 8.0,
            rejection_reenable_delay_secs: None,
            rejection_message: "Guess or reveal first".to_string(),
        }
    }
}

impl GestureConfig {
    #[must_use]
    pub fn reversal_duration(&self) -> Duration {
        secs_to_duration(self.reversal_duration_secs)
    }

    #[must_use]
    pub fn rejection_reenable_delay(&self) -> Option<Duration> {
        self.rejection_reenable_delay_secs
            .map(secs_to_duration)
    }

    /// Recognizer tunables for the gesture arena.
    #[must_use]
    pub fn to_pan_config(&self) -> PanConfig {
        PanConfig {
            slop: self.pan_slop,
            edge_inset: self.edge_inset,
        }
    }
}

/// Dimming layer behind the presented card.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BackdropConfig {
    /// Opacity when fully presented.
    pub max_opacity: f64,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self { max_opacity: 0.6 }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a transition configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
