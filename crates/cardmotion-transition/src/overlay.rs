#![forbid(unsafe_code)]

//! Dimming backdrop shown behind a presented card.
//!
//! The backdrop is a full-bleed node inserted under the root before the
//! travelling content, so it always sits behind it. Its opacity follows the
//! presentation progress in and the dismissal progress out.

use cardmotion_core::geometry::lerp;

use crate::config::BackdropConfig;
use crate::scene::{Layout, NodeId, Scene};

/// The backdrop layer for one presentation.
#[derive(Debug, Clone)]
pub struct PresentationOverlay {
    config: BackdropConfig,
    backdrop: Option<NodeId>,
}

impl PresentationOverlay {
    #[must_use]
    pub fn new(config: BackdropConfig) -> Self {
        Self {
            config,
            backdrop: None,
        }
    }

    /// Insert the backdrop at zero opacity. Idempotent.
    pub fn install(&mut self, scene: &mut Scene) -> Option<NodeId> {
        if let Some(id) = self.backdrop.filter(|id| scene.contains(*id)) {
            return Some(id);
        }
        let id = scene.add_labeled(scene.root(), scene.bounds(), "backdrop")?;
        scene.set_layout(id, Layout::FullBleed);
        scene.set_alpha(id, 0.0);
        self.backdrop = Some(id);
        Some(id)
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.backdrop
    }

    #[inline]
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.backdrop.is_some()
    }

    /// Fade in with presentation progress `p` in `[0, 1]`.
    pub fn set_presentation_progress(&self, scene: &mut Scene, p: f64) {
        self.set_level(scene, p);
    }

    /// Fade out with dismissal progress `p` in `[0, 1]`.
    pub fn set_dismissal_progress(&self, scene: &mut Scene, p: f64) {
        self.set_level(scene, 1.0 - p);
    }

    fn set_level(&self, scene: &mut Scene, level: f64) {
        if let Some(id) = self.backdrop {
            let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
            scene.set_alpha(id, lerp(0.0, self.config.max_opacity, level));
        }
    }

    /// Remove the backdrop from the scene.
    pub fn remove(&mut self, scene: &mut Scene) {
        if let Some(id) = self.backdrop.take() {
            scene.remove(id);
        }
    }
}
