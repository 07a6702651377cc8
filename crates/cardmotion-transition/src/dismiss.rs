#![forbid(unsafe_code)]

//! Full-screen → card dismissal driver.
//!
//! The content is wrapped in a temporary container seeded with wherever the
//! content currently renders (already shrunk, if an interactive drag got it
//! there). A damped spring then carries the container to the origin card's
//! resting frame while the content's corner radius returns to the card's.
//! In parallel the content scrolls back to the top over the first 60% of
//! the run.
//!
//! # Invariants
//!
//! 1. The completion token reports `!cancelled`, exactly once.
//! 2. On a committed dismissal the origin card is visible again when the
//!    outcome is returned; on a cancelled one the guard is handed back.
//! 3. The temporary container is removed on every exit path.

use std::rc::Rc;
use std::time::Duration;

use cardmotion_core::animation::{InterruptibleAnimator, TimingCurve};
use cardmotion_core::geometry::{Rect, lerp};
use tracing::{debug, warn};

use crate::completion::CompletionToken;
use crate::config::DismissConfig;
use crate::error::{Result, TransitionError};
use crate::origin::OriginGuard;
use crate::params::{EntityId, TransitionParameters};
use crate::scene::{Layout, NodeId, SharedScene};
use crate::screen::PresentedScreen;

const SCROLL_TRACK: &str = "scroll";

/// How a dismissal ended.
#[derive(Debug)]
pub enum DismissOutcome {
    /// The card is back in the grid.
    Dismissed,
    /// Cancelled; the content is full-screen again and the guard still
    /// hides the origin.
    Reverted(OriginGuard),
}

/// Drives one dismissal to completion.
#[derive(Debug)]
pub struct DismissDriver {
    scene: SharedScene,
    params: Rc<TransitionParameters>,
    animator: InterruptibleAnimator,
    container: NodeId,
    content: NodeId,
    scroll: NodeId,
    from: Rect,
    from_radius: f64,
    to_radius: f64,
    scroll_from: f64,
    guard: Option<OriginGuard>,
    completion: Option<CompletionToken>,
}

impl DismissDriver {
    /// Wrap the content and start animating back to the card.
    pub fn start(
        scene: &SharedScene,
        params: Rc<TransitionParameters>,
        screen: &dyn PresentedScreen,
        guard: OriginGuard,
        config: &DismissConfig,
        completion: CompletionToken,
    ) -> Result<Self> {
        let content = screen.content_node();
        let scroll = screen.scroll_node();
        let to_radius = screen
            .card_corner_radius()
            .unwrap_or(params.origin_corner_radius);

        let seeded = {
            let mut s = scene.borrow_mut();
            let current = s.screen_frame(content);
            let root = s.root();
            current.and_then(|from| {
                let container = s.create_temporary_container(root, from)?;
                let from_radius = s.corner_radius(content).unwrap_or(0.0);
                let scroll_from = s.scroll_offset(scroll).unwrap_or(0.0);
                s.reparent(content, container);
                s.set_scale(content, 1.0);
                s.set_layout(content, Layout::FullBleed);
                Some((container, from, from_radius, scroll_from))
            })
        };
        let Some((container, from, from_radius, scroll_from)) = seeded else {
            // Dropping the guard unhides the origin.
            drop(guard);
            completion.complete(false);
            return Err(TransitionError::ContentMissing { node: content.raw() });
        };

        let mut animator =
            InterruptibleAnimator::new(config.duration(), TimingCurve::spring(config.damping))
                .with_track(SCROLL_TRACK, 0.0, config.scroll_reset_factor, TimingCurve::EaseInOut);
        animator.start();

        debug!(
            entity_id = params.entity_id.get(),
            damping = config.damping,
            duration_ms = config.duration().as_millis() as u64,
            "dismiss started"
        );

        Ok(Self {
            scene: Rc::clone(scene),
            params,
            animator,
            container,
            content,
            scroll,
            from,
            from_radius,
            to_radius,
            scroll_from,
            guard: Some(guard),
            completion: Some(completion),
        })
    }

    #[inline]
    #[must_use]
    pub fn animator(&self) -> &InterruptibleAnimator {
        &self.animator
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.params.entity_id
    }

    /// Frame the content started from, in screen coordinates.
    #[inline]
    #[must_use]
    pub fn start_frame(&self) -> Rect {
        self.from
    }

    #[inline]
    #[must_use]
    pub fn fraction_complete(&self) -> f64 {
        self.animator.fraction_complete()
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.completion.is_none()
    }

    /// Advance the animation. Returns the outcome on the tick that finishes.
    pub fn tick(&mut self, dt: Duration) -> Option<DismissOutcome> {
        if self.is_finished() {
            return None;
        }
        let done = self.animator.advance(dt);
        self.apply();
        done.map(|_| self.finish(false))
    }

    /// Cancel: snap the content back to full screen.
    pub fn cancel(&mut self) -> Option<DismissOutcome> {
        if self.is_finished() {
            return None;
        }
        self.animator.stop(true);
        debug!(entity_id = self.params.entity_id.get(), "dismiss cancelled");
        Some(self.finish(true))
    }

    fn apply(&self) {
        let t = self.animator.progress();
        let scroll_t = self.animator.track_value(SCROLL_TRACK).unwrap_or(t);
        let Ok(mut s) = self.scene.try_borrow_mut() else {
            return;
        };
        s.set_frame(
            self.container,
            Rect::lerp(self.from, self.params.origin_frame_at_rest, t),
        );
        s.set_corner_radius(self.content, lerp(self.from_radius, self.to_radius, t));
        s.set_scroll_offset(self.scroll, lerp(self.scroll_from, 0.0, scroll_t));
    }

    fn finish(&mut self, cancelled: bool) -> DismissOutcome {
        match self.scene.try_borrow_mut() {
            Ok(mut s) => {
                let root = s.root();
                if cancelled {
                    s.reparent(self.content, root);
                    s.set_layout(self.content, Layout::FullBleed);
                    s.set_corner_radius(self.content, 0.0);
                } else {
                    s.detach(self.content);
                }
                s.remove(self.container);
            }
            Err(_) => warn!(
                entity_id = self.params.entity_id.get(),
                "scene busy while finishing dismiss; container left behind"
            ),
        }

        let success = !cancelled;
        debug!(entity_id = self.params.entity_id.get(), success, "dismiss finished");
        let guard = self.guard.take();
        let outcome = match guard {
            Some(guard) if cancelled => DismissOutcome::Reverted(guard),
            Some(guard) => {
                guard.restore();
                DismissOutcome::Dismissed
            }
            None => DismissOutcome::Dismissed,
        };
        if let Some(token) = self.completion.take() {
            token.complete(success);
        }
        outcome
    }
}

impl Drop for DismissDriver {
    fn drop(&mut self) {
        if !self.is_finished() {
            warn!(
                entity_id = self.params.entity_id.get(),
                "dismiss driver dropped mid-flight"
            );
            // Reverted guard is dropped here, which unhides the origin.
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::screen::ScreenNodes;
    use cardmotion_core::geometry::Size;
    use std::cell::RefCell;

    const FRAME: Duration = Duration::from_millis(16);
    const CARD: Rect = Rect::new(20.0, 500.0, 150.0, 220.0);

    struct Fixture {
        scene: SharedScene,
        card: NodeId,
        screen: ScreenNodes,
        params: Rc<TransitionParameters>,
        results: Rc<RefCell<Vec<bool>>>,
    }

    /// A card already presented full screen, scrolled down a bit.
    fn presented() -> Fixture {
        let mut scene = Scene::new(Size::new(390.0, 844.0));
        let grid = scene.add_labeled(scene.root(), scene.bounds(), "grid").unwrap();
        let card = scene.add_labeled(grid, CARD, "card").unwrap();
        scene.set_corner_radius(card, 12.0);
        let params = TransitionParameters::capture(&scene, card, EntityId::new(2)).unwrap();
        let content = scene.add_labeled(scene.root(), scene.bounds(), "detail").unwrap();
        scene.set_layout(content, Layout::FullBleed);
        scene.set_scroll_offset(content, 300.0);
        Fixture {
            scene: scene.shared(),
            card,
            screen: ScreenNodes::new(content),
            params: Rc::new(params),
            results: Rc::new(RefCell::new(Vec::new())),
        }
    }

    impl Fixture {
        fn start(&self) -> DismissDriver {
            let guard = OriginGuard::acquire(&self.scene, self.card, EntityId::new(2)).unwrap();
            let results = Rc::clone(&self.results);
            DismissDriver::start(
                &self.scene,
                Rc::clone(&self.params),
                &self.screen,
                guard,
                &DismissConfig::default(),
                CompletionToken::new(move |ok| results.borrow_mut().push(ok)),
            )
            .unwrap()
        }
    }

    #[test]
    fn seeds_from_current_shrunk_frame() {
        let f = presented();
        f.scene.borrow_mut().set_scale(f.screen.content, 0.86);
        let shrunk = f.scene.borrow().screen_frame(f.screen.content).unwrap();
        let driver = f.start();
        assert!(driver.start_frame().approx_eq(&shrunk, 1e-9));
        let s = f.scene.borrow();
        assert!(s.screen_frame(f.screen.content).unwrap().approx_eq(&shrunk, 1e-9));
        assert_eq!(s.scale(f.screen.content), Some(1.0));
    }

    #[test]
    fn committed_dismiss_lands_on_card() {
        let f = presented();
        let mut driver = f.start();
        let mut outcome = None;
        let mut scroll_done_at = None;
        let mut finished_at = 0;
        for frame in 0..200 {
            if let Some(o) = driver.tick(FRAME) {
                outcome = Some(o);
                finished_at = frame;
                break;
            }
            if scroll_done_at.is_none()
                && f.scene.borrow().scroll_offset(f.screen.content) == Some(0.0)
            {
                scroll_done_at = Some(frame);
            }
        }
        assert!(matches!(outcome, Some(DismissOutcome::Dismissed)));
        // Scroll reset finishes well before the card lands.
        assert!(scroll_done_at.is_some_and(|at| at + 5 < finished_at));
        assert!(driver.tick(FRAME).is_none());

        let s = f.scene.borrow();
        assert_eq!(s.is_hidden(f.card), Some(false));
        assert_eq!(s.screen_frame(f.screen.content), None, "content removed");
        assert_eq!(s.corner_radius(f.screen.content), Some(12.0));
        assert_eq!(s.live_temporary_containers(), 0);
        assert_eq!(*f.results.borrow(), vec![true]);
    }

    #[test]
    fn cancelled_dismiss_restores_full_screen() {
        let f = presented();
        let mut driver = f.start();
        driver.tick(FRAME);
        driver.tick(FRAME);
        let outcome = driver.cancel();
        assert!(matches!(outcome, Some(DismissOutcome::Reverted(_))));
        {
            let s = f.scene.borrow();
            assert_eq!(s.parent(f.screen.content), Some(s.root()));
            assert_eq!(s.screen_frame(f.screen.content), Some(s.bounds()));
            assert_eq!(s.is_hidden(f.card), Some(true));
            assert_eq!(s.live_temporary_containers(), 0);
        }
        assert_eq!(*f.results.borrow(), vec![false]);
        drop(outcome);
        assert_eq!(f.scene.borrow().is_hidden(f.card), Some(false));
    }

    #[test]
    fn missing_content_refuses_and_unhides_origin() {
        let f = presented();
        f.scene.borrow_mut().detach(f.screen.content);
        let guard = OriginGuard::acquire(&f.scene, f.card, EntityId::new(2)).unwrap();
        let results = Rc::clone(&f.results);
        let err = DismissDriver::start(
            &f.scene,
            Rc::clone(&f.params),
            &f.screen,
            guard,
            &DismissConfig::default(),
            CompletionToken::new(move |ok| results.borrow_mut().push(ok)),
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::ContentMissing { .. }));
        assert_eq!(*f.results.borrow(), vec![false]);
        assert_eq!(f.scene.borrow().is_hidden(f.card), Some(false));
    }
}
