#![forbid(unsafe_code)]

//! Card → full-screen presentation driver.
//!
//! The detail content is lifted into a temporary container placed at the
//! tapped card's on-screen position, then one spring-timed animator carries
//! two overlapping motions:
//!
//! - **bounce**: the container's origin springs to the top-left of the screen;
//! - **expand** (linear, first 60% of the run): the content grows from the
//!   card's size to the screen size while its corner radius drops to zero.
//!
//! On completion the container is discarded and the content is re-parented
//! onto the root, full-bleed, with scrolling enabled again.
//!
//! # Invariants
//!
//! 1. The completion token is resolved exactly once: `true` on natural
//!    completion, `false` when cancelled or torn down early.
//! 2. The temporary container exists only between [`PresentDriver::start`]
//!    and the outcome, and is removed on every exit path.
//! 3. The origin guard is returned to the caller on success and restored
//!    otherwise.
//!
//! # Failure Modes
//!
//! `start` refuses to run when the origin card or the content node is no
//! longer in the scene; the token reports `false` and nothing is mutated.

use std::rc::Rc;
use std::time::Duration;

use cardmotion_core::animation::{InterruptibleAnimator, TimingCurve};
use cardmotion_core::geometry::{Rect, Size, lerp};
use tracing::{debug, warn};

use crate::completion::CompletionToken;
use crate::config::{PresentConfig, secs_to_duration};
use crate::error::{Result, TransitionError};
use crate::origin::OriginGuard;
use crate::params::{EntityId, TransitionParameters};
use crate::scene::{Layout, NodeId, SharedScene};
use crate::screen::PresentedScreen;

const EXPAND_TRACK: &str = "expand";

/// Spring parameters derived from where the card starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentSpring {
    pub damping: f64,
    pub duration: Duration,
}

impl PresentSpring {
    /// Cards that start partly above the screen travel a short distance
    /// relative to their own height and get a stiffer, shorter spring;
    /// everything else uses a full-screen travel.
    #[must_use]
    pub fn for_origin(origin: Rect, screen: Size, config: &PresentConfig) -> Self {
        let above = origin.y < 0.0;
        let distance = if above { origin.y.abs() } else { screen.height };
        let extent = if above { origin.height } else { screen.height };
        let travel = if extent > 0.0 { distance / extent } else { 0.0 };
        let damping = (config.max_damping - config.damping_interval * travel)
            .clamp(config.min_damping, config.max_damping);

        let screen_ratio = if screen.height > 0.0 {
            (distance / screen.height).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let secs = config.baseline_duration_secs
            + (config.max_duration_secs - config.baseline_duration_secs) * screen_ratio;
        Self {
            damping,
            duration: secs_to_duration(secs),
        }
    }
}

/// How a presentation ended.
#[derive(Debug)]
pub enum PresentOutcome {
    /// The card is fully presented; the guard keeps the origin hidden.
    Presented(OriginGuard),
    /// Cancelled before completion; the origin is visible again.
    Aborted,
}

/// Drives one presentation to completion.
#[derive(Debug)]
pub struct PresentDriver {
    scene: SharedScene,
    params: Rc<TransitionParameters>,
    animator: InterruptibleAnimator,
    spring: PresentSpring,
    container: NodeId,
    content: NodeId,
    scroll: NodeId,
    surface: Size,
    card_radius: f64,
    guard: Option<OriginGuard>,
    completion: Option<CompletionToken>,
}

impl PresentDriver {
    /// Set up the scene and start animating.
    pub fn start(
        scene: &SharedScene,
        params: Rc<TransitionParameters>,
        screen: &dyn PresentedScreen,
        config: &PresentConfig,
        completion: CompletionToken,
    ) -> Result<Self> {
        let entity_id = params.entity_id;
        let content = screen.content_node();
        let scroll = screen.scroll_node();

        if !scene.borrow().contains(content) {
            completion.complete(false);
            return Err(TransitionError::ContentMissing { node: content.raw() });
        }
        let guard = match OriginGuard::acquire(scene, params.origin_view, entity_id) {
            Ok(guard) => guard,
            Err(err) => {
                debug!(entity_id = entity_id.get(), "origin gone; present refused");
                completion.complete(false);
                return Err(err);
            }
        };

        let origin = params.origin_frame_on_screen;
        let card_radius = screen
            .card_corner_radius()
            .unwrap_or(params.origin_corner_radius);

        let (surface, container) = {
            let mut s = scene.borrow_mut();
            let surface = s.bounds().size();
            let root = s.root();
            let container = s.create_temporary_container(
                root,
                Rect::from_origin_size(origin.origin(), surface),
            );
            let Some(container) = container else {
                drop(s);
                guard.restore();
                completion.complete(false);
                return Err(TransitionError::ContentMissing { node: content.raw() });
            };
            s.reparent(content, container);
            s.set_frame(content, Rect::from_size(origin.size()));
            s.set_scale(content, 1.0);
            s.set_corner_radius(content, card_radius);
            s.set_scroll_enabled(scroll, false);
            (surface, container)
        };

        let spring = PresentSpring::for_origin(origin, surface, config);
        let mut animator = InterruptibleAnimator::new(spring.duration, TimingCurve::spring(spring.damping))
            .with_track(EXPAND_TRACK, 0.0, config.expand_factor, TimingCurve::Linear);
        animator.start();

        debug!(
            entity_id = entity_id.get(),
            damping = spring.damping,
            duration_ms = spring.duration.as_millis() as u64,
            "present started"
        );

        Ok(Self {
            scene: Rc::clone(scene),
            params,
            animator,
            spring,
            container,
            content,
            scroll,
            surface,
            card_radius,
            guard: Some(guard),
            completion: Some(completion),
        })
    }

    #[inline]
    #[must_use]
    pub fn spring(&self) -> PresentSpring {
        self.spring
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

    /// Linear progress of the run in `[0, 1]`.
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
    pub fn tick(&mut self, dt: Duration) -> Option<PresentOutcome> {
        if self.is_finished() {
            return None;
        }
        let done = self.animator.advance(dt);
        self.apply();
        done.map(|_| self.finish(true))
    }

    /// Abandon the presentation now.
    pub fn cancel(&mut self) -> Option<PresentOutcome> {
        if self.is_finished() {
            return None;
        }
        self.animator.stop(true);
        debug!(entity_id = self.params.entity_id.get(), "present cancelled");
        Some(self.finish(false))
    }

    fn apply(&self) {
        let bounce = self.animator.progress();
        let expand = self.animator.track_value(EXPAND_TRACK).unwrap_or(bounce);
        let origin = self.params.origin_frame_on_screen;

        let Ok(mut s) = self.scene.try_borrow_mut() else {
            return;
        };
        s.set_frame(
            self.container,
            Rect::new(
                lerp(origin.x, 0.0, bounce),
                lerp(origin.y, 0.0, bounce),
                self.surface.width,
                self.surface.height,
            ),
        );
        s.set_frame(
            self.content,
            Rect::from_size(Size::lerp(origin.size(), self.surface, expand)),
        );
        s.set_corner_radius(self.content, lerp(self.card_radius, 0.0, expand));
    }

    fn finish(&mut self, success: bool) -> PresentOutcome {
        match self.scene.try_borrow_mut() {
            Ok(mut s) => {
                let root = s.root();
                if success {
                    s.reparent(self.content, root);
                    s.set_layout(self.content, Layout::FullBleed);
                    s.set_corner_radius(self.content, 0.0);
                } else {
                    s.detach(self.content);
                }
                s.set_scroll_enabled(self.scroll, true);
                s.remove(self.container);
            }
            Err(_) => warn!(
                entity_id = self.params.entity_id.get(),
                "scene busy while finishing present; container left behind"
            ),
        }

        debug!(entity_id = self.params.entity_id.get(), success, "present finished");
        let guard = self.guard.take();
        if let Some(token) = self.completion.take() {
            token.complete(success);
        }
        match guard {
            Some(guard) if success => PresentOutcome::Presented(guard),
            Some(guard) => {
                guard.restore();
                PresentOutcome::Aborted
            }
            None => PresentOutcome::Aborted,
        }
    }
}

impl Drop for PresentDriver {
    fn drop(&mut self) {
        if !self.is_finished() {
            warn!(
                entity_id = self.params.entity_id.get(),
                "present driver dropped mid-flight"
            );
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::screen::ScreenNodes;
    use std::cell::RefCell;

    const FRAME: Duration = Duration::from_millis(16);

    struct Fixture {
        scene: SharedScene,
        card: NodeId,
        screen: ScreenNodes,
        results: Rc<RefCell<Vec<bool>>>,
    }

    fn fixture(card_frame: Rect) -> Fixture {
        let mut scene = Scene::new(Size::new(390.0, 844.0));
        let grid = scene.add_labeled(scene.root(), scene.bounds(), "grid").unwrap();
        let card = scene.add_labeled(grid, card_frame, "card").unwrap();
        scene.set_corner_radius(card, 12.0);
        let content = scene.add_labeled(scene.root(), scene.bounds(), "detail").unwrap();
        scene.detach(content);
        Fixture {
            scene: scene.shared(),
            card,
            screen: ScreenNodes::new(content),
            results: Rc::new(RefCell::new(Vec::new())),
        }
    }

    impl Fixture {
        fn start(&self) -> Result<PresentDriver> {
            let params =
                TransitionParameters::capture(&self.scene.borrow(), self.card, EntityId::new(1))?;
            let results = Rc::clone(&self.results);
            PresentDriver::start(
                &self.scene,
                Rc::new(params),
                &self.screen,
                &PresentConfig::default(),
                CompletionToken::new(move |ok| results.borrow_mut().push(ok)),
            )
        }
    }

    fn run(driver: &mut PresentDriver) -> PresentOutcome {
        for _ in 0..200 {
            if let Some(outcome) = driver.tick(FRAME) {
                return outcome;
            }
        }
        panic!("presentation never finished");
    }

    #[test]
    fn spring_for_card_below_top_uses_full_travel() {
        let spring = PresentSpring::for_origin(
            Rect::new(20.0, 500.0, 150.0, 220.0),
            Size::new(390.0, 844.0),
            &PresentConfig::default(),
        );
        assert!((spring.damping - 0.7).abs() < 1e-9);
        assert_eq!(spring.duration, Duration::from_secs_f64(0.9));
    }

    #[test]
    fn spring_for_card_above_top_is_stiffer_and_shorter() {
        let spring = PresentSpring::for_origin(
            Rect::new(20.0, -110.0, 150.0, 220.0),
            Size::new(390.0, 844.0),
            &PresentConfig::default(),
        );
        assert!((spring.damping - 0.85).abs() < 1e-9);
        assert!(spring.duration > Duration::from_millis(500));
        assert!(spring.duration < Duration::from_millis(600));
    }

    #[test]
    fn first_frame_matches_card() {
        let f = fixture(Rect::new(20.0, 500.0, 150.0, 220.0));
        let _driver = f.start().unwrap();
        let s = f.scene.borrow();
        let content_frame = s.screen_frame(f.screen.content).unwrap();
        assert!(content_frame.approx_eq(&Rect::new(20.0, 500.0, 150.0, 220.0), 1e-9));
        assert_eq!(s.corner_radius(f.screen.content), Some(12.0));
        assert_eq!(s.is_hidden(f.card), Some(true));
        assert_eq!(s.is_scroll_enabled(f.screen.content), Some(false));
        assert_eq!(s.live_temporary_containers(), 1);
    }

    #[test]
    fn completes_full_bleed_on_root() {
        let f = fixture(Rect::new(20.0, 500.0, 150.0, 220.0));
        let mut driver = f.start().unwrap();
        let outcome = run(&mut driver);
        assert!(matches!(outcome, PresentOutcome::Presented(_)));
        assert!(driver.tick(FRAME).is_none());

        {
            let s = f.scene.borrow();
            assert_eq!(s.parent(f.screen.content), Some(s.root()));
            assert_eq!(s.layout(f.screen.content), Some(Layout::FullBleed));
            assert_eq!(s.screen_frame(f.screen.content), Some(s.bounds()));
            assert_eq!(s.corner_radius(f.screen.content), Some(0.0));
            assert_eq!(s.is_scroll_enabled(f.screen.content), Some(true));
            assert_eq!(s.live_temporary_containers(), 0);
            assert_eq!(s.is_hidden(f.card), Some(true), "guard still held");
        }
        drop(outcome);
        assert_eq!(f.scene.borrow().is_hidden(f.card), Some(false));
        assert_eq!(*f.results.borrow(), vec![true]);
    }

    #[test]
    fn cancel_reports_failure_and_restores_origin() {
        let f = fixture(Rect::new(20.0, 500.0, 150.0, 220.0));
        let mut driver = f.start().unwrap();
        driver.tick(FRAME);
        assert!(matches!(driver.cancel(), Some(PresentOutcome::Aborted)));
        assert!(driver.cancel().is_none());
        assert!(driver.tick(FRAME).is_none());
        drop(driver);

        let s = f.scene.borrow();
        assert_eq!(s.is_hidden(f.card), Some(false));
        assert_eq!(s.live_temporary_containers(), 0);
        assert_eq!(s.screen_frame(f.screen.content), None);
        assert_eq!(*f.results.borrow(), vec![false]);
    }

    #[test]
    fn dropping_mid_flight_cleans_up() {
        let f = fixture(Rect::new(20.0, 500.0, 150.0, 220.0));
        let mut driver = f.start().unwrap();
        driver.tick(FRAME);
        drop(driver);
        assert_eq!(*f.results.borrow(), vec![false]);
        assert_eq!(f.scene.borrow().live_temporary_containers(), 0);
        assert_eq!(f.scene.borrow().is_hidden(f.card), Some(false));
    }

    #[test]
    fn removed_origin_refuses_to_start() {
        let f = fixture(Rect::new(20.0, 500.0, 150.0, 220.0));
        let params =
            TransitionParameters::capture(&f.scene.borrow(), f.card, EntityId::new(4)).unwrap();
        f.scene.borrow_mut().remove(f.card);
        let results = Rc::clone(&f.results);
        let err = PresentDriver::start(
            &f.scene,
            Rc::new(params),
            &f.screen,
            &PresentConfig::default(),
            CompletionToken::new(move |ok| results.borrow_mut().push(ok)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::OriginDetached {
                entity_id: EntityId::new(4)
            }
        );
        assert_eq!(*f.results.borrow(), vec![false]);
        assert_eq!(f.scene.borrow().live_temporary_containers(), 0);
    }
}
