#![forbid(unsafe_code)]

//! Presentation coordinator: one card at a time, from tap to return.
//!
//! The coordinator owns the lifecycle state machine, the backdrop, the
//! active driver, and (while a card is presented) the guard keeping its
//! origin hidden. Hosts call [`present`](TransitionCoordinator::present) and
//! [`dismiss`](TransitionCoordinator::dismiss), forward interactive signals,
//! and [`tick`](TransitionCoordinator::tick) once per frame.
//!
//! # Invariants
//!
//! 1. Present and dismiss never overlap: a dismissal needs `Presented` or
//!    `InteractiveDismissing`.
//! 2. The origin is hidden exactly while a presentation is live; every
//!    settled outcome other than `Presented` / `DismissReverted` leaves it
//!    visible.
//! 3. Each entry point resolves its completion token exactly once, even when
//!    it returns `Err`.

use std::rc::Rc;
use std::time::Duration;

use tracing::{info, warn};

use crate::completion::CompletionToken;
use crate::config::TransitionConfig;
use crate::dismiss::{DismissDriver, DismissOutcome};
use crate::error::{Result, TransitionError};
use crate::interactive::InteractiveSignal;
use crate::origin::OriginGuard;
use crate::overlay::PresentationOverlay;
use crate::params::TransitionParameters;
use crate::present::{PresentDriver, PresentOutcome};
use crate::scene::SharedScene;
use crate::screen::PresentedScreen;
use crate::state::{StateMachine, TransitionEvent, TransitionState};

/// A driver reached its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Presented,
    PresentAborted,
    Dismissed,
    DismissReverted,
}

#[derive(Debug, Default)]
enum ActiveDriver {
    #[default]
    None,
    Present(PresentDriver),
    Dismiss(DismissDriver),
}

enum Finished {
    Present(PresentOutcome),
    Dismiss(DismissOutcome),
}

/// Owns a card presentation from tap to return.
#[derive(Debug)]
pub struct TransitionCoordinator {
    scene: SharedScene,
    config: TransitionConfig,
    machine: StateMachine,
    overlay: PresentationOverlay,
    params: Option<Rc<TransitionParameters>>,
    driver: ActiveDriver,
    origin: Option<OriginGuard>,
}

impl TransitionCoordinator {
    #[must_use]
    pub fn new(scene: SharedScene, config: TransitionConfig) -> Self {
        let overlay = PresentationOverlay::new(config.backdrop.clone());
        Self {
            scene,
            config,
            machine: StateMachine::new(),
            overlay,
            params: None,
            driver: ActiveDriver::None,
            origin: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> TransitionState {
        self.machine.state()
    }

    /// Parameters of the current (or last) presentation.
    #[inline]
    #[must_use]
    pub fn params(&self) -> Option<&Rc<TransitionParameters>> {
        self.params.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn overlay(&self) -> &PresentationOverlay {
        &self.overlay
    }

    /// Whether a driver is animating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        !matches!(self.driver, ActiveDriver::None)
    }

    /// Whether the current presentation's origin card is hidden.
    #[must_use]
    pub fn is_origin_hidden(&self) -> bool {
        let Some(params) = &self.params else {
            return false;
        };
        self.scene
            .try_borrow()
            .ok()
            .and_then(|s| s.is_hidden(params.origin_view))
            .unwrap_or(false)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Present `screen` out of the card described by `params`.
    pub fn present(
        &mut self,
        params: TransitionParameters,
        screen: &dyn PresentedScreen,
        completion: CompletionToken,
    ) -> Result<()> {
        if self.machine.state() == TransitionState::Dismissed {
            self.reset();
        }
        let state = self.machine.state();
        if state != TransitionState::Idle {
            completion.complete(false);
            return Err(TransitionError::TransitionInFlight { state });
        }
        self.machine.dispatch(TransitionEvent::BeginPresent)?;

        let params = Rc::new(params);
        let entity_id = params.entity_id;
        self.overlay = PresentationOverlay::new(self.config.backdrop.clone());
        self.overlay.install(&mut self.scene.borrow_mut());

        match PresentDriver::start(
            &self.scene,
            Rc::clone(&params),
            screen,
            &self.config.present,
            completion,
        ) {
            Ok(driver) => {
                info!(entity_id = entity_id.get(), "presenting card");
                self.params = Some(params);
                self.driver = ActiveDriver::Present(driver);
                Ok(())
            }
            Err(err) => {
                warn!(entity_id = entity_id.get(), %err, "present refused");
                self.overlay.remove(&mut self.scene.borrow_mut());
                self.machine.dispatch(TransitionEvent::PresentAborted)?;
                Err(err)
            }
        }
    }

    /// Dismiss the presented `screen` back into its card.
    pub fn dismiss(&mut self, screen: &dyn PresentedScreen, completion: CompletionToken) -> Result<()> {
        let state = self.machine.state();
        if !state.has_presentation() {
            completion.complete(false);
            return Err(TransitionError::NoActivePresentation);
        }
        if !self.machine.can_dispatch(TransitionEvent::CommitDismiss) {
            completion.complete(false);
            return Err(TransitionError::IllegalTransition {
                from: state,
                event: TransitionEvent::CommitDismiss,
            });
        }
        let (Some(params), Some(guard)) = (self.params.clone(), self.origin.take()) else {
            completion.complete(false);
            return Err(TransitionError::NoActivePresentation);
        };
        self.machine.dispatch(TransitionEvent::CommitDismiss)?;

        let entity_id = params.entity_id;
        match DismissDriver::start(
            &self.scene,
            params,
            screen,
            guard,
            &self.config.dismiss,
            completion,
        ) {
            Ok(driver) => {
                info!(entity_id = entity_id.get(), "dismissing card");
                self.driver = ActiveDriver::Dismiss(driver);
                Ok(())
            }
            Err(err) => {
                warn!(entity_id = entity_id.get(), %err, "dismiss refused");
                self.settle(Finished::Dismiss(DismissOutcome::Dismissed));
                Err(err)
            }
        }
    }

    /// Track an interactive drag reported by the presented screen.
    pub fn interactive_signal(&mut self, signal: InteractiveSignal) -> Result<()> {
        let event = match signal {
            InteractiveSignal::Began => TransitionEvent::BeginInteractiveDismiss,
            InteractiveSignal::Cancelling => TransitionEvent::CancelDismiss,
            InteractiveSignal::Restored => TransitionEvent::DismissReverted,
            // The dismissal request that follows carries the commit.
            InteractiveSignal::Committed => return Ok(()),
        };
        if self.is_animating() {
            // Drags only steer a settled presentation; drivers own the rest.
            return Err(TransitionError::IllegalTransition {
                from: self.machine.state(),
                event,
            });
        }
        self.machine.dispatch(event).map(|_| ())
    }

    /// Advance the active driver by one frame.
    pub fn tick(&mut self, dt: Duration) -> Option<TransitionOutcome> {
        let finished = match &mut self.driver {
            ActiveDriver::None => None,
            ActiveDriver::Present(driver) => {
                let done = driver.tick(dt);
                let fraction = driver.fraction_complete();
                if let Ok(mut s) = self.scene.try_borrow_mut() {
                    self.overlay.set_presentation_progress(&mut s, fraction);
                }
                done.map(Finished::Present)
            }
            ActiveDriver::Dismiss(driver) => {
                let done = driver.tick(dt);
                let fraction = driver.fraction_complete();
                if let Ok(mut s) = self.scene.try_borrow_mut() {
                    self.overlay.set_dismissal_progress(&mut s, fraction);
                }
                done.map(Finished::Dismiss)
            }
        };
        finished.map(|f| self.settle(f))
    }

    /// Cancel whatever is animating.
    pub fn cancel_active(&mut self) -> Option<TransitionOutcome> {
        let finished = match &mut self.driver {
            ActiveDriver::None => None,
            ActiveDriver::Present(driver) => driver.cancel().map(Finished::Present),
            ActiveDriver::Dismiss(driver) => driver.cancel().map(Finished::Dismiss),
        };
        finished.map(|f| self.settle(f))
    }

    /// Forget a finished dismissal so the next present can start.
    pub fn reset(&mut self) {
        if self.machine.state() == TransitionState::Dismissed {
            self.advance(TransitionEvent::Reset);
            self.params = None;
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn settle(&mut self, finished: Finished) -> TransitionOutcome {
        self.driver = ActiveDriver::None;
        match finished {
            Finished::Present(PresentOutcome::Presented(guard)) => {
                self.origin = Some(guard);
                self.set_backdrop_level(1.0);
                self.advance(TransitionEvent::PresentFinished);
                TransitionOutcome::Presented
            }
            Finished::Present(PresentOutcome::Aborted) => {
                self.remove_backdrop();
                self.advance(TransitionEvent::PresentAborted);
                self.params = None;
                TransitionOutcome::PresentAborted
            }
            Finished::Dismiss(DismissOutcome::Dismissed) => {
                self.remove_backdrop();
                self.advance(TransitionEvent::DismissFinished);
                TransitionOutcome::Dismissed
            }
            Finished::Dismiss(DismissOutcome::Reverted(guard)) => {
                self.origin = Some(guard);
                self.set_backdrop_level(1.0);
                self.advance(TransitionEvent::DismissReverted);
                TransitionOutcome::DismissReverted
            }
        }
    }

    fn advance(&mut self, event: TransitionEvent) {
        if let Err(err) = self.machine.dispatch(event) {
            warn!(%err, "driver outcome did not match lifecycle state");
        }
    }

    fn set_backdrop_level(&mut self, level: f64) {
        if let Ok(mut s) = self.scene.try_borrow_mut() {
            self.overlay.set_presentation_progress(&mut s, level);
        }
    }

    fn remove_backdrop(&mut self) {
        if let Ok(mut s) = self.scene.try_borrow_mut() {
            self.overlay.remove(&mut s);
        }
    }
}
