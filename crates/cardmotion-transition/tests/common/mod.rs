//! Shared fixture: a card grid, a detail screen, and the transition stack
//! wired together the way an app would wire them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cardmotion_core::geometry::{Rect, Size};
use cardmotion_transition::{
    CompletionToken, DismissHost, DragPhase, EntityId, GestureConfig,
    InteractiveDismissController, InteractiveSignal, NodeId, PanSample, RecordingSink,
    RevealState, RevealTracker, Scene, ScreenNodes, SessionPhase, SharedScene, TransitionConfig,
    TransitionCoordinator, TransitionOutcome, TransitionParameters, TransitionState, weak_sink,
};

pub const FRAME: Duration = Duration::from_millis(16);
pub const SCREEN: Size = Size::new(390.0, 844.0);
/// Touch-down y for synthetic vertical drags.
pub const DRAG_START_Y: f64 = 200.0;

/// Completion results, in the order tokens resolved.
pub type Completions = Rc<RefCell<Vec<bool>>>;

pub fn token(into: &Completions) -> CompletionToken {
    let into = Rc::clone(into);
    CompletionToken::new(move |ok| into.borrow_mut().push(ok))
}

/// The detail screen: owns reveal state and renders the shrink.
pub struct DetailScreen {
    pub coordinator: Rc<RefCell<TransitionCoordinator>>,
    pub scene: SharedScene,
    pub nodes: ScreenNodes,
    pub reveal: RevealTracker,
    pub dismiss_completions: Completions,
    pub banners: Vec<String>,
    pub scroll_cancels: usize,
    pub dismiss_requests: usize,
    pub signals: Vec<InteractiveSignal>,
}

impl DismissHost for DetailScreen {
    fn reveal_state(&self) -> RevealState {
        self.reveal.state()
    }

    fn allows_vertical_dismiss(&self) -> bool {
        self.scene
            .borrow()
            .scroll_offset(self.nodes.scroll)
            .is_none_or(|offset| offset <= 0.0)
    }

    fn apply_shrink(&mut self, scale: f64, corner_radius: f64) {
        let mut s = self.scene.borrow_mut();
        s.set_scale(self.nodes.content, scale);
        s.set_corner_radius(self.nodes.content, corner_radius);
    }

    fn cancel_scroll(&mut self) {
        self.scroll_cancels += 1;
    }

    fn show_transient_banner(&mut self, message: &str) {
        self.banners.push(message.to_string());
    }

    fn request_dismiss(&mut self) {
        self.dismiss_requests += 1;
        let token = token(&self.dismiss_completions);
        let _ = self.coordinator.borrow_mut().dismiss(&self.nodes, token);
    }

    fn interactive_signal(&mut self, signal: InteractiveSignal) {
        self.signals.push(signal);
        let _ = self.coordinator.borrow_mut().interactive_signal(signal);
    }
}

pub struct Harness {
    pub scene: SharedScene,
    pub coordinator: Rc<RefCell<TransitionCoordinator>>,
    pub card: NodeId,
    pub sink: Rc<RecordingSink>,
    pub present_completions: Completions,
    pub detail: DetailScreen,
    pub controller: InteractiveDismissController,
    pub outcomes: Vec<TransitionOutcome>,
}

impl Harness {
    pub fn new(card_frame: Rect) -> Self {
        Self::with_config(card_frame, TransitionConfig::default())
    }

    pub fn with_config(card_frame: Rect, config: TransitionConfig) -> Self {
        let mut scene = Scene::new(SCREEN);
        let root = scene.root();
        let grid = scene.add_labeled(root, scene.bounds(), "grid").expect("grid");
        let card = scene.add_labeled(grid, card_frame, "card").expect("card");
        scene.set_corner_radius(card, 12.0);
        let content = scene.add_labeled(root, scene.bounds(), "detail").expect("detail");
        scene.detach(content);
        let bounds = scene.bounds();

        let scene = scene.shared();
        let gesture = config.gesture.clone();
        let coordinator = Rc::new(RefCell::new(TransitionCoordinator::new(
            Rc::clone(&scene),
            config,
        )));
        let detail = DetailScreen {
            coordinator: Rc::clone(&coordinator),
            scene: Rc::clone(&scene),
            nodes: ScreenNodes::new(content),
            reveal: RevealTracker::new(EntityId::new(0), true),
            dismiss_completions: Rc::default(),
            banners: Vec::new(),
            scroll_cancels: 0,
            dismiss_requests: 0,
            signals: Vec::new(),
        };
        Self {
            controller: InteractiveDismissController::new(bounds, gesture),
            scene,
            coordinator,
            card,
            sink: Rc::new(RecordingSink::new()),
            present_completions: Rc::default(),
            detail,
            outcomes: Vec::new(),
        }
    }

    pub fn state(&self) -> TransitionState {
        self.coordinator.borrow().state()
    }

    pub fn origin_hidden(&self) -> bool {
        self.scene.borrow().is_hidden(self.card) == Some(true)
    }

    /// Tap the card: start presenting a fresh detail screen.
    pub fn tap(&mut self, entity: i64, start_hidden: bool) -> cardmotion_transition::Result<()> {
        let params = TransitionParameters::capture(&self.scene.borrow(), self.card, EntityId::new(entity))?
            .with_start_hidden(start_hidden)
            .with_sink(weak_sink(&self.sink));
        self.detail.reveal = RevealTracker::from_params(&params);
        let gesture: GestureConfig = self.coordinator.borrow().config().gesture.clone();
        let bounds = self.scene.borrow().bounds();
        self.controller = InteractiveDismissController::new(bounds, gesture);
        let token = token(&self.present_completions);
        self.coordinator
            .borrow_mut()
            .present(params, &self.detail.nodes, token)
    }

    /// Tap and run the presentation to completion.
    pub fn present(&mut self, start_hidden: bool) {
        self.tap(1, start_hidden).expect("present");
        self.settle();
        assert_eq!(self.state(), TransitionState::Presented);
    }

    /// One frame for the controller and the coordinator.
    pub fn tick(&mut self) {
        self.controller.tick(FRAME, &mut self.detail);
        let outcome = self.coordinator.borrow_mut().tick(FRAME);
        if let Some(outcome) = outcome {
            if outcome == TransitionOutcome::DismissReverted {
                self.controller.reset();
            }
            self.outcomes.push(outcome);
        }
    }

    pub fn settle(&mut self) {
        for _ in 0..200 {
            self.tick();
        }
    }

    /// Vertical drag callbacks at the given progress values, starting a new
    /// drag if none is being tracked.
    pub fn drag(&mut self, progress: &[f64]) {
        let distance = self.controller.config().progress_distance;
        if self.controller.phase() == SessionPhase::Idle {
            self.controller.handle_pan(
                PanSample::vertical(DragPhase::Began, DRAG_START_Y),
                &mut self.detail,
            );
        }
        for p in progress {
            self.controller.handle_pan(
                PanSample::vertical(DragPhase::Changed, DRAG_START_Y + p * distance),
                &mut self.detail,
            );
        }
    }

    pub fn release(&mut self, progress: f64) {
        let distance = self.controller.config().progress_distance;
        self.controller.handle_pan(
            PanSample::vertical(DragPhase::Ended, DRAG_START_Y + progress * distance),
            &mut self.detail,
        );
    }
}
