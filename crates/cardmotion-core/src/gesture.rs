#![forbid(unsafe_code)]

//! Pan gesture recognition with recognizer arbitration.
//!
//! A [`GestureArena`] owns a set of [`PanRecognizer`]s, feeds every
//! [`TouchEvent`] to them, and resolves "must defer to" relations: a
//! recognizer that defers to another may only begin once the other has
//! failed, and fails itself if the other begins first.
//!
//! # State Machine
//!
//! Each recognizer follows:
//!
//! ```text
//! Possible ──slop crossed──▶ Began ──move──▶ Changed ──lift──▶ Ended
//!    │                          │                │
//!    └──▶ Failed                └────────────────┴──cancel/disable──▶ Cancelled
//! ```
//!
//! Terminal states return to `Possible` when the touch sequence ends.
//!
//! # Invariants
//!
//! 1. Only one touch is tracked at a time; secondary touches are ignored.
//! 2. A recognizer that defers to another never begins while the other is
//!    still possible or active.
//! 3. Disabling an active recognizer emits exactly one `Cancelled` update
//!    and it ignores the rest of that touch sequence.
//! 4. A screen-edge recognizer fails immediately for touches that begin
//!    outside its edge inset.
//!
//! # Failure Modes
//!
//! - Events for an unknown touch id are ignored.
//! - A `Moved`/`Ended` without a preceding `Began` is ignored.

use bitflags::bitflags;

use crate::geometry::{Point, Rect};
use crate::logging::trace;

bitflags! {
    /// Screen edges a screen-edge pan listens on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        const LEFT = 0b0001;
        const RIGHT = 0b0010;
        const TOP = 0b0100;
        const BOTTOM = 0b1000;
    }
}

/// Identifies one finger across a touch sequence.
pub type TouchId = u64;

/// Phase of a raw touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// A raw touch sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub touch_id: TouchId,
    pub phase: TouchPhase,
    pub location: Point,
}

impl TouchEvent {
    #[must_use]
    pub fn new(touch_id: TouchId, phase: TouchPhase, location: Point) -> Self {
        Self {
            touch_id,
            phase,
            location,
        }
    }

    #[must_use]
    pub fn began(touch_id: TouchId, x: f64, y: f64) -> Self {
        Self::new(touch_id, TouchPhase::Began, Point::new(x, y))
    }

    #[must_use]
    pub fn moved(touch_id: TouchId, x: f64, y: f64) -> Self {
        Self::new(touch_id, TouchPhase::Moved, Point::new(x, y))
    }

    #[must_use]
    pub fn ended(touch_id: TouchId, x: f64, y: f64) -> Self {
        Self::new(touch_id, TouchPhase::Ended, Point::new(x, y))
    }

    #[must_use]
    pub fn cancelled(touch_id: TouchId, x: f64, y: f64) -> Self {
        Self::new(touch_id, TouchPhase::Cancelled, Point::new(x, y))
    }
}

/// Recognizer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognizerState {
    #[default]
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl RecognizerState {
    /// Began or Changed.
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// Ended, Cancelled, or Failed.
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }
}

/// What kind of pan a recognizer detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanKind {
    /// Any single-touch pan.
    Free,
    /// A pan that must start within the inset of one of the given edges.
    ScreenEdge(Edges),
}

/// Tunables shared by the recognizers in an arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanConfig {
    /// Distance a touch must travel before a pan begins (default: 8pt).
    pub slop: f64,
    /// Width of the band along an edge that starts an edge pan (default: 20pt).
    pub edge_inset: f64,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            slop: 8.0,
            edge_inset: 20.0,
        }
    }
}

/// Index of a recognizer inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecognizerId(usize);

/// A state change reported by the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureUpdate {
    pub recognizer: RecognizerId,
    pub state: RecognizerState,
    /// Current touch location.
    pub location: Point,
    /// Offset from the touch-down point.
    pub translation: Point,
}

/// A single-touch pan recognizer.
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    kind: PanKind,
    enabled: bool,
    state: RecognizerState,
    start: Option<Point>,
    location: Point,
    /// Set when the recognizer was cancelled mid-touch; cleared on touch end.
    ignoring_touch: bool,
}

impl PanRecognizer {
    #[must_use]
    pub fn new(kind: PanKind) -> Self {
        Self {
            kind,
            enabled: true,
            state: RecognizerState::Possible,
            start: None,
            location: Point::ZERO,
            ignoring_touch: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> PanKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> RecognizerState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current touch location.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Point {
        self.location
    }

    /// Offset from the touch-down point, zero when no touch is tracked.
    #[must_use]
    pub fn translation(&self) -> Point {
        self.start
            .map_or(Point::ZERO, |start| self.location.delta_from(start))
    }

    fn tracking(&self) -> bool {
        self.enabled && !self.ignoring_touch && self.start.is_some()
    }

    fn touch_began(&mut self, location: Point, bounds: Rect, config: &PanConfig) {
        self.location = location;
        self.ignoring_touch = false;
        if !self.enabled {
            return;
        }
        let accepted = match self.kind {
            PanKind::Free => true,
            PanKind::ScreenEdge(edges) => within_edge(location, bounds, edges, config.edge_inset),
        };
        if accepted {
            self.start = Some(location);
            self.state = RecognizerState::Possible;
        } else {
            self.start = None;
            self.state = RecognizerState::Failed;
        }
    }

    fn crossed_slop(&self, config: &PanConfig) -> bool {
        self.start
            .is_some_and(|start| self.location.distance(start) >= config.slop)
    }

    /// Whether the movement so far suits this recognizer. An edge pan must
    /// travel predominantly inward from an edge it started on.
    fn moving_inward(&self, bounds: Rect, inset: f64) -> bool {
        let PanKind::ScreenEdge(edges) = self.kind else {
            return true;
        };
        let Some(start) = self.start else {
            return false;
        };
        let t = self.translation();
        let horizontal = t.x.abs() >= t.y.abs();
        let vertical = t.y.abs() >= t.x.abs();
        let near = |edge| within_edge(start, bounds, edge, inset);
        (near(Edges::LEFT) && horizontal && t.x > 0.0)
            || (near(Edges::RIGHT) && horizontal && t.x < 0.0)
            || (near(Edges::TOP) && vertical && t.y > 0.0)
            || (near(Edges::BOTTOM) && vertical && t.y < 0.0)
    }

    fn update(&self, id: RecognizerId) -> GestureUpdate {
        GestureUpdate {
            recognizer: id,
            state: self.state,
            location: self.location,
            translation: self.translation(),
        }
    }

    fn clear(&mut self) {
        self.state = RecognizerState::Possible;
        self.start = None;
        self.ignoring_touch = false;
    }
}

fn within_edge(p: Point, bounds: Rect, edges: Edges, inset: f64) -> bool {
    (edges.contains(Edges::LEFT) && p.x - bounds.min_x() <= inset)
        || (edges.contains(Edges::RIGHT) && bounds.max_x() - p.x <= inset)
        || (edges.contains(Edges::TOP) && p.y - bounds.min_y() <= inset)
        || (edges.contains(Edges::BOTTOM) && bounds.max_y() - p.y <= inset)
}

/// Owns recognizers and arbitrates between them.
#[derive(Debug, Clone)]
pub struct GestureArena {
    config: PanConfig,
    bounds: Rect,
    recognizers: Vec<PanRecognizer>,
    /// `(waiter, blocker)`: `waiter` may only begin once `blocker` failed.
    defers: Vec<(RecognizerId, RecognizerId)>,
    active_touch: Option<TouchId>,
}

impl GestureArena {
    /// Create an empty arena covering `bounds` (used for edge detection).
    #[must_use]
    pub fn new(bounds: Rect, config: PanConfig) -> Self {
        Self {
            config,
            bounds,
            recognizers: Vec::new(),
            defers: Vec::new(),
            active_touch: None,
        }
    }

    /// Register a recognizer.
    pub fn add(&mut self, recognizer: PanRecognizer) -> RecognizerId {
        self.recognizers.push(recognizer);
        RecognizerId(self.recognizers.len() - 1)
    }

    /// Make `waiter` defer to `blocker`.
    pub fn defer_to(&mut self, waiter: RecognizerId, blocker: RecognizerId) {
        if waiter != blocker && !self.defers.contains(&(waiter, blocker)) {
            self.defers.push((waiter, blocker));
        }
    }

    #[must_use]
    pub fn recognizer(&self, id: RecognizerId) -> Option<&PanRecognizer> {
        self.recognizers.get(id.0)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PanConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Update the surface bounds used for edge detection.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Whether a touch sequence is in progress.
    #[inline]
    #[must_use]
    pub fn has_active_touch(&self) -> bool {
        self.active_touch.is_some()
    }

    /// Enable or disable a recognizer.
    ///
    /// Disabling an active recognizer cancels it; the returned update carries
    /// the `Cancelled` state. Re-enabling takes effect from the next touch.
    pub fn set_enabled(&mut self, id: RecognizerId, enabled: bool) -> Option<GestureUpdate> {
        let recognizer = self.recognizers.get_mut(id.0)?;
        if recognizer.enabled == enabled {
            return None;
        }
        recognizer.enabled = enabled;
        if enabled {
            return None;
        }
        let was_active = recognizer.state.is_active();
        let mid_touch = recognizer.start.is_some();
        if was_active {
            recognizer.state = RecognizerState::Cancelled;
            trace!(recognizer = id.0, "recognizer disabled while active; cancelled");
        }
        let update = was_active.then(|| recognizer.update(id));
        if mid_touch {
            recognizer.ignoring_touch = true;
            recognizer.start = None;
        }
        update
    }

    /// Feed a raw touch, returning every recognizer state change it caused.
    pub fn process(&mut self, event: &TouchEvent) -> Vec<GestureUpdate> {
        let mut out = Vec::with_capacity(2);
        match event.phase {
            TouchPhase::Began => {
                if self.active_touch.is_some() {
                    return out;
                }
                self.active_touch = Some(event.touch_id);
                for r in &mut self.recognizers {
                    r.touch_began(event.location, self.bounds, &self.config);
                }
                self.resolve_waiters(&mut out);
            }
            TouchPhase::Moved => {
                if self.active_touch != Some(event.touch_id) {
                    return out;
                }
                for r in &mut self.recognizers {
                    if r.tracking() {
                        r.location = event.location;
                    }
                }
                for idx in 0..self.recognizers.len() {
                    let id = RecognizerId(idx);
                    let r = &mut self.recognizers[idx];
                    if !r.tracking() {
                        continue;
                    }
                    if r.state.is_active() {
                        r.state = RecognizerState::Changed;
                        out.push(r.update(id));
                    }
                }
                self.resolve_waiters(&mut out);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.active_touch != Some(event.touch_id) {
                    return out;
                }
                let lifted = if event.phase == TouchPhase::Ended {
                    RecognizerState::Ended
                } else {
                    RecognizerState::Cancelled
                };
                for idx in 0..self.recognizers.len() {
                    let id = RecognizerId(idx);
                    let r = &mut self.recognizers[idx];
                    if r.tracking() {
                        r.location = event.location;
                        if r.state.is_active() {
                            r.state = lifted;
                            out.push(r.update(id));
                        } else if r.state == RecognizerState::Possible {
                            r.state = RecognizerState::Failed;
                        }
                    }
                    r.clear();
                }
                self.active_touch = None;
            }
        }
        out
    }

    /// Begin every possible recognizer that crossed its slop and whose
    /// blockers have all failed; fail waiters whose blocker began.
    fn resolve_waiters(&mut self, out: &mut Vec<GestureUpdate>) {
        // Iterate until stable: a blocker beginning can fail a waiter, which
        // can in turn unblock another waiter.
        loop {
            let mut changed = false;
            for idx in 0..self.recognizers.len() {
                let id = RecognizerId(idx);
                if !self.recognizers[idx].tracking()
                    || self.recognizers[idx].state != RecognizerState::Possible
                {
                    continue;
                }

                let blockers: Vec<RecognizerState> = self
                    .defers
                    .iter()
                    .filter(|(waiter, _)| *waiter == id)
                    .filter_map(|(_, blocker)| self.recognizers.get(blocker.0))
                    .map(|b| if b.tracking() || b.state.is_active() { b.state } else { RecognizerState::Failed })
                    .collect();

                if blockers.iter().any(|s| s.is_active() || *s == RecognizerState::Ended) {
                    self.recognizers[idx].state = RecognizerState::Failed;
                    self.recognizers[idx].start = None;
                    changed = true;
                    continue;
                }
                let blocked = blockers.iter().any(|s| *s == RecognizerState::Possible);
                if !blocked && self.recognizers[idx].crossed_slop(&self.config) {
                    let r = &mut self.recognizers[idx];
                    if !r.moving_inward(self.bounds, self.config.edge_inset) {
                        // Wrong direction for an edge pan; let waiters have it.
                        r.state = RecognizerState::Failed;
                        r.start = None;
                        trace!(recognizer = idx, "edge pan moved off-axis; failed");
                        changed = true;
                        continue;
                    }
                    r.state = RecognizerState::Began;
                    out.push(r.update(id));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}
