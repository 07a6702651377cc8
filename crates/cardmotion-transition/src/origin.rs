#![forbid(unsafe_code)]

//! Scoped ownership of the origin card's visibility.
//!
//! While a card is presented its grid cell is hidden so that only the
//! travelling detail content is visible. [`OriginGuard`] makes "hidden"
//! a held resource: acquiring hides the cell, releasing unhides it, and
//! dropping a guard that was never released unhides it too.
//!
//! # Invariants
//!
//! 1. At most one guard exists per presentation; it moves from the present
//!    driver to the coordinator and on to the dismiss driver.
//! 2. The origin is visible again whenever no guard for it is alive.
//!
//! # Failure Modes
//!
//! If the origin was removed from the scene while hidden, releasing is a
//! no-op. If the scene is mid-borrow at drop time the unhide is skipped and
//! a warning is logged.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::error::{Result, TransitionError};
use crate::params::EntityId;
use crate::scene::{NodeId, Scene, SharedScene};

/// Holds the origin card hidden until restored or dropped.
#[derive(Debug)]
pub struct OriginGuard {
    scene: Weak<RefCell<Scene>>,
    node: NodeId,
    released: bool,
}

impl OriginGuard {
    /// Hide `node` and reset its press-down scale.
    pub fn acquire(scene: &SharedScene, node: NodeId, entity_id: EntityId) -> Result<Self> {
        let mut s = scene.borrow_mut();
        if s.frame_at_rest(node).is_none() {
            return Err(TransitionError::OriginDetached { entity_id });
        }
        s.set_hidden(node, true);
        s.set_scale(node, 1.0);
        debug!(node = node.raw(), "origin hidden");
        Ok(Self {
            scene: Rc::downgrade(scene),
            node,
            released: false,
        })
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Make the origin visible again.
    pub fn restore(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let Some(scene) = self.scene.upgrade() else {
            return;
        };
        match scene.try_borrow_mut() {
            Ok(mut s) => {
                s.set_hidden(self.node, false);
                debug!(node = self.node.raw(), "origin restored");
            }
            Err(_) => warn!(
                node = self.node.raw(),
                "scene busy while restoring origin; left hidden"
            ),
        }
    }
}

impl Drop for OriginGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!(node = self.node.raw(), "origin guard dropped without restore");
            self.release();
        }
    }
}
