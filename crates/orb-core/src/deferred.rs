//! Actions raised while the physics world is stepping, applied at the start
//! of the next tick.

use std::collections::VecDeque;

use crate::orb::OrbId;

/// World mutation requested from inside contact processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    /// Link two touching orbs with a temporary joint.
    JoinOrbs(OrbId, OrbId),
    /// Add a free orb to the chain.
    SelectOrb(OrbId),
    /// End the game; `trigger` is the in-play orb that was touched from outside.
    EndGame { trigger: OrbId },
}

/// FIFO of pending [`FieldAction`]s.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    actions: VecDeque<FieldAction>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: FieldAction) {
        self.actions.push_back(action);
    }

    /// Takes every queued action, oldest first. Actions pushed while the
    /// returned batch is being applied wait for the following drain.
    pub fn drain(&mut self) -> Vec<FieldAction> {
        self.actions.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
