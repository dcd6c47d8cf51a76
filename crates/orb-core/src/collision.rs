//! Turns physics contact begin/end events into orb state changes and
//! deferred field actions.
//!
//! Rapier does not promise which collider of a pair comes first, so each
//! rule is tried with the pair in both orders.

use rapier2d::prelude::CollisionEvent;

use crate::deferred::{DeferredQueue, FieldAction};
use crate::orb::{OrbId, OrbState, OrbStore};
use crate::physics::PhysicsWorld;

/// A contact between two orbs, after handle lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbContact {
    Began(OrbId, OrbId),
    Ended(OrbId, OrbId),
}

impl OrbContact {
    /// Maps a raw rapier event onto orb ids. Events touching a collider
    /// that no longer belongs to a live orb are dropped.
    pub fn from_event(event: &CollisionEvent, world: &PhysicsWorld, orbs: &OrbStore) -> Option<Self> {
        let a = orbs.by_collider(world, event.collider1())?;
        let b = orbs.by_collider(world, event.collider2())?;
        Some(if event.started() {
            Self::Began(a, b)
        } else {
            Self::Ended(a, b)
        })
    }
}

/// Applies one contact. Returns whether any rule matched.
pub fn process_contact(contact: OrbContact, orbs: &mut OrbStore, actions: &mut DeferredQueue) -> bool {
    match contact {
        OrbContact::Began(a, b) => contact_began(a, b, orbs, actions) || contact_began(b, a, orbs, actions),
        OrbContact::Ended(a, b) => contact_ended(a, b, orbs, actions) || contact_ended(b, a, orbs, actions),
    }
}

fn contact_began(a: OrbId, b: OrbId, orbs: &mut OrbStore, actions: &mut DeferredQueue) -> bool {
    let (Some(first), Some(second)) = (orbs.get(a), orbs.get(b)) else {
        return false;
    };

    match (first.state(), second.state()) {
        (OrbState::Border, OrbState::Free) => {
            if let Some(orb) = orbs.get_mut(b) {
                orb.in_play = true;
            }
            true
        }
        (OrbState::Free, OrbState::Free | OrbState::Magnet) => {
            if first.in_play == second.in_play {
                actions.push(FieldAction::JoinOrbs(a, b));
            } else {
                let trigger = if first.in_play { a } else { b };
                actions.push(FieldAction::EndGame { trigger });
            }
            true
        }
        _ => false,
    }
}

fn contact_ended(a: OrbId, b: OrbId, orbs: &mut OrbStore, actions: &mut DeferredQueue) -> bool {
    let (Some(first), Some(second)) = (orbs.get(a), orbs.get(b)) else {
        return false;
    };

    match (first.state(), second.state()) {
        (OrbState::Border, OrbState::Free) => {
            if let Some(orb) = orbs.get_mut(b) {
                orb.in_play = false;
            }
            true
        }
        (OrbState::ActiveSelected, OrbState::Free) if first.color == second.color => {
            actions.push(FieldAction::SelectOrb(b));
            true
        }
        _ => false,
    }
}
