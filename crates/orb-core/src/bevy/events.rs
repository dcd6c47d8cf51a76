//! ECS Messages published from field notifications.
//!
//! Note: In Bevy 0.18+, buffered events use Message trait instead of Event.

use bevy::prelude::*;

use crate::orb::OrbId;

/// Message fired when a new game has settled and spawning begins.
#[derive(Message, Debug, Clone, Default)]
pub struct GameStartedEvent;

/// Message fired when the player picks up an orb.
#[derive(Message, Debug, Clone)]
pub struct OrbSelectedEvent {
    pub orb: OrbId,
}

/// Message fired when a chain is scored.
#[derive(Message, Debug, Clone)]
pub struct ChainScoredEvent {
    /// Number of orbs in the chain.
    pub length: usize,
    /// Points awarded for this chain.
    pub points: u64,
    /// Score after this chain.
    pub total: u64,
}

/// Message fired when the game is lost.
#[derive(Message, Debug, Clone)]
pub struct GameOverEvent {
    pub score: u64,
}

/// Message fired once every game-over orb has left the screen.
#[derive(Message, Debug, Clone, Default)]
pub struct FieldClearedEvent;
