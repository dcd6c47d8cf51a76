//! Orb entities, their lifecycle states and the side table that maps
//! physics handles back to orbs.

use std::collections::BTreeMap;
use std::fmt;

use bevy::math::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::palette::Color;
use crate::physics::{PhysicsWorld, USER_DATA_ORB, decode_user_data, encode_user_data};

/// Stable identifier of an orb for the lifetime of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrbId(pub u64);

impl fmt::Display for OrbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of an orb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbState {
    /// Fixed singleton at the centre of the field.
    Magnet,
    /// Fixed sensor marking the edge of the play area.
    Border,
    /// Drifting toward the magnet; can be picked up.
    Free,
    /// Part of the chain, behind the head.
    Selected,
    /// Head of the chain; the only orb that can pull in new members.
    ActiveSelected,
    /// Falling off screen after a loss.
    GameOver,
}

impl OrbState {
    /// Magnet and border are field fixtures rather than playable orbs.
    pub fn is_fixture(self) -> bool {
        matches!(self, Self::Magnet | Self::Border)
    }
}

/// Bounding circle used for touch hit tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }
}

/// What the renderer needs to draw an orb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub center: Vec2,
    pub size: f32,
    pub color: Color,
}

/// Expanding, fading ring drawn around a selected orb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub color: Color,
    start_size: f32,
    end_size: f32,
    /// Pulses per second.
    speed: f32,
    start_alpha: f32,
    end_alpha: f32,
    size: f32,
    alpha: f32,
}

impl Pulse {
    pub fn new(color: Color, base_size: f32, scale: f32, speed: f32) -> Self {
        Self {
            color,
            start_size: base_size,
            end_size: base_size * scale,
            speed,
            start_alpha: 1.0,
            end_alpha: 0.0,
            size: base_size,
            alpha: 1.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        let progress = self.speed * dt;
        self.size += (self.end_size - self.start_size) * progress;
        self.alpha += (self.end_alpha - self.start_alpha) * progress;

        let span = self.end_size - self.start_size;
        if span > f32::EPSILON {
            while self.size > self.end_size {
                self.size -= span;
                self.alpha = self.start_alpha - (self.size - self.start_size) / span;
            }
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn alpha(&self) -> f32 {
        self.alpha.clamp(0.0, 1.0)
    }
}

/// Request an orb raises toward its owning field after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbSignal {
    None,
    /// The orb has left the screen and should be destroyed.
    Remove,
}

/// One circular game piece.
#[derive(Debug, Clone)]
pub struct Orb {
    pub id: OrbId,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub color: Color,
    /// Set once the orb has crossed the border sensor.
    pub in_play: bool,
    pub pulse: Option<Pulse>,
    state: OrbState,
    target: Option<Vec2>,
    bounds: Circle,
    sprite: Sprite,
}

impl Orb {
    pub fn state(&self) -> OrbState {
        self.state
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    pub fn bounds(&self) -> Circle {
        self.bounds
    }

    pub fn sprite(&self) -> Sprite {
        self.sprite
    }

    pub fn position(&self) -> Vec2 {
        self.bounds.center
    }

    /// Changes the lifecycle state and motion target.
    ///
    /// Entering `GameOver` clears any existing velocity so the fall starts
    /// from rest.
    pub fn set_state(&mut self, state: OrbState, target: Option<Vec2>, body: Option<&mut RigidBody>) {
        self.state = state;
        self.target = target;
        if state == OrbState::GameOver
            && let Some(body) = body
        {
            body.set_linvel(Vector::new(0.0, 0.0), true);
        }
    }

    /// Resizes the collision circle and sprite to `diameter`.
    pub fn set_diameter(&mut self, diameter: f32, collider: Option<&mut Collider>) {
        self.bounds.radius = diameter / 2.0;
        self.sprite.size = diameter;
        if let Some(collider) = collider {
            collider.set_shape(SharedShape::ball(diameter / 2.0));
        }
    }

    /// Per-tick behaviour: steering while free, falling after game over.
    /// Always re-syncs bounds and sprite to the body.
    pub fn update(&mut self, body: &mut RigidBody, dt: f32, free_speed: f32, gravity: f32) -> OrbSignal {
        let mut signal = OrbSignal::None;
        match self.state {
            OrbState::Free => {
                if let Some(target) = self.target {
                    let here = body_position(body);
                    let steer = (target - here).normalize_or_zero() * free_speed;
                    body.set_linvel(Vector::new(steer.x, steer.y), true);
                }
            }
            OrbState::GameOver => {
                let vel = body.linvel();
                body.set_linvel(Vector::new(vel.x, vel.y - gravity * dt), true);
                if let Some(target) = self.target
                    && body_position(body).y < target.y
                {
                    signal = OrbSignal::Remove;
                }
            }
            _ => {}
        }

        if let Some(pulse) = &mut self.pulse {
            pulse.update(dt);
        }
        self.sync(body);
        signal
    }

    /// Copies the body position into bounds and sprite.
    pub fn sync(&mut self, body: &RigidBody) {
        let position = body_position(body);
        self.bounds.center = position;
        self.sprite.center = position;
    }
}

pub(crate) fn body_position(body: &RigidBody) -> Vec2 {
    let t = body.translation();
    Vec2::new(t.x, t.y)
}

/// Description of a new orb's body.
#[derive(Debug, Clone, Copy)]
pub struct OrbSpawn {
    pub position: Vec2,
    pub diameter: f32,
    pub color: Color,
    pub state: OrbState,
    pub target: Option<Vec2>,
    pub in_play: bool,
}

/// Side table of orbs keyed by id, with physics-handle lookups.
///
/// Iteration order is creation order, which keeps the simulation
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct OrbStore {
    orbs: BTreeMap<OrbId, Orb>,
    next_id: u64,
}

impl OrbStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the body and collider for an orb and registers it.
    pub fn spawn(&mut self, world: &mut PhysicsWorld, spawn: OrbSpawn) -> OrbId {
        let id = OrbId(self.next_id);
        self.next_id += 1;

        let radius = spawn.diameter / 2.0;
        let body = match spawn.state {
            OrbState::Magnet | OrbState::Border => RigidBodyBuilder::fixed(),
            _ => RigidBodyBuilder::dynamic().ccd_enabled(true),
        }
        .translation(Vector::new(spawn.position.x, spawn.position.y))
        .user_data(encode_user_data(USER_DATA_ORB, id.0))
        .build();
        let body = world.add_rigid_body(body);

        let collider = ColliderBuilder::ball(radius)
            .sensor(spawn.state == OrbState::Border)
            .friction(0.0)
            .restitution(0.0)
            .density(1.0)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider = world.add_collider(collider, body);

        let orb = Orb {
            id,
            body,
            collider,
            color: spawn.color,
            in_play: spawn.in_play,
            pulse: None,
            state: spawn.state,
            target: spawn.target,
            bounds: Circle {
                center: spawn.position,
                radius,
            },
            sprite: Sprite {
                center: spawn.position,
                size: spawn.diameter,
                color: spawn.color,
            },
        };
        self.orbs.insert(id, orb);
        id
    }

    /// Destroys an orb's body and forgets it. Unknown ids are ignored.
    pub fn despawn(&mut self, world: &mut PhysicsWorld, id: OrbId) -> Option<Orb> {
        let orb = self.orbs.remove(&id)?;
        world.remove_rigid_body(orb.body);
        Some(orb)
    }

    pub fn get(&self, id: OrbId) -> Option<&Orb> {
        self.orbs.get(&id)
    }

    pub fn get_mut(&mut self, id: OrbId) -> Option<&mut Orb> {
        self.orbs.get_mut(&id)
    }

    pub fn contains(&self, id: OrbId) -> bool {
        self.orbs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.orbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Orb> {
        self.orbs.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Orb> {
        self.orbs.values_mut()
    }

    pub fn ids(&self) -> Vec<OrbId> {
        self.orbs.keys().copied().collect()
    }

    /// Playable orbs, skipping magnet and border.
    pub fn live(&self) -> impl Iterator<Item = &Orb> {
        self.orbs.values().filter(|o| !o.state.is_fixture())
    }

    /// Orb owning `collider`, if the collider, its body and the orb all still exist.
    pub fn by_collider(&self, world: &PhysicsWorld, collider: ColliderHandle) -> Option<OrbId> {
        let (tag, raw) = decode_user_data(world.collider_owner_data(collider)?);
        if tag != USER_DATA_ORB {
            return None;
        }
        let id = OrbId(raw);
        self.orbs.contains_key(&id).then_some(id)
    }
}
