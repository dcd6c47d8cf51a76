//! The chain of selected orbs and the pointer that drives it.

use bevy::math::Vec2;
use rapier2d::prelude::*;

use crate::error::{OrbError, Result};
use crate::joints::JointLedger;
use crate::orb::{OrbId, OrbState, OrbStore, Pulse};
use crate::physics::PhysicsWorld;
use crate::trail::TouchTrail;

/// Identifier of a touch pointer (finger or mouse button).
pub type PointerId = u32;

/// Growth factor of the pulse ring around a selected orb.
const PULSE_SCALE: f32 = 1.5;
/// Pulses per second.
const PULSE_SPEED: f32 = 1.0;

/// Owns the selection chain, the finger trail the chain follows, and the
/// id of the pointer that started the chain.
#[derive(Debug, Clone)]
pub struct SelectionController {
    chain: Vec<OrbId>,
    trail: TouchTrail,
    active_pointer: Option<PointerId>,
    selected_diameter: f32,
}

impl SelectionController {
    pub fn new(selected_diameter: f32) -> Self {
        Self {
            chain: Vec::new(),
            trail: TouchTrail::new(selected_diameter),
            active_pointer: None,
            selected_diameter,
        }
    }

    /// Selected orbs in selection order; the last one is the head.
    pub fn chain(&self) -> &[OrbId] {
        &self.chain
    }

    pub fn head(&self) -> Option<OrbId> {
        self.chain.last().copied()
    }

    pub fn trail(&self) -> &TouchTrail {
        &self.trail
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        self.active_pointer
    }

    pub fn selected_diameter(&self) -> f32 {
        self.selected_diameter
    }

    /// Makes `id` the new chain head.
    ///
    /// Breaks the orb's joints, demotes the previous head, freezes the body
    /// as a fixed sensor at selected size and extends the trail to fit the
    /// longer chain.
    pub fn select_orb(
        &mut self,
        id: OrbId,
        world: &mut PhysicsWorld,
        orbs: &mut OrbStore,
        joints: &mut JointLedger,
    ) -> Result<()> {
        if !orbs.contains(id) {
            return Err(OrbError::UnknownOrb(id));
        }
        joints.detach(world, id);

        if let Some(head) = self.head()
            && let Some(orb) = orbs.get_mut(head)
        {
            orb.set_state(OrbState::Selected, None, None);
        }

        let orb = orbs.get_mut(id).ok_or(OrbError::UnknownOrb(id))?;
        orb.set_state(OrbState::ActiveSelected, None, None);
        self.chain.push(id);

        #[allow(clippy::cast_precision_loss)]
        let required = (self.chain.len() + 1) as f32 * self.selected_diameter;
        self.trail.set_max_length(required);
        self.trail.add_point_to_end(orb.position());

        if let Some(body) = world.get_rigid_body_mut(orb.body) {
            body.set_linvel(Vector::new(0.0, 0.0), false);
            body.set_body_type(RigidBodyType::Fixed, true);
        }
        let collider = world.get_collider_mut(orb.collider);
        if let Some(collider) = collider {
            collider.set_sensor(true);
            orb.set_diameter(self.selected_diameter, Some(collider));
        } else {
            orb.set_diameter(self.selected_diameter, None);
        }
        orb.pulse = Some(Pulse::new(
            orb.color.inverted(),
            self.selected_diameter,
            PULSE_SCALE,
            PULSE_SPEED,
        ));

        tracing::debug!("[selection] selected {} (chain={})", id, self.chain.len());
        Ok(())
    }

    /// Ends the chain for scoring and returns its members.
    ///
    /// The head is demoted first so it cannot raise another selection while
    /// the bodies are torn down. The trail shrinks back to one diameter.
    pub fn take_chain_for_scoring(&mut self, orbs: &mut OrbStore) -> Vec<OrbId> {
        if let Some(head) = self.head()
            && let Some(orb) = orbs.get_mut(head)
        {
            orb.set_state(OrbState::Selected, None, None);
        }
        self.trail.set_max_length(self.selected_diameter);
        std::mem::take(&mut self.chain)
    }

    /// Drops the chain and the active pointer without scoring.
    pub fn release(&mut self) -> Vec<OrbId> {
        self.active_pointer = None;
        self.trail.clear();
        self.trail.set_max_length(self.selected_diameter);
        std::mem::take(&mut self.chain)
    }

    /// Removes an orb that was destroyed elsewhere from the chain.
    pub fn forget(&mut self, id: OrbId) {
        self.chain.retain(|&o| o != id);
    }

    /// Lays the chain out along the trail, newest member nearest the finger.
    pub fn update(&self, world: &mut PhysicsWorld, orbs: &mut OrbStore) {
        let coords = self
            .trail
            .interpolate_coords(self.chain.len(), self.selected_diameter);

        for (&id, point) in self.chain.iter().rev().zip(coords) {
            let Some(orb) = orbs.get_mut(id) else {
                continue;
            };
            if let Some(body) = world.get_rigid_body_mut(orb.body) {
                body.set_translation(Vector::new(point.x, point.y), true);
                orb.sync(body);
            }
        }
    }

    /// Starts a chain on the free orb under `point`.
    ///
    /// Ignored while another pointer owns a chain. Returns the selected orb.
    pub fn touch_down(
        &mut self,
        pointer: PointerId,
        point: Vec2,
        world: &mut PhysicsWorld,
        orbs: &mut OrbStore,
        joints: &mut JointLedger,
    ) -> Result<Option<OrbId>> {
        if self.active_pointer.is_some() {
            return Ok(None);
        }
        let hit = orbs
            .live()
            .find(|o| o.state() == OrbState::Free && o.bounds().contains(point))
            .map(|o| o.id);
        let Some(id) = hit else {
            return Ok(None);
        };

        self.active_pointer = Some(pointer);
        self.trail.clear();
        self.trail.add_point(point);
        self.select_orb(id, world, orbs, joints)?;
        Ok(Some(id))
    }

    /// Extends the trail. Only the active pointer is honoured.
    pub fn touch_dragged(&mut self, pointer: PointerId, point: Vec2) -> bool {
        if self.chain.is_empty() || self.active_pointer != Some(pointer) {
            return false;
        }
        self.trail.add_point(point);
        true
    }

    /// Releases the active pointer. Returns `true` when the chain should be
    /// scored.
    pub fn touch_up(&mut self, pointer: PointerId) -> bool {
        if self.active_pointer != Some(pointer) {
            return false;
        }
        self.active_pointer = None;
        !self.chain.is_empty()
    }
}
