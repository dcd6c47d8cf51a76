//! Bookkeeping for the temporary joints that make touching orbs cohere.

use rapier2d::prelude::ImpulseJointHandle;

use crate::orb::OrbId;
use crate::physics::PhysicsWorld;

#[derive(Debug, Clone, Copy)]
struct JointRecord {
    handle: ImpulseJointHandle,
    a: OrbId,
    b: OrbId,
    remaining: f32,
}

impl JointRecord {
    fn touches(&self, orb: OrbId) -> bool {
        self.a == orb || self.b == orb
    }
}

/// Every live cohesion joint with the two orbs it links.
#[derive(Debug, Clone, Default)]
pub struct JointLedger {
    joints: Vec<JointRecord>,
}

impl JointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a joint that expires after `lifetime` seconds.
    pub fn record(&mut self, handle: ImpulseJointHandle, a: OrbId, b: OrbId, lifetime: f32) {
        self.joints.push(JointRecord {
            handle,
            a,
            b,
            remaining: lifetime,
        });
    }

    pub fn linked(&self, a: OrbId, b: OrbId) -> bool {
        self.joints
            .iter()
            .any(|j| (j.a == a && j.b == b) || (j.a == b && j.b == a))
    }

    /// Destroys every joint attached to `orb`.
    pub fn detach(&mut self, world: &mut PhysicsWorld, orb: OrbId) {
        self.joints.retain(|j| {
            if j.touches(orb) {
                world.remove_joint(j.handle);
                false
            } else {
                true
            }
        });
    }

    /// Forgets joints of an orb whose body is already gone (rapier removed
    /// the joints together with the body).
    pub fn forget(&mut self, orb: OrbId) {
        self.joints.retain(|j| !j.touches(orb));
    }

    /// Ages every joint by `dt` and destroys the expired ones.
    pub fn expire(&mut self, world: &mut PhysicsWorld, dt: f32) {
        self.joints.retain_mut(|j| {
            j.remaining -= dt;
            if j.remaining <= 0.0 {
                world.remove_joint(j.handle);
                false
            } else {
                true
            }
        });
    }

    pub fn break_all(&mut self, world: &mut PhysicsWorld) {
        for joint in self.joints.drain(..) {
            world.remove_joint(joint.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}
