//! Physics simulation using `Rapier2D` with deterministic behavior.
//!
//! The orb field runs without world gravity: free orbs are steered toward the
//! magnet by setting their velocity every tick, and game-over orbs accelerate
//! downward on their own.

use parking_lot::Mutex;
use rapier2d::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fixed timestep for physics simulation (60Hz).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Type tags for body `user_data` encoding.
pub const USER_DATA_ORB: u64 = 1;

/// Encodes a type tag and ID into u128 `user_data`.
pub fn encode_user_data(type_tag: u64, id: u64) -> u128 {
    (u128::from(type_tag) << 64) | u128::from(id)
}

/// Decodes u128 `user_data` into (`type_tag`, id).
#[allow(clippy::cast_possible_truncation)]
pub fn decode_user_data(user_data: u128) -> (u64, u64) {
    let type_tag = (user_data >> 64) as u64;
    let id = user_data as u64;
    (type_tag, id)
}

/// Collects collision events raised while the pipeline steps.
///
/// Rapier calls the handler from inside the solver, so events are only
/// buffered here and handed back once the step has returned.
#[derive(Default)]
struct EventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl EventHandler for EventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Physics world containing all `Rapier2D` components for deterministic simulation.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("joint_count", &self.impulse_joint_set.len())
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a new, empty, gravity-free physics world.
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: PHYSICS_DT,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            frame: 0,
        }
    }

    /// Advances the physics simulation by one fixed timestep, discarding events.
    pub fn step(&mut self) {
        self.step_with_events();
    }

    /// Advances the physics simulation by one fixed timestep and returns the
    /// collision events raised during it, in the order rapier reported them.
    pub fn step_with_events(&mut self) -> Vec<CollisionEvent> {
        let collector = EventCollector::default();
        self.physics_pipeline.step(
            Vector::new(0.0, 0.0),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &collector,
        );
        self.frame += 1;
        collector.collisions.into_inner()
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Adds a collider attached to a rigid body.
    pub fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Removes a rigid body together with its colliders and joints.
    ///
    /// Removing a body that is already gone is a no-op.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Gets an immutable reference to a rigid body.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Gets a mutable reference to a rigid body.
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn get_collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.collider_set.get_mut(handle)
    }

    /// Returns the `user_data` of the body owning `collider`, if both still exist.
    pub fn collider_owner_data(&self, collider: ColliderHandle) -> Option<u128> {
        let parent = self.collider_set.get(collider)?.parent()?;
        Some(self.rigid_body_set.get(parent)?.user_data)
    }

    /// Inserts a spring joint between two bodies.
    pub fn add_spring_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    ) -> ImpulseJointHandle {
        let joint = SpringJointBuilder::new(rest_length, stiffness, damping).build();
        self.impulse_joint_set.insert(body1, body2, joint, true)
    }

    /// Removes a joint. Removing a joint that is already gone is a no-op.
    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.impulse_joint_set.remove(handle, true);
    }

    /// Computes a deterministic hash of the current physics state.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);

            let rot = body.rotation().angle();
            hash_f32(rot, &mut hasher);

            let linvel = body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);
        }

        hasher.finish()
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(world: &mut PhysicsWorld, x: f32, y: f32) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(x, y))
            .build();
        let handle = world.add_rigid_body(body);
        let collider = ColliderBuilder::ball(1.0)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider = world.add_collider(collider, handle);
        (handle, collider)
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.frame, 0);
        assert_eq!(world.integration_parameters.dt, PHYSICS_DT);
    }

    #[test]
    fn test_deterministic_simulation() {
        let mut world1 = PhysicsWorld::new();
        let mut world2 = PhysicsWorld::new();

        for world in [&mut world1, &mut world2] {
            let body = RigidBodyBuilder::dynamic()
                .translation(Vector::new(10.0, 10.0))
                .linvel(Vector::new(-3.0, -2.0))
                .build();
            let handle = world.add_rigid_body(body);
            world.add_collider(ColliderBuilder::ball(1.0).restitution(0.5).build(), handle);
            ball_at(world, 0.0, 0.0);
        }

        for _ in 0..100 {
            world1.step();
            world2.step();
        }

        assert_eq!(world1.compute_hash(), world2.compute_hash());
    }

    #[test]
    fn test_no_gravity() {
        let mut world = PhysicsWorld::new();
        let (handle, _) = ball_at(&mut world, 0.0, 5.0);
        for _ in 0..30 {
            world.step();
        }
        let pos = world.get_rigid_body(handle).unwrap().translation();
        assert!((pos.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_step_advances_frame() {
        let mut world = PhysicsWorld::new();
        world.step();
        assert_eq!(world.current_frame(), 1);
        for _ in 0..10 {
            world.step();
        }
        assert_eq!(world.current_frame(), 11);
    }

    #[test]
    fn test_step_with_events_reports_sensor_overlap() {
        let mut world = PhysicsWorld::new();
        let sensor_body = world.add_rigid_body(RigidBodyBuilder::fixed().build());
        let sensor = world.add_collider(ColliderBuilder::ball(5.0).sensor(true).build(), sensor_body);
        let (_, ball) = ball_at(&mut world, 1.0, 0.0);

        let events = world.step_with_events();
        assert!(events.iter().any(|e| {
            e.started()
                && ((e.collider1() == sensor && e.collider2() == ball)
                    || (e.collider1() == ball && e.collider2() == sensor))
        }));
    }

    #[test]
    fn test_user_data_roundtrip_and_owner_lookup() {
        assert_eq!(decode_user_data(encode_user_data(USER_DATA_ORB, 42)), (USER_DATA_ORB, 42));

        let mut world = PhysicsWorld::new();
        let (body, collider) = ball_at(&mut world, 0.0, 0.0);
        world.get_rigid_body_mut(body).unwrap().user_data = encode_user_data(USER_DATA_ORB, 7);
        assert_eq!(
            world.collider_owner_data(collider).map(decode_user_data),
            Some((USER_DATA_ORB, 7))
        );

        world.remove_rigid_body(body);
        assert!(world.collider_owner_data(collider).is_none());
        world.remove_rigid_body(body);
    }

    #[test]
    fn test_spring_joint_lifecycle() {
        let mut world = PhysicsWorld::new();
        let (a, _) = ball_at(&mut world, 0.0, 0.0);
        let (b, _) = ball_at(&mut world, 4.0, 0.0);
        let joint = world.add_spring_joint(a, b, 2.0, 50.0, 1.0);
        assert_eq!(world.impulse_joint_set.len(), 1);
        world.remove_joint(joint);
        assert_eq!(world.impulse_joint_set.len(), 0);
        world.remove_joint(joint);
    }
}
