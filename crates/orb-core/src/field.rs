//! The orb field: physics world, spawning, starting layout, game-over
//! sequencing and the per-tick orchestration of every other component.

use bevy::math::Vec2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rapier2d::prelude::*;

use crate::camera::Viewport;
use crate::collision::{OrbContact, process_contact};
use crate::config::{INNER_RING_COUNT, INNER_RING_OFFSET, OUTER_RING_COUNT, OUTER_RING_OFFSET, OrbConfig};
use crate::deferred::{DeferredQueue, FieldAction};
use crate::error::Result;
use crate::joints::JointLedger;
use crate::orb::{Orb, OrbId, OrbSignal, OrbSpawn, OrbState, OrbStore};
use crate::palette::{Color, GamePalette};
use crate::physics::{PHYSICS_DT, PhysicsWorld};
use crate::selection::{PointerId, SelectionController};
use crate::trail::TouchTrail;

/// Phase of the game running on a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldPhase {
    /// Magnet and border exist; nothing spawns on its own.
    Idle,
    /// Starting rings are settling; no spawning, no touch input.
    Settling { remaining: f32 },
    Playing,
    GameOver,
}

/// Notifications for the host (UI, sound, leaderboards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEvent {
    GameStarted,
    OrbSpawned(OrbId),
    OrbSelected(OrbId),
    ChainScored { length: usize, points: u64, total: u64 },
    GameOver { score: u64 },
    /// Every game-over orb has fallen off screen.
    FieldCleared,
}

/// Unit vector for a compass angle in degrees, 0° pointing up (+y).
fn heading(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.sin(), radians.cos())
}

pub struct OrbField {
    config: OrbConfig,
    world: PhysicsWorld,
    orbs: OrbStore,
    palette: GamePalette,
    selection: SelectionController,
    joints: JointLedger,
    actions: DeferredQueue,
    viewport: Viewport,
    magnet: OrbId,
    border: OrbId,
    phase: FieldPhase,
    spawn_distance: f32,
    spawn_timer: f32,
    spawn_interval: f32,
    score: u64,
    accumulator: f32,
    cleared: bool,
    rng: ChaCha8Rng,
    events: Vec<FieldEvent>,
}

impl std::fmt::Debug for OrbField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrbField")
            .field("phase", &self.phase)
            .field("orbs", &self.orbs.len())
            .field("chain", &self.selection.chain().len())
            .field("score", &self.score)
            .field("spawn_interval", &self.spawn_interval)
            .finish_non_exhaustive()
    }
}

impl OrbField {
    /// Creates an idle field with its magnet and border. The viewport
    /// defaults to the square play area.
    pub fn new(config: OrbConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Creates an idle field with the default tuning.
    pub fn with_default_config(seed: u64) -> Self {
        Self::build(OrbConfig::default(), seed)
    }

    fn build(config: OrbConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut palette = GamePalette::new(
            config.hue_distance,
            config.saturation,
            config.value,
            config.bag_repetitions,
            rng.random(),
        );
        palette.generate_random(config.palette_size);

        let mut world = PhysicsWorld::new();
        let mut orbs = OrbStore::new();
        let magnet = orbs.spawn(
            &mut world,
            OrbSpawn {
                position: Vec2::ZERO,
                diameter: config.magnet_radius() * 2.0,
                color: Color::WHITE,
                state: OrbState::Magnet,
                target: None,
                in_play: true,
            },
        );
        let border = orbs.spawn(
            &mut world,
            OrbSpawn {
                position: Vec2::ZERO,
                diameter: config.border_radius() * 2.0,
                color: Color::WHITE,
                state: OrbState::Border,
                target: None,
                in_play: false,
            },
        );

        let viewport = Viewport::new(config.play_area_size, config.play_area_size);
        let selection = SelectionController::new(config.selected_diameter());

        let mut field = Self {
            spawn_interval: config.base_spawn_interval,
            spawn_timer: config.base_spawn_interval,
            config,
            world,
            orbs,
            palette,
            selection,
            joints: JointLedger::new(),
            actions: DeferredQueue::new(),
            viewport,
            magnet,
            border,
            phase: FieldPhase::Idle,
            spawn_distance: 0.0,
            score: 0,
            accumulator: 0.0,
            cleared: false,
            rng,
            events: Vec::new(),
        };
        field.resize(viewport);
        field
    }

    /// Adopts a new viewport and recomputes the spawn ring, which sits one
    /// orb diameter outside the viewport's corners.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.spawn_distance = viewport.circumscribed_radius() + self.config.orb_diameter;
    }

    /// Clears the field and starts a new game: fresh palette, both starting
    /// rings, a synchronous settle, then spawning.
    pub fn new_game(&mut self) {
        self.selection.release();
        self.joints.break_all(&mut self.world);
        self.actions.clear();
        for id in self.orbs.ids() {
            if !self.orbs.get(id).is_some_and(|o| o.state().is_fixture()) {
                self.remove_orb(id);
            }
        }

        self.score = 0;
        self.cleared = false;
        self.spawn_interval = self.config.base_spawn_interval;
        self.spawn_timer = self.spawn_interval;
        self.accumulator = 0.0;
        let hue = self.palette.generate_random(self.config.palette_size);

        self.place_ring(INNER_RING_COUNT, INNER_RING_OFFSET);
        self.place_ring(OUTER_RING_COUNT, OUTER_RING_OFFSET);

        self.phase = FieldPhase::Settling {
            remaining: self.config.settle_time,
        };
        while matches!(self.phase, FieldPhase::Settling { .. }) {
            self.tick();
        }

        tracing::info!(
            "[field] new game: {} orbs placed, base hue {:.0}",
            self.orbs.live().count(),
            hue
        );
        self.events.push(FieldEvent::GameStarted);
    }

    /// Places `count` in-play orbs evenly around the magnet.
    #[allow(clippy::cast_precision_loss)]
    fn place_ring(&mut self, count: usize, offset_degrees: f32) {
        let distance = self.config.orb_diameter * count as f32 / 6.0;
        let center = self.magnet_position();
        for i in 0..count {
            let angle = i as f32 * 360.0 / count as f32 + offset_degrees;
            let id = self.spawn_orb_at(center + heading(angle) * distance);
            if let Some(orb) = self.orbs.get_mut(id) {
                orb.in_play = true;
            }
        }
    }

    /// Spawns a free orb at a random point of the spawn ring.
    pub fn spawn_orb(&mut self) -> OrbId {
        let angle = self.rng.random_range(0.0..360.0);
        let position = self.magnet_position() + heading(angle) * self.spawn_distance;
        self.spawn_orb_at(position)
    }

    /// Spawns a free orb at `position` with the next palette colour.
    pub fn spawn_orb_at(&mut self, position: Vec2) -> OrbId {
        let color = self.palette.random_color().unwrap_or(Color::WHITE);
        let id = self.orbs.spawn(
            &mut self.world,
            OrbSpawn {
                position,
                diameter: self.config.orb_diameter,
                color,
                state: OrbState::Free,
                target: Some(self.magnet_position()),
                in_play: false,
            },
        );
        self.events.push(FieldEvent::OrbSpawned(id));
        id
    }

    /// Destroys an orb and every reference to it. Unknown ids are ignored.
    pub fn remove_orb(&mut self, id: OrbId) {
        if self.orbs.despawn(&mut self.world, id).is_some() {
            self.joints.forget(id);
            self.selection.forget(id);
        }
    }

    /// Advances by `dt` seconds of wall time, running as many fixed ticks as
    /// fit. Long frames are clamped to `max_frame_time`; non-finite frames
    /// are skipped.
    pub fn update(&mut self, dt: f32) {
        if !dt.is_finite() {
            return;
        }
        self.accumulator += dt.clamp(0.0, self.config.max_frame_time);
        while self.accumulator >= PHYSICS_DT {
            self.accumulator -= PHYSICS_DT;
            self.tick();
        }
    }

    /// One fixed simulation step.
    pub fn tick(&mut self) {
        let dt = PHYSICS_DT;
        self.apply_deferred();
        self.advance_phase(dt);
        self.joints.expire(&mut self.world, dt);
        self.selection.update(&mut self.world, &mut self.orbs);

        let mut removals = Vec::new();
        for orb in self.orbs.iter_mut() {
            let Some(body) = self.world.get_rigid_body_mut(orb.body) else {
                continue;
            };
            let signal = orb.update(body, dt, self.config.free_speed, self.config.game_over_gravity);
            if signal == OrbSignal::Remove {
                removals.push(orb.id);
            }
        }

        for event in self.world.step_with_events() {
            if let Some(contact) = OrbContact::from_event(&event, &self.world, &self.orbs) {
                process_contact(contact, &mut self.orbs, &mut self.actions);
            }
        }

        for orb in self.orbs.iter_mut() {
            if let Some(body) = self.world.get_rigid_body(orb.body) {
                orb.sync(body);
            }
        }

        for id in removals {
            self.remove_orb(id);
        }
        if self.phase == FieldPhase::GameOver && !self.cleared && self.orbs.live().next().is_none() {
            self.cleared = true;
            self.events.push(FieldEvent::FieldCleared);
        }
    }

    fn advance_phase(&mut self, dt: f32) {
        match self.phase {
            FieldPhase::Settling { remaining } => {
                let remaining = remaining - dt;
                self.phase = if remaining <= 0.0 {
                    FieldPhase::Playing
                } else {
                    FieldPhase::Settling { remaining }
                };
            }
            FieldPhase::Playing => {
                self.spawn_timer -= dt;
                if self.spawn_timer <= 0.0 {
                    self.spawn_orb();
                    self.spawn_timer = self.spawn_interval;
                }
            }
            FieldPhase::Idle | FieldPhase::GameOver => {}
        }
    }

    /// Queues an action for the start of the next tick.
    pub fn defer(&mut self, action: FieldAction) {
        self.actions.push(action);
    }

    fn apply_deferred(&mut self) {
        for action in self.actions.drain() {
            match action {
                FieldAction::JoinOrbs(a, b) => self.join_orbs(a, b),
                FieldAction::SelectOrb(id) => {
                    let eligible = self.accepts_input()
                        && !self.selection.chain().is_empty()
                        && self.orbs.get(id).is_some_and(|o| o.state() == OrbState::Free);
                    if eligible {
                        if let Err(e) = self.select_orb(id) {
                            tracing::warn!("[field] deferred selection failed: {}", e);
                        }
                    } else {
                        tracing::debug!("[field] dropping stale selection of {}", id);
                    }
                }
                FieldAction::EndGame { trigger } => {
                    if self.phase == FieldPhase::Playing {
                        tracing::info!("[field] game over triggered by {}", trigger);
                        self.end_game();
                    }
                }
            }
        }
    }

    fn join_orbs(&mut self, a: OrbId, b: OrbId) {
        let joinable = |orb: Option<&Orb>| {
            orb.is_some_and(|o| matches!(o.state(), OrbState::Free | OrbState::Magnet))
        };
        if self.phase == FieldPhase::GameOver
            || !joinable(self.orbs.get(a))
            || !joinable(self.orbs.get(b))
            || self.joints.linked(a, b)
        {
            return;
        }
        let (Some(first), Some(second)) = (self.orbs.get(a), self.orbs.get(b)) else {
            return;
        };
        let handle = self.world.add_spring_joint(
            first.body,
            second.body,
            self.config.orb_diameter,
            self.config.joint_stiffness,
            self.config.joint_damping,
        );
        self.joints.record(handle, a, b, self.config.join_lifetime);
    }

    /// Adds `id` to the selection chain as its new head.
    pub fn select_orb(&mut self, id: OrbId) -> Result<()> {
        self.selection
            .select_orb(id, &mut self.world, &mut self.orbs, &mut self.joints)?;
        self.events.push(FieldEvent::OrbSelected(id));
        Ok(())
    }

    /// Scores and destroys the current chain. Returns the points awarded,
    /// or `None` when no chain exists.
    pub fn score_selected_orbs(&mut self) -> Option<u64> {
        let chain = self.selection.take_chain_for_scoring(&mut self.orbs);
        if chain.is_empty() {
            return None;
        }
        for &id in &chain {
            self.remove_orb(id);
        }

        let points = self.config.chain_points(chain.len());
        self.score += points;
        self.spawn_interval *= self.config.spawn_interval_decay;
        tracing::info!(
            "[field] scored chain of {} for {} (total={}, spawn interval={:.3}s)",
            chain.len(),
            points,
            self.score,
            self.spawn_interval
        );
        self.events.push(FieldEvent::ChainScored {
            length: chain.len(),
            points,
            total: self.score,
        });
        Some(points)
    }

    /// Ends the game: spawning stops, joints break, the chain is dropped and
    /// every orb is flung up and left to fall off screen.
    pub fn end_game(&mut self) {
        if self.phase == FieldPhase::GameOver {
            return;
        }
        self.phase = FieldPhase::GameOver;
        self.cleared = false;
        self.actions.clear();
        self.joints.break_all(&mut self.world);
        self.selection.release();

        let removal_point = Vec2::new(0.0, self.viewport.center.y - self.viewport.height);
        let half_cone = self.config.scatter_cone_degrees / 2.0;
        let live: Vec<OrbId> = self.orbs.live().map(|o| o.id).collect();
        for id in live {
            let angle = if half_cone > 0.0 {
                self.rng.random_range(-half_cone..=half_cone)
            } else {
                0.0
            };
            let velocity = heading(angle) * self.config.end_impulse;

            let Some(orb) = self.orbs.get_mut(id) else {
                continue;
            };
            if let Some(body) = self.world.get_rigid_body_mut(orb.body) {
                body.set_body_type(RigidBodyType::Dynamic, true);
                orb.set_state(OrbState::GameOver, Some(removal_point), Some(&mut *body));
                body.set_linvel(Vector::new(velocity.x, velocity.y), true);
            }
            if let Some(collider) = self.world.get_collider_mut(orb.collider) {
                collider.set_sensor(true);
            }
        }

        tracing::info!("[field] game over with score {}", self.score);
        self.events.push(FieldEvent::GameOver { score: self.score });
    }

    fn accepts_input(&self) -> bool {
        matches!(self.phase, FieldPhase::Idle | FieldPhase::Playing)
    }

    /// Pointer pressed at a screen position. Returns the orb it picked up.
    pub fn touch_down(&mut self, pointer: PointerId, screen: Vec2) -> Option<OrbId> {
        if !self.accepts_input() {
            return None;
        }
        let point = self.viewport.unproject(screen);
        match self
            .selection
            .touch_down(pointer, point, &mut self.world, &mut self.orbs, &mut self.joints)
        {
            Ok(Some(id)) => {
                self.events.push(FieldEvent::OrbSelected(id));
                Some(id)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("[field] touch down failed: {}", e);
                None
            }
        }
    }

    /// Pointer moved while pressed. Returns whether the trail was extended.
    pub fn touch_dragged(&mut self, pointer: PointerId, screen: Vec2) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let point = self.viewport.unproject(screen);
        self.selection.touch_dragged(pointer, point)
    }

    /// Pointer released. Scores the chain when the active pointer lets go.
    pub fn touch_up(&mut self, pointer: PointerId) -> Option<u64> {
        if self.selection.touch_up(pointer) {
            self.score_selected_orbs()
        } else {
            None
        }
    }

    /// Takes the events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn magnet_position(&self) -> Vec2 {
        self.orbs.get(self.magnet).map_or(Vec2::ZERO, Orb::position)
    }

    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Seconds between spawns; shrinks with every scored chain.
    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn spawn_distance(&self) -> f32 {
        self.spawn_distance
    }

    pub fn orbs(&self) -> &OrbStore {
        &self.orbs
    }

    pub fn orb(&self, id: OrbId) -> Option<&Orb> {
        self.orbs.get(id)
    }

    /// Playable orbs (everything but magnet and border).
    pub fn live_orbs(&self) -> impl Iterator<Item = &Orb> {
        self.orbs.live()
    }

    pub fn chain(&self) -> &[OrbId] {
        self.selection.chain()
    }

    pub fn trail(&self) -> &TouchTrail {
        self.selection.trail()
    }

    pub fn magnet(&self) -> OrbId {
        self.magnet
    }

    pub fn border(&self) -> OrbId {
        self.border
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn palette(&self) -> &GamePalette {
        &self.palette
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Linear velocity of an orb's body.
    pub fn velocity(&self, id: OrbId) -> Option<Vec2> {
        let body = self.world.get_rigid_body(self.orbs.get(id)?.body)?;
        let v = body.linvel();
        Some(Vec2::new(v.x, v.y))
    }

    pub fn compute_hash(&self) -> u64 {
        self.world.compute_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_field() -> OrbField {
        OrbField::new(OrbConfig::default(), 12345).unwrap()
    }

    fn playing_field(seed: u64) -> OrbField {
        let mut field = OrbField::new(OrbConfig::default(), seed).unwrap();
        field.new_game();
        field
    }

    fn ticks(field: &mut OrbField, n: usize) {
        for _ in 0..n {
            field.tick();
        }
    }

    #[test]
    fn test_new_field_has_fixtures_only() {
        let field = idle_field();
        assert_eq!(field.phase(), FieldPhase::Idle);
        assert_eq!(field.orbs().len(), 2);
        assert_eq!(field.live_orbs().count(), 0);
        assert_eq!(field.orb(field.magnet()).unwrap().state(), OrbState::Magnet);
        assert_eq!(field.orb(field.border()).unwrap().bounds().radius, 19.0);
        let expected = 24.0 * std::f32::consts::SQRT_2 + 5.0;
        assert!((field.spawn_distance() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = OrbConfig {
            palette_size: 0,
            ..OrbConfig::default()
        };
        assert!(OrbField::new(config, 1).is_err());
    }

    #[test]
    fn test_idle_field_does_not_spawn() {
        let mut field = idle_field();
        ticks(&mut field, 180);
        assert_eq!(field.live_orbs().count(), 0);
    }

    #[test]
    fn test_new_game_places_rings_and_settles() {
        let mut field = idle_field();
        field.new_game();

        assert_eq!(field.phase(), FieldPhase::Playing);
        assert_eq!(field.live_orbs().count(), INNER_RING_COUNT + OUTER_RING_COUNT);
        assert!(field.live_orbs().all(|o| o.in_play && o.state() == OrbState::Free));
        assert!(field.world().current_frame() >= 30);
        assert!(field.drain_events().contains(&FieldEvent::GameStarted));
    }

    #[test]
    fn test_spawning_follows_interval() {
        let mut field = playing_field(7);
        field.drain_events();
        let before = field.live_orbs().count();
        ticks(&mut field, 61);
        let spawned = field
            .drain_events()
            .iter()
            .filter(|e| matches!(e, FieldEvent::OrbSpawned(_)))
            .count();
        assert_eq!(spawned, 1);
        assert_eq!(field.live_orbs().count(), before + 1);
    }

    #[test]
    fn test_orb_is_attracted_and_enters_play() {
        let mut field = idle_field();
        let start = field.magnet_position() + heading(0.0) * field.spawn_distance();
        let id = field.spawn_orb_at(start);
        let start_distance = start.distance(field.magnet_position());

        ticks(&mut field, 120);

        let orb = field.orb(id).unwrap();
        assert!(orb.position().distance(field.magnet_position()) < start_distance - 10.0);
        assert!(orb.in_play);
        assert_eq!(orb.state(), OrbState::Free);
    }

    #[test]
    fn test_select_three_and_release_scores_chain() {
        let mut field = playing_field(42);
        let ids: Vec<OrbId> = field.live_orbs().map(|o| o.id).take(3).collect();
        let interval = field.spawn_interval();

        let screen = field.viewport().project(field.orb(ids[0]).unwrap().position());
        // Touch exactly where the first orb is; other orbs may overlap that spot.
        let first = field.touch_down(1, screen).unwrap();
        let rest: Vec<OrbId> = field
            .live_orbs()
            .filter(|o| o.state() == OrbState::Free)
            .map(|o| o.id)
            .take(2)
            .collect();
        for &id in &rest {
            field.select_orb(id).unwrap();
        }
        assert_eq!(field.chain().len(), 3);
        assert_eq!(field.orb(rest[1]).unwrap().state(), OrbState::ActiveSelected);
        assert_eq!(field.orb(first).unwrap().state(), OrbState::Selected);

        assert_eq!(field.touch_up(2), None);
        let points = field.touch_up(1).unwrap();

        assert_eq!(points, 90);
        assert_eq!(field.score(), 90);
        assert!(field.chain().is_empty());
        assert!(field.orb(first).is_none());
        assert!(rest.iter().all(|&id| field.orb(id).is_none()));
        assert!(field.spawn_interval() < interval);
    }

    #[test]
    fn test_scoring_empty_chain_is_noop() {
        let mut field = playing_field(3);
        assert_eq!(field.score_selected_orbs(), None);
        assert_eq!(field.score(), 0);
    }

    #[test]
    fn test_game_over_stops_spawning_and_scatters() {
        let mut field = playing_field(9);
        ticks(&mut field, 30);
        let ids: Vec<OrbId> = field.live_orbs().map(|o| o.id).collect();

        field.end_game();
        field.drain_events();
        assert_eq!(field.phase(), FieldPhase::GameOver);
        assert_eq!(field.joint_count(), 0);
        for &id in &ids {
            assert_eq!(field.orb(id).unwrap().state(), OrbState::GameOver);
            assert!(field.velocity(id).unwrap().length() > 0.0);
        }

        let mut count = field.live_orbs().count();
        for _ in 0..60 {
            field.tick();
            let now = field.live_orbs().count();
            assert!(now <= count);
            count = now;
        }
        assert!(
            !field
                .drain_events()
                .iter()
                .any(|e| matches!(e, FieldEvent::OrbSpawned(_)))
        );
        for orb in field.live_orbs() {
            assert_eq!(orb.state(), OrbState::GameOver);
            assert!(field.velocity(orb.id).unwrap().y < 0.0);
        }

        assert_eq!(field.touch_down(1, Vec2::new(24.0, 24.0)), None);
    }

    #[test]
    fn test_game_over_orbs_are_removed_off_screen() {
        let mut field = playing_field(11);
        field.end_game();
        ticks(&mut field, 60 * 5);
        assert_eq!(field.live_orbs().count(), 0);
        assert!(field.drain_events().contains(&FieldEvent::FieldCleared));
    }

    #[test]
    fn test_deferred_end_game_runs_next_tick() {
        let mut field = playing_field(5);
        let trigger = field.live_orbs().next().unwrap().id;
        field.defer(FieldAction::EndGame { trigger });
        assert_eq!(field.phase(), FieldPhase::Playing);
        field.tick();
        assert_eq!(field.phase(), FieldPhase::GameOver);
    }

    #[test]
    fn test_game_over_releases_chain() {
        let mut field = playing_field(8);
        let id = field.live_orbs().next().unwrap().id;
        let screen = field.viewport().project(field.orb(id).unwrap().position());
        let picked = field.touch_down(1, screen).unwrap();

        field.end_game();
        assert!(field.chain().is_empty());
        assert!(field.world().get_rigid_body(field.orb(picked).unwrap().body).unwrap().is_dynamic());
        assert_eq!(field.touch_up(1), None);
    }

    #[test]
    fn test_stale_deferred_selection_is_dropped() {
        let mut field = playing_field(4);
        let id = field.live_orbs().next().unwrap().id;
        field.defer(FieldAction::SelectOrb(id));
        field.tick();
        // No chain was active, so nothing is selected.
        assert_eq!(field.orb(id).unwrap().state(), OrbState::Free);
    }

    #[test]
    fn test_touching_orbs_are_joined_once() {
        let mut field = idle_field();
        let a = field.spawn_orb_at(Vec2::new(20.0, 0.0));
        let b = field.spawn_orb_at(Vec2::new(24.9, 0.0));
        field.defer(FieldAction::JoinOrbs(a, b));
        field.defer(FieldAction::JoinOrbs(b, a));
        field.tick();
        assert_eq!(field.joint_count(), 1);

        field.remove_orb(a);
        assert_eq!(field.joint_count(), 0);
        assert_eq!(field.world().impulse_joint_set.len(), 0);
    }

    #[test]
    fn test_join_skips_selected_orbs() {
        let mut field = idle_field();
        let a = field.spawn_orb_at(Vec2::new(0.0, 10.0));
        let b = field.spawn_orb_at(Vec2::new(0.0, 15.0));
        field.select_orb(a).unwrap();
        field.defer(FieldAction::JoinOrbs(a, b));
        field.tick();
        assert_eq!(field.joint_count(), 0);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let mut a = playing_field(77);
        let mut b = playing_field(77);
        ticks(&mut a, 120);
        ticks(&mut b, 120);
        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(a.live_orbs().count(), b.live_orbs().count());
    }

    #[test]
    fn test_update_clamps_long_frames() {
        let mut field = idle_field();
        let frame = field.world().current_frame();
        field.update(10.0);
        let stepped = field.world().current_frame() - frame;
        assert!((59..=60).contains(&stepped), "{stepped}");
    }

    #[test]
    fn test_non_finite_frame_is_skipped() {
        let mut field = idle_field();
        field.update(f32::NAN);
        field.update(f32::INFINITY);
        let frame = field.world().current_frame();

        field.update(PHYSICS_DT * 3.5);
        assert_eq!(field.world().current_frame() - frame, 3);
    }

    /// Parks a free orb at `position` so it stays put.
    fn parked_orb(field: &mut OrbField, position: Vec2, color: Color) -> OrbId {
        let id = field.spawn_orb_at(position);
        let orb = field.orbs.get_mut(id).unwrap();
        orb.set_state(OrbState::Free, None, None);
        orb.color = color;
        id
    }

    #[test]
    fn test_dragging_head_across_same_colour_orb_grows_chain() {
        let mut field = idle_field();
        let color = Color::rgb(1.0, 0.0, 0.0);
        let a = parked_orb(&mut field, Vec2::new(-10.0, 10.0), color);
        let b = parked_orb(&mut field, Vec2::new(0.0, 10.0), color);

        let start = field.viewport().project(Vec2::new(-10.0, 10.0));
        assert_eq!(field.touch_down(1, start), Some(a));

        // The head trails one selected diameter behind the finger, so it
        // sweeps over `b` and clear past it by the end of the drag.
        for i in 1..=90 {
            let x = -10.0 + 26.0 * i as f32 / 90.0;
            let screen = field.viewport().project(Vec2::new(x, 10.0));
            assert!(field.touch_dragged(1, screen));
            field.tick();
        }
        ticks(&mut field, 2);

        assert_eq!(field.chain(), &[a, b]);
        assert_eq!(field.orb(b).unwrap().state(), OrbState::ActiveSelected);
        assert_eq!(field.orb(a).unwrap().state(), OrbState::Selected);
    }

    #[test]
    fn test_dragging_head_across_other_colour_orb_leaves_it_free() {
        let mut field = idle_field();
        let a = parked_orb(&mut field, Vec2::new(-10.0, 10.0), Color::rgb(1.0, 0.0, 0.0));
        let b = parked_orb(&mut field, Vec2::new(0.0, 10.0), Color::rgb(0.0, 0.0, 1.0));

        let start = field.viewport().project(Vec2::new(-10.0, 10.0));
        assert_eq!(field.touch_down(1, start), Some(a));
        for i in 1..=90 {
            let x = -10.0 + 26.0 * i as f32 / 90.0;
            field.touch_dragged(1, field.viewport().project(Vec2::new(x, 10.0)));
            field.tick();
        }
        ticks(&mut field, 2);

        assert_eq!(field.chain(), &[a]);
        assert_eq!(field.orb(b).unwrap().state(), OrbState::Free);
    }
}
