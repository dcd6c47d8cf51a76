//! Attract-mode player that drives a field through the same touch API a
//! human uses.

use std::collections::VecDeque;

use bevy::math::Vec2;

use crate::camera::Viewport;
use crate::field::OrbField;
use crate::orb::{Orb, OrbId, OrbState};
use crate::palette::Color;
use crate::selection::PointerId;

/// Smallest same-coloured group worth chasing.
pub const MIN_TARGETS: usize = 3;
/// Number of patrol waypoints circled while no group is targeted.
pub const PATROL_POINTS: usize = 16;
/// Longest time the AI keeps a finger down before giving up on a chain.
const MAX_TOUCH_TIME: f32 = 4.0;
/// Pointer id used for the AI's virtual finger.
pub const AI_POINTER: PointerId = 0;

/// Largest group of same-coloured free orbs with at least `min` members.
/// Ties keep the group found first.
pub fn largest_color_group<'a>(orbs: impl Iterator<Item = &'a Orb>, min: usize) -> Vec<OrbId> {
    let mut groups: Vec<(Color, Vec<OrbId>)> = Vec::new();
    for orb in orbs.filter(|o| o.state() == OrbState::Free) {
        match groups.iter_mut().find(|(color, _)| *color == orb.color) {
            Some((_, members)) => members.push(orb.id),
            None => groups.push((orb.color, vec![orb.id])),
        }
    }

    let mut best = Vec::new();
    for (_, members) in groups {
        if members.len() > best.len() && members.len() >= min {
            best = members;
        }
    }
    best
}

#[derive(Debug, Clone)]
pub struct AiPlayer {
    position: Vec2,
    velocity: Vec2,
    max_speed: f32,
    acceleration: f32,
    /// Orbs still to visit; the next one is at the back.
    targets: Vec<OrbId>,
    /// Orbs passed over that have not joined the chain yet.
    touched: Vec<OrbId>,
    patrol: VecDeque<Vec2>,
    play_field: (Vec2, Vec2),
    touching: bool,
    touch_time: f32,
    enabled: bool,
}

impl AiPlayer {
    pub fn new(play_area_size: f32) -> Self {
        let max_speed = play_area_size * 0.75;
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            max_speed,
            acceleration: max_speed / 2.0,
            targets: Vec::new(),
            touched: Vec::new(),
            patrol: VecDeque::new(),
            play_field: (Vec2::ZERO, Vec2::ZERO),
            touching: false,
            touch_time: 0.0,
            enabled: false,
        }
    }

    /// Recomputes the square play field and the patrol circle for a viewport.
    #[allow(clippy::cast_precision_loss)]
    pub fn resize(&mut self, viewport: &Viewport, orb_diameter: f32) {
        let side = viewport.square_side();
        let half = Vec2::splat(side / 2.0);
        self.play_field = (viewport.center - half, viewport.center + half);

        let radius = (side - orb_diameter) / 2.0;
        self.patrol = (0..PATROL_POINTS)
            .map(|i| {
                let angle = (i as f32 * 360.0 / PATROL_POINTS as f32).to_radians();
                viewport.center + Vec2::new(angle.sin(), angle.cos()) * radius
            })
            .collect();
    }

    pub fn start(&mut self) {
        self.enabled = true;
    }

    /// Lifts the finger and stops playing.
    pub fn end(&mut self, field: &mut OrbField) {
        self.release(field);
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn targets(&self) -> &[OrbId] {
        &self.targets
    }

    pub fn update(&mut self, field: &mut OrbField, dt: f32) {
        if !self.enabled {
            return;
        }

        self.targets
            .retain(|&id| field.orb(id).is_some_and(|o| o.state() == OrbState::Free));
        if self.targets.is_empty() && !self.touching {
            self.select_targets(field);
        }

        if let Some(&waypoint) = self.patrol.back()
            && self.position.distance(waypoint) <= self.max_speed * dt
        {
            self.patrol.rotate_right(1);
        }

        let goal = self
            .targets
            .last()
            .and_then(|&id| field.orb(id))
            .map(Orb::position)
            .or_else(|| self.patrol.back().copied())
            .unwrap_or(self.position);
        self.move_towards(goal, dt);
        let screen = field.viewport().project(self.position);

        if self.touching {
            self.touch_time += dt;
            field.touch_dragged(AI_POINTER, screen);
            let position = self.position;
            let (passed, remaining): (Vec<OrbId>, Vec<OrbId>) = self
                .targets
                .iter()
                .copied()
                .partition(|&id| field.orb(id).is_some_and(|o| o.bounds().contains(position)));
            self.touched.extend(passed);
            self.targets = remaining;
        } else if let Some(&next) = self.targets.last()
            && field
                .orb(next)
                .is_some_and(|o| o.position().distance(self.position) < o.bounds().radius)
            && field.touch_down(AI_POINTER, screen).is_some()
        {
            self.touching = true;
            self.touch_time = 0.0;
            self.targets.pop();
        }

        self.touched
            .retain(|&id| field.orb(id).is_some_and(|o| o.state() == OrbState::Free));

        let finished = self.touched.is_empty() && self.targets.is_empty();
        if self.touching && (finished || self.touch_time > MAX_TOUCH_TIME) {
            self.release(field);
        }
    }

    fn release(&mut self, field: &mut OrbField) {
        if self.touching {
            field.touch_up(AI_POINTER);
        }
        self.targets.clear();
        self.touched.clear();
        self.touching = false;
    }

    fn select_targets(&mut self, field: &OrbField) {
        let (min, max) = self.play_field;
        let inside = field.live_orbs().filter(|o| {
            let r = o.bounds().radius;
            let p = o.position();
            p.x + r >= min.x && p.x - r <= max.x && p.y + r >= min.y && p.y - r <= max.y
        });
        self.targets = largest_color_group(inside, MIN_TARGETS);
    }

    /// Accelerates toward `target` with bounded speed.
    fn move_towards(&mut self, target: Vec2, dt: f32) {
        let direction = (target - self.position).clamp_length_max(1.0);
        self.velocity = (self.velocity + direction * self.acceleration * dt).clamp_length_max(self.max_speed);
        self.position += self.velocity * dt;
    }
}
