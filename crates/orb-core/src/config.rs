//! Game tuning values.
//!
//! Every field has a default equal to the shipped game constant, so a config
//! file only needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OrbError, Result};

/// Side of the square play area in world units.
pub const PLAY_AREA_SIZE: f32 = 48.0;
/// Diameter of a free orb.
pub const ORB_DIAMETER: f32 = 5.0;
/// Number of orbs in the inner starting ring.
pub const INNER_RING_COUNT: usize = 6;
/// Angular offset of the inner ring, degrees.
pub const INNER_RING_OFFSET: f32 = 30.0;
/// Number of orbs in the outer starting ring.
pub const OUTER_RING_COUNT: usize = 12;
/// Angular offset of the outer ring, degrees.
pub const OUTER_RING_OFFSET: f32 = 0.0;
/// Longest highscore name, in characters.
pub const MAX_NAME_CHARACTERS: usize = 10;
/// Name used for unnamed highscore rows.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

fn default_play_area_size() -> f32 {
    PLAY_AREA_SIZE
}
fn default_orb_diameter() -> f32 {
    ORB_DIAMETER
}
fn default_selected_scale() -> f32 {
    1.25
}
fn default_free_speed() -> f32 {
    PLAY_AREA_SIZE / 4.0
}
fn default_game_over_gravity() -> f32 {
    PLAY_AREA_SIZE
}
fn default_end_impulse() -> f32 {
    PLAY_AREA_SIZE / 2.0
}
fn default_scatter_cone_degrees() -> f32 {
    90.0
}
fn default_base_spawn_interval() -> f32 {
    1.0
}
fn default_spawn_interval_decay() -> f32 {
    0.97
}
fn default_points_per_orb() -> u64 {
    10
}
fn default_palette_size() -> usize {
    5
}
fn default_hue_distance() -> f32 {
    40.0
}
fn default_saturation() -> f32 {
    0.9
}
fn default_value() -> f32 {
    0.9
}
fn default_bag_repetitions() -> usize {
    3
}
fn default_settle_time() -> f32 {
    0.5
}
fn default_join_lifetime() -> f32 {
    1.0
}
fn default_joint_stiffness() -> f32 {
    60.0
}
fn default_joint_damping() -> f32 {
    4.0
}
fn default_max_frame_time() -> f32 {
    1.0
}
fn default_highscore_entries() -> usize {
    10
}

/// Tunable parameters of an orb field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    #[serde(default = "default_play_area_size")]
    pub play_area_size: f32,
    #[serde(default = "default_orb_diameter")]
    pub orb_diameter: f32,
    /// Selected orbs grow by this factor.
    #[serde(default = "default_selected_scale")]
    pub selected_scale: f32,
    #[serde(default = "default_free_speed")]
    pub free_speed: f32,
    #[serde(default = "default_game_over_gravity")]
    pub game_over_gravity: f32,
    #[serde(default = "default_end_impulse")]
    pub end_impulse: f32,
    #[serde(default = "default_scatter_cone_degrees")]
    pub scatter_cone_degrees: f32,
    /// Seconds between spawns at the start of a game.
    #[serde(default = "default_base_spawn_interval")]
    pub base_spawn_interval: f32,
    /// Spawn interval multiplier applied after every scored chain.
    #[serde(default = "default_spawn_interval_decay")]
    pub spawn_interval_decay: f32,
    #[serde(default = "default_points_per_orb")]
    pub points_per_orb: u64,
    #[serde(default = "default_palette_size")]
    pub palette_size: usize,
    #[serde(default = "default_hue_distance")]
    pub hue_distance: f32,
    #[serde(default = "default_saturation")]
    pub saturation: f32,
    #[serde(default = "default_value")]
    pub value: f32,
    #[serde(default = "default_bag_repetitions")]
    pub bag_repetitions: usize,
    #[serde(default = "default_settle_time")]
    pub settle_time: f32,
    #[serde(default = "default_join_lifetime")]
    pub join_lifetime: f32,
    #[serde(default = "default_joint_stiffness")]
    pub joint_stiffness: f32,
    #[serde(default = "default_joint_damping")]
    pub joint_damping: f32,
    #[serde(default = "default_max_frame_time")]
    pub max_frame_time: f32,
    #[serde(default = "default_highscore_entries")]
    pub highscore_entries: usize,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            play_area_size: default_play_area_size(),
            orb_diameter: default_orb_diameter(),
            selected_scale: default_selected_scale(),
            free_speed: default_free_speed(),
            game_over_gravity: default_game_over_gravity(),
            end_impulse: default_end_impulse(),
            scatter_cone_degrees: default_scatter_cone_degrees(),
            base_spawn_interval: default_base_spawn_interval(),
            spawn_interval_decay: default_spawn_interval_decay(),
            points_per_orb: default_points_per_orb(),
            palette_size: default_palette_size(),
            hue_distance: default_hue_distance(),
            saturation: default_saturation(),
            value: default_value(),
            bag_repetitions: default_bag_repetitions(),
            settle_time: default_settle_time(),
            join_lifetime: default_join_lifetime(),
            joint_stiffness: default_joint_stiffness(),
            joint_damping: default_joint_damping(),
            max_frame_time: default_max_frame_time(),
            highscore_entries: default_highscore_entries(),
        }
    }
}

impl OrbConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| OrbError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Checks that every value is inside its legal range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("play_area_size", self.play_area_size),
            ("orb_diameter", self.orb_diameter),
            ("selected_scale", self.selected_scale),
            ("free_speed", self.free_speed),
            ("base_spawn_interval", self.base_spawn_interval),
            ("max_frame_time", self.max_frame_time),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(OrbError::invalid(field, format!("must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("game_over_gravity", self.game_over_gravity),
            ("end_impulse", self.end_impulse),
            ("settle_time", self.settle_time),
            ("join_lifetime", self.join_lifetime),
            ("joint_stiffness", self.joint_stiffness),
            ("joint_damping", self.joint_damping),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(OrbError::invalid(field, format!("must not be negative, got {value}")));
            }
        }

        if !(self.spawn_interval_decay > 0.0 && self.spawn_interval_decay <= 1.0) {
            return Err(OrbError::invalid(
                "spawn_interval_decay",
                format!("must be in (0, 1], got {}", self.spawn_interval_decay),
            ));
        }
        if !(0.0..=360.0).contains(&self.scatter_cone_degrees) {
            return Err(OrbError::invalid(
                "scatter_cone_degrees",
                format!("must be in [0, 360], got {}", self.scatter_cone_degrees),
            ));
        }
        for (field, value) in [("saturation", self.saturation), ("value", self.value)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OrbError::invalid(field, format!("must be in [0, 1], got {value}")));
            }
        }
        if self.palette_size == 0 {
            return Err(OrbError::invalid("palette_size", "must be at least 1"));
        }
        if self.bag_repetitions == 0 {
            return Err(OrbError::invalid("bag_repetitions", "must be at least 1"));
        }
        if self.play_area_size <= 2.0 * self.orb_diameter {
            return Err(OrbError::invalid(
                "play_area_size",
                "must be larger than two orb diameters",
            ));
        }
        Ok(())
    }

    /// Diameter of a selected orb.
    pub fn selected_diameter(&self) -> f32 {
        self.orb_diameter * self.selected_scale
    }

    /// Radius of the border sensor: the play area minus one orb diameter on each side.
    pub fn border_radius(&self) -> f32 {
        (self.play_area_size - 2.0 * self.orb_diameter) / 2.0
    }

    pub fn magnet_radius(&self) -> f32 {
        self.orb_diameter / 2.0
    }

    /// Points awarded for a chain of `length` orbs.
    pub fn chain_points(&self, length: usize) -> u64 {
        let length = length as u64;
        length * length * self.points_per_orb
    }
}
