//! Orb Game Core Library
//!
//! Orb field simulation on top of `Rapier2D`: free orbs drift toward a
//! central magnet, the player drags chains of same-coloured orbs and scores
//! them, and an orb that touches the cluster from outside the border ends
//! the game.
//!
//! The field is a plain struct driven by fixed ticks; the `bevy` module
//! hosts it inside an ECS app for rendering frontends and headless tests.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod ai;
pub mod camera;
pub mod collision;
pub mod config;
pub mod deferred;
pub mod error;
pub mod field;
pub mod highscore;
pub mod joints;
pub mod orb;
pub mod palette;
pub mod physics;
pub mod selection;
pub mod trail;

// Bevy integration
pub mod bevy;

pub use ai::AiPlayer;
pub use camera::{FitMode, Viewport};
pub use collision::{OrbContact, process_contact};
pub use config::OrbConfig;
pub use deferred::{DeferredQueue, FieldAction};
pub use error::{OrbError, Result};
pub use field::{FieldEvent, FieldPhase, OrbField};
pub use highscore::{HighscoreEntry, HighscoreStore, HighscoreTable, MemoryStore};
pub use joints::JointLedger;
pub use orb::{Orb, OrbId, OrbSignal, OrbSpawn, OrbState, OrbStore, Pulse, Sprite};
pub use palette::{Color, GamePalette};
pub use physics::{PHYSICS_DT, PhysicsWorld};
pub use selection::{PointerId, SelectionController};
pub use trail::TouchTrail;
