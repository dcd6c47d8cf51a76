//! Bevy plugin for the orb game.
//!
//! `OrbHeadlessPlugin` carries only simulation logic, so it runs under
//! `MinimalPlugins` in tests and in hosts that render on their own.

use bevy::prelude::*;

use crate::bevy::events::*;
use crate::bevy::resources::*;
use crate::bevy::systems;
use crate::config::OrbConfig;
use crate::field::OrbField;
use crate::physics::PHYSICS_DT;

/// Headless plugin containing the orb field and the systems that drive it.
pub struct OrbHeadlessPlugin {
    pub seed: u64,
    pub config: OrbConfig,
    pub command_queue: Option<CommandQueue>,
}

impl Default for OrbHeadlessPlugin {
    fn default() -> Self {
        Self {
            seed: 12345,
            config: OrbConfig::default(),
            command_queue: None,
        }
    }
}

impl Plugin for OrbHeadlessPlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // Physics
        // ====================================================================
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(PHYSICS_DT)));

        // ====================================================================
        // Resources
        // ====================================================================
        let field = match OrbField::new(self.config.clone(), self.seed) {
            Ok(field) => field,
            Err(e) => {
                tracing::error!("[plugin] rejected orb config, using defaults: {e}");
                OrbField::with_default_config(self.seed)
            }
        };
        app.insert_resource(OrbFieldRes::new(field))
            .insert_resource(self.command_queue.clone().unwrap_or_default());

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<GameStartedEvent>()
            .add_message::<OrbSelectedEvent>()
            .add_message::<ChainScoredEvent>()
            .add_message::<GameOverEvent>()
            .add_message::<FieldClearedEvent>();

        // ====================================================================
        // Systems
        // ====================================================================
        app.add_systems(FixedUpdate, systems::tick_field);
        app.add_systems(
            Update,
            (systems::process_commands, systems::publish_field_events).chain(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::test_utils::{Collected, TestApp};
    use crate::field::FieldPhase;

    #[test]
    fn test_plugin_builds_idle_field() {
        let app = TestApp::new();
        assert_eq!(app.field().phase(), FieldPhase::Idle);
        assert_eq!(app.field().live_orbs().count(), 0);
    }

    #[test]
    fn test_new_game_command_starts_play() {
        let mut app = TestApp::new();
        app.push_command(FieldCommand::NewGame);
        app.update();

        assert_eq!(app.field().phase(), FieldPhase::Playing);
        assert_eq!(app.collected::<GameStartedEvent>(), 1);
        assert_eq!(app.field().live_orbs().count(), 18);
    }

    #[test]
    fn test_fixed_steps_spawn_orbs() {
        let mut app = TestApp::new();
        app.push_command(FieldCommand::NewGame);
        app.update();
        let before = app.field().live_orbs().count();

        // Two seconds of fixed steps at the starting spawn interval.
        app.step_physics(120);
        assert!(app.field().live_orbs().count() > before);
    }

    #[test]
    fn test_touch_commands_score_chain() {
        let mut app = TestApp::new();
        app.push_command(FieldCommand::NewGame);
        app.update();

        let (id, screen) = {
            let field = app.field();
            let orb = field.live_orbs().next().expect("ring orb");
            (orb.id, field.viewport().project(orb.position()))
        };

        app.push_command(FieldCommand::TouchDown {
            pointer: 1,
            position: screen,
        });
        app.update();
        assert_eq!(app.field().chain(), &[id]);
        assert_eq!(app.collected::<OrbSelectedEvent>(), 1);

        app.push_command(FieldCommand::TouchUp { pointer: 1 });
        app.update();
        assert!(app.field().chain().is_empty());

        let scored = app.app.world().resource::<Collected<ChainScoredEvent>>();
        assert_eq!(scored.0.len(), 1);
        assert_eq!(scored.0[0].length, 1);
        assert_eq!(scored.0[0].total, app.field().score());
    }

    #[test]
    fn test_end_game_command_publishes_game_over() {
        let mut app = TestApp::new();
        app.push_command(FieldCommand::NewGame);
        app.update();
        app.push_command(FieldCommand::EndGame);
        app.update();

        assert_eq!(app.field().phase(), FieldPhase::GameOver);
        assert_eq!(app.collected::<GameOverEvent>(), 1);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut config = OrbConfig::default();
        config.palette_size = 0;
        let app = TestApp::with_plugin(OrbHeadlessPlugin {
            config,
            ..Default::default()
        });
        assert_eq!(app.field().config().palette_size, OrbConfig::default().palette_size);
    }
}
