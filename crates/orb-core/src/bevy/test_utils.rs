//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `OrbHeadlessPlugin` for testing the field host
//! without a rendering or windowing backend.

use bevy::prelude::*;

use crate::bevy::events::*;
use crate::bevy::plugin::OrbHeadlessPlugin;
use crate::bevy::resources::{CommandQueue, FieldCommand, OrbFieldRes};
use crate::bevy::systems;
use crate::field::OrbField;
use crate::physics::PHYSICS_DT;

/// Every message of type `T` seen since the app was built.
#[derive(Resource)]
pub(crate) struct Collected<T>(pub Vec<T>);

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn collect<T: Message + Clone>(mut reader: MessageReader<T>, mut collected: ResMut<Collected<T>>) {
    collected.0.extend(reader.read().cloned());
}

fn add_collector<T: Message + Clone>(app: &mut App) {
    app.init_resource::<Collected<T>>();
    app.add_systems(
        Update,
        collect::<T>.after(systems::publish_field_events),
    );
}

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Create a new test app with default seed.
    pub fn new() -> Self {
        Self::with_plugin(OrbHeadlessPlugin::default())
    }

    pub fn with_plugin(plugin: OrbHeadlessPlugin) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(plugin);
        add_collector::<GameStartedEvent>(&mut app);
        add_collector::<OrbSelectedEvent>(&mut app);
        add_collector::<ChainScoredEvent>(&mut app);
        add_collector::<GameOverEvent>(&mut app);
        add_collector::<FieldClearedEvent>(&mut app);
        // Pause virtual time so that only explicit overstep calls
        // advance the simulation.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Advance the field by exactly `n` fixed timesteps.
    ///
    /// Uses `Time<Fixed>::accumulate_overstep` to feed time directly into
    /// the fixed-timestep accumulator, bypassing virtual time.
    pub fn step_physics(&mut self, n: usize) {
        let dt = std::time::Duration::from_secs_f32(PHYSICS_DT);
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    /// Push a command to the command queue.
    pub fn push_command(&mut self, command: FieldCommand) {
        self.app.world().resource::<CommandQueue>().push(command);
    }

    pub fn field(&self) -> &OrbField {
        &self.app.world().resource::<OrbFieldRes>().field
    }

    /// Number of `T` messages collected so far.
    pub fn collected<T: Message>(&self) -> usize {
        self.app.world().resource::<Collected<T>>().0.len()
    }
}
