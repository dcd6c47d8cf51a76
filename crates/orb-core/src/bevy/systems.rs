//! Systems driving the field.

use bevy::prelude::*;

use crate::bevy::events::*;
use crate::bevy::resources::{CommandQueue, FieldCommand, OrbFieldRes};
use crate::field::FieldEvent;

/// Applies queued commands to the field.
pub fn process_commands(command_queue: Res<CommandQueue>, mut field: ResMut<OrbFieldRes>) {
    let field = &mut field.field;
    for command in command_queue.drain() {
        match command {
            FieldCommand::NewGame => {
                tracing::info!("[command] NewGame");
                field.new_game();
            }
            FieldCommand::EndGame => {
                tracing::info!("[command] EndGame");
                field.end_game();
            }
            FieldCommand::TouchDown { pointer, position } => {
                field.touch_down(pointer, position);
            }
            FieldCommand::TouchDragged { pointer, position } => {
                field.touch_dragged(pointer, position);
            }
            FieldCommand::TouchUp { pointer } => {
                field.touch_up(pointer);
            }
            FieldCommand::Resize { viewport } => {
                tracing::info!(
                    "[command] Resize: {}x{} world units",
                    viewport.width,
                    viewport.height
                );
                field.resize(viewport);
            }
        }
    }
}

/// Runs one field tick per fixed timestep.
pub fn tick_field(mut field: ResMut<OrbFieldRes>) {
    field.field.tick();
}

/// Republishes field notifications as messages.
pub fn publish_field_events(
    mut field: ResMut<OrbFieldRes>,
    mut started: MessageWriter<GameStartedEvent>,
    mut selected: MessageWriter<OrbSelectedEvent>,
    mut scored: MessageWriter<ChainScoredEvent>,
    mut game_over: MessageWriter<GameOverEvent>,
    mut cleared: MessageWriter<FieldClearedEvent>,
) {
    for event in field.field.drain_events() {
        match event {
            FieldEvent::GameStarted => {
                started.write(GameStartedEvent);
            }
            FieldEvent::OrbSelected(orb) => {
                selected.write(OrbSelectedEvent { orb });
            }
            FieldEvent::ChainScored {
                length,
                points,
                total,
            } => {
                scored.write(ChainScoredEvent {
                    length,
                    points,
                    total,
                });
            }
            FieldEvent::GameOver { score } => {
                game_over.write(GameOverEvent { score });
            }
            FieldEvent::FieldCleared => {
                cleared.write(FieldClearedEvent);
            }
            FieldEvent::OrbSpawned(_) => {}
        }
    }
}
