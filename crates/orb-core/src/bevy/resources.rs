//! ECS Resources for the orb field host.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::camera::Viewport;
use crate::field::OrbField;
use crate::selection::PointerId;

/// The simulated field.
#[derive(Resource, Debug)]
pub struct OrbFieldRes {
    pub field: OrbField,
}

impl OrbFieldRes {
    pub fn new(field: OrbField) -> Self {
        Self { field }
    }
}

/// Commands fed to the field from outside the ECS (input backends, tests,
/// embedding hosts). Positions are screen pixels.
#[derive(Debug, Clone)]
pub enum FieldCommand {
    NewGame,
    EndGame,
    TouchDown { pointer: PointerId, position: Vec2 },
    TouchDragged { pointer: PointerId, position: Vec2 },
    TouchUp { pointer: PointerId },
    Resize { viewport: Viewport },
}

/// Thread-safe command queue shared between the host and the ECS.
#[derive(Resource, Clone)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<FieldCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: FieldCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands.
    pub fn drain(&self) -> Vec<FieldCommand> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
