//! Bevy host for the orb field.
//!
//! The field stays a plain Rust value; Bevy owns it as a resource, feeds it
//! fixed timesteps and queued pointer commands, and republishes its
//! notifications as messages for UI and audio systems.

pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use events::*;
pub use plugin::OrbHeadlessPlugin;
pub use resources::*;
