//! Goblin Arena - a wizard holds a forest clearing against goblin raiders
//!
//! Core modules:
//! - `sim`: Simulation (entities, registry, collisions, game loop)
//! - `platform`: Collaborator seams (input, asset loading, scene)
//! - `ui`: Observer interface, HUD model and radar
//! - `game`: Per-frame driver tying the simulation to its collaborators
//! - `tuning`: Data-driven game balance
//! - `settings`: Visual quality preferences

pub mod game;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use game::Game;
pub use settings::{QualityPreset, Settings, UnknownPreset};
pub use tuning::{Tuning, TuningError};

use glam::{Vec2, Vec3};

/// Engine configuration constants
pub mod consts {
    use glam::Vec3;

    /// Longest frame we simulate in one tick (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Where the player stands at the start of every session
    pub const PLAYER_START: Vec3 = Vec3::ZERO;

    /// Seconds an asset may stay pending before we settle on the placeholder
    pub const ASSET_TIMEOUT_SECS: f32 = 5.0;

    /// Target model heights (world units)
    pub const PLAYER_MODEL_HEIGHT: f32 = 2.0;
    pub const GOBLIN_MODEL_HEIGHT: f32 = 1.6;

    /// Scale used when a model's bounds produce a nonsensical scale
    pub const PLAYER_FALLBACK_SCALE: f32 = 0.1;
    pub const GOBLIN_FALLBACK_SCALE: f32 = 0.05;

    /// Half the height of the placeholder shapes (center above ground)
    pub const PLAYER_PLACEHOLDER_REST: f32 = 1.0;
    pub const GOBLIN_PLACEHOLDER_REST: f32 = 0.8;

    /// Radar reach around the player (world units)
    pub const RADAR_RANGE: f32 = 200.0;
    /// Radar zoom: world units to radar radii, before distance falloff
    pub const RADAR_SCALE: f32 = 0.05;
}

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points on the ground (XZ) plane
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x, a.z).distance(Vec2::new(b.x, b.z))
}

/// Yaw (radians around +Y) that faces along `dir`; 0 faces -Z
#[inline]
pub fn yaw_toward(dir: Vec3) -> f32 {
    dir.x.atan2(-dir.z)
}

/// Unit ground-plane direction for a yaw; inverse of [`yaw_toward`]
#[inline]
pub fn direction_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, -yaw.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -4.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_yaw_round_trip() {
        for dir in [Vec3::NEG_Z, Vec3::X, Vec3::Z, Vec3::NEG_X] {
            let back = direction_from_yaw(yaw_toward(dir));
            assert!((back - dir).length() < 1e-5, "{dir:?} -> {back:?}");
        }
    }
}
