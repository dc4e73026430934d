//! Goblin radar
//!
//! Player at the center, blips in radar radii (the rim is 1.0). Far
//! goblins are drawn closer than they are so the whole clearing fits.

use glam::Vec2;
use serde::Serialize;

use crate::consts::{RADAR_RANGE, RADAR_SCALE};
use crate::sim::{EntityId, World};

/// Blips outside the rim are pinned just inside it
const RIM: f32 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Blip {
    pub id: EntityId,
    /// Radar coordinates: +x right, +y toward the camera (world +Z)
    pub pos: Vec2,
    pub opacity: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Radar {
    /// Player facing, radians (0 points up the radar)
    pub heading: f32,
    pub blips: Vec<Blip>,
}

impl Radar {
    pub fn capture(world: &World) -> Self {
        let center = Vec2::new(world.player.pos.x, world.player.pos.z);
        let blips = world
            .registry
            .goblins()
            .filter_map(|g| {
                let offset = Vec2::new(g.pos.x, g.pos.z) - center;
                blip_position(offset).map(|(pos, opacity)| Blip {
                    id: g.id,
                    pos,
                    opacity,
                })
            })
            .collect();

        Self {
            heading: world.player.yaw,
            blips,
        }
    }
}

/// Radar position and opacity for a ground-plane offset from the player,
/// or `None` beyond radar range
pub fn blip_position(offset: Vec2) -> Option<(Vec2, f32)> {
    let distance = offset.length();
    if distance > RADAR_RANGE {
        return None;
    }

    let falloff = distance / RADAR_RANGE;
    let mut pos = offset * RADAR_SCALE * (1.0 - 0.5 * falloff);
    if pos.length() > 1.0 {
        pos = pos.normalize() * RIM;
    }
    Some((pos, 1.0 - 0.5 * falloff))
}
