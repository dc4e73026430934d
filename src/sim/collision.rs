//! Fireball collision detection
//!
//! Brute force: every live fireball against every candidate target. The
//! arrays are tiny (a handful of goblins, at most ten fireballs), so the
//! O(n·m) scan is the whole algorithm.
//!
//! Height is ignored. Models of different sizes float at different heights,
//! and testing discs on the ground plane keeps hits easy to land.

use glam::Vec3;
use serde::Serialize;

use super::entity::{EntityId, Owner};
use super::registry::Registry;
use crate::horizontal_distance;
use crate::tuning::CollisionRadii;

/// A registered hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    /// A player fireball struck a goblin
    Goblin {
        fireball: EntityId,
        goblin: EntityId,
        /// Goblin position at impact
        at: Vec3,
        distance: f32,
    },
    /// An enemy fireball struck the player
    Player {
        fireball: EntityId,
        /// Player position at impact
        at: Vec3,
        distance: f32,
    },
}

impl Hit {
    pub fn fireball(&self) -> EntityId {
        match self {
            Hit::Goblin { fireball, .. } | Hit::Player { fireball, .. } => *fireball,
        }
    }
}

/// Two discs on the ground plane overlap (strictly)
#[inline]
pub fn discs_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> Option<f32> {
    let distance = horizontal_distance(a, b);
    (distance < radius_a + radius_b).then_some(distance)
}

/// Find every hit this frame.
///
/// Fireballs are walked newest first. A player fireball hits the nearest
/// overlapping goblin (ties go to the goblin registered first); a goblin
/// already hit by another fireball this pass is skipped. Each fireball
/// registers at most one hit.
pub fn check_collisions(registry: &Registry, player_pos: Vec3, radii: &CollisionRadii) -> Vec<Hit> {
    let fireballs: Vec<_> = registry.fireballs().collect();
    let mut hits = Vec::new();
    let mut struck: Vec<EntityId> = Vec::new();

    for fireball in fireballs.iter().rev() {
        match fireball.owner {
            Owner::Player => {
                let mut best: Option<(EntityId, Vec3, f32)> = None;
                for goblin in registry.goblins() {
                    if struck.contains(&goblin.id) {
                        continue;
                    }
                    let Some(distance) =
                        discs_overlap(fireball.pos, radii.fireball, goblin.pos, radii.goblin)
                    else {
                        continue;
                    };
                    if best.is_none_or(|(_, _, d)| distance < d) {
                        best = Some((goblin.id, goblin.pos, distance));
                    }
                }

                if let Some((goblin, at, distance)) = best {
                    struck.push(goblin);
                    hits.push(Hit::Goblin {
                        fireball: fireball.id,
                        goblin,
                        at,
                        distance,
                    });
                }
            }
            Owner::Enemy => {
                if let Some(distance) =
                    discs_overlap(fireball.pos, radii.fireball, player_pos, radii.player)
                {
                    hits.push(Hit::Player {
                        fireball: fireball.id,
                        at: player_pos,
                        distance,
                    });
                }
            }
        }
    }

    hits
}

/// A collider drawn by the debug overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColliderDisc {
    pub id: EntityId,
    pub center: Vec3,
    pub radius: f32,
}

/// Collision discs of the player and every live goblin
pub fn collider_discs(registry: &Registry, player_pos: Vec3, radii: &CollisionRadii) -> Vec<ColliderDisc> {
    std::iter::once(ColliderDisc {
        id: EntityId::PLAYER,
        center: player_pos,
        radius: radii.player,
    })
    .chain(registry.goblins().map(|g| ColliderDisc {
        id: g.id,
        center: g.pos,
        radius: radii.goblin,
    }))
    .collect()
}
