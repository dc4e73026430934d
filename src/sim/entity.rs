//! Simulated entities: the player, goblins and fireballs
//!
//! Entities only mutate themselves. Anything that affects the rest of the
//! world (spawning a fireball) is handed back to the caller as a request.

use std::fmt;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::{FireballTuning, GoblinTuning, PlayerTuning};
use crate::{direction_from_yaw, flatten, yaw_toward};

/// Entity kind tag, carried by every [`EntityId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Goblin,
    Fireball,
}

/// Stable entity handle. Serials are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub kind: EntityKind,
    pub serial: u32,
}

impl EntityId {
    /// There is exactly one player
    pub const PLAYER: EntityId = EntityId {
        kind: EntityKind::Player,
        serial: 0,
    };
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            EntityKind::Player => "player",
            EntityKind::Goblin => "goblin",
            EntityKind::Fireball => "fireball",
        };
        write!(f, "{tag}#{}", self.serial)
    }
}

/// Who launched a fireball; decides what it can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    /// Hits goblins
    Player,
    /// Hits the player
    Enemy,
}

/// Request to launch a fireball, emitted by the player or a goblin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireballSpawn {
    pub pos: Vec3,
    /// Unit vector on the ground plane
    pub dir: Vec3,
    pub owner: Owner,
}

/// Held movement keys, already collapsed onto four axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    /// -Z
    pub forward: bool,
    /// +Z
    pub back: bool,
    /// -X
    pub left: bool,
    /// +X
    pub right: bool,
}

impl Movement {
    /// Raw (unnormalized) movement vector; each held axis contributes 1
    pub fn vector(&self) -> Vec3 {
        let mut v = Vec3::ZERO;
        if self.forward {
            v.z -= 1.0;
        }
        if self.back {
            v.z += 1.0;
        }
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        v
    }
}

/// The wizard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    /// Facing, radians around +Y (0 faces -Z)
    pub yaw: f32,
    /// Last direction the player moved in; used to aim
    pub aim: Option<Vec3>,
    /// Sim time of the last fireball, `None` until the first shot
    pub last_fire: Option<f32>,
}

impl Player {
    pub fn new(start: Vec3, rest_height: f32) -> Self {
        Self {
            pos: Vec3::new(start.x, rest_height, start.z),
            yaw: 0.0,
            aim: None,
            last_fire: None,
        }
    }

    /// Back to the start position; keeps the current height
    pub fn reset(&mut self, start: Vec3) {
        self.pos = Vec3::new(start.x, self.pos.y, start.z);
    }

    pub fn update(&mut self, dt: f32, movement: Movement, tuning: &PlayerTuning, rest_height: f32) {
        let step = movement.vector();
        // Each axis moves at full speed, so diagonals are faster
        self.pos += step * tuning.speed * dt;

        if step != Vec3::ZERO {
            let dir = flatten(step).normalize();
            self.yaw = yaw_toward(dir);
            self.aim = Some(dir);
        }

        self.pos.y = rest_height;
    }

    /// Direction the next fireball will travel
    pub fn aim_direction(&self) -> Vec3 {
        self.aim.unwrap_or_else(|| direction_from_yaw(self.yaw))
    }

    /// Fire if the cooldown has elapsed; requests inside it are dropped
    pub fn try_fire(&mut self, now: f32, tuning: &PlayerTuning) -> Option<FireballSpawn> {
        if let Some(last) = self.last_fire {
            if now - last < tuning.fire_cooldown {
                return None;
            }
        }
        self.last_fire = Some(now);

        let dir = flatten(self.aim_direction()).normalize_or_zero();
        let mut pos = self.pos;
        pos.y = tuning.muzzle_height;
        pos += dir * tuning.muzzle_offset;

        Some(FireballSpawn {
            pos,
            dir,
            owner: Owner::Player,
        })
    }
}

/// A goblin raider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goblin {
    pub id: EntityId,
    pub pos: Vec3,
    pub yaw: f32,
    /// Sim time of the last attack, `None` until the first one
    pub last_attack: Option<f32>,
}

impl Goblin {
    pub fn new(id: EntityId, pos: Vec3) -> Self {
        Self {
            id,
            pos,
            yaw: 0.0,
            last_attack: None,
        }
    }

    /// Random spawn point on the ring around the arena center
    pub fn spawn_point(rng: &mut impl Rng, tuning: &GoblinTuning, rest_height: f32) -> Vec3 {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let distance = tuning.spawn_min_distance + rng.random::<f32>() * tuning.spawn_ring_width;
        Vec3::new(angle.cos() * distance, rest_height, angle.sin() * distance)
    }

    /// Chase and maybe attack the player. Returns a fireball request when
    /// the attack roll passes and the cooldown has elapsed.
    pub fn update(
        &mut self,
        dt: f32,
        now: f32,
        player_pos: Vec3,
        tuning: &GoblinTuning,
        rest_height: f32,
        rng: &mut impl Rng,
    ) -> Option<FireballSpawn> {
        let distance = self.pos.distance(player_pos);
        if distance >= tuning.detection_range {
            return None;
        }

        let toward = flatten(player_pos - self.pos).normalize_or_zero();
        if distance > tuning.stop_distance {
            self.pos += toward * tuning.speed * dt;
            self.pos.y = rest_height;
        }
        if toward != Vec3::ZERO {
            self.yaw = yaw_toward(toward);
        }

        if distance < tuning.attack_range && rng.random::<f32>() < tuning.attack_chance {
            return self.try_attack(now, toward, tuning);
        }
        None
    }

    fn try_attack(&mut self, now: f32, dir: Vec3, tuning: &GoblinTuning) -> Option<FireballSpawn> {
        if let Some(last) = self.last_attack {
            if now - last < tuning.attack_cooldown {
                return None;
            }
        }
        self.last_attack = Some(now);

        let mut pos = self.pos;
        pos.y = tuning.muzzle_height;
        pos += dir * tuning.muzzle_offset;

        Some(FireballSpawn {
            pos,
            dir,
            owner: Owner::Enemy,
        })
    }
}

/// A fireball in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fireball {
    pub id: EntityId,
    pub pos: Vec3,
    pub dir: Vec3,
    pub speed: f32,
    pub owner: Owner,
    /// Sim time the fireball was launched
    pub born: f32,
    pub lifespan: f32,
    /// Cosmetic: seconds since the last ember puff
    #[serde(skip)]
    pub ember_timer: f32,
}

/// Outcome of one fireball update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireballStep {
    /// Lifespan exceeded; the fireball must be removed
    pub expired: bool,
    /// Time to leave an ember behind
    pub ember: bool,
}

impl Fireball {
    pub fn new(id: EntityId, spawn: FireballSpawn, now: f32, tuning: &FireballTuning) -> Self {
        let speed = match spawn.owner {
            Owner::Player => tuning.player_speed,
            Owner::Enemy => tuning.enemy_speed,
        };
        Self {
            id,
            pos: spawn.pos,
            dir: spawn.dir,
            speed,
            owner: spawn.owner,
            born: now,
            lifespan: tuning.lifespan,
            ember_timer: 0.0,
        }
    }

    pub fn age(&self, now: f32) -> f32 {
        now - self.born
    }

    pub fn is_expired(&self, now: f32) -> bool {
        self.age(now) > self.lifespan
    }

    pub fn update(&mut self, dt: f32, now: f32, ember_interval: f32) -> FireballStep {
        self.pos += self.dir * self.speed * dt;

        self.ember_timer += dt;
        let ember = self.ember_timer >= ember_interval;
        if ember {
            self.ember_timer = 0.0;
        }

        FireballStep {
            expired: self.is_expired(now),
            ember,
        }
    }
}
