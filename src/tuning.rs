//! Data-driven game balance
//!
//! Every speed, cooldown, radius and cap the simulation reads comes from
//! here. `Tuning::default()` is the shipped balance; a JSON override can be
//! layered on top for playtesting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning field `{field}` must be positive and finite (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("tuning field `{field}` must be a probability in [0, 1] (got {value})")]
    NotProbability { field: &'static str, value: f32 },
    #[error("tuning cap `{field}` must be at least 1")]
    ZeroCap { field: &'static str },
}

/// Per-kind collision radii (horizontal discs)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionRadii {
    pub player: f32,
    pub goblin: f32,
    pub fireball: f32,
}

impl Default for CollisionRadii {
    fn default() -> Self {
        Self {
            player: 1.0,
            goblin: 0.8,
            fireball: 0.3,
        }
    }
}

/// Player tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Units per second, per active axis
    pub speed: f32,
    /// Minimum seconds between fireballs
    pub fire_cooldown: f32,
    /// Launch height of player fireballs
    pub muzzle_height: f32,
    /// Distance ahead of the player a fireball appears
    pub muzzle_offset: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 5.0,
            fire_cooldown: 0.5,
            muzzle_height: 1.2,
            muzzle_offset: 0.8,
        }
    }
}

/// Goblin tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoblinTuning {
    pub speed: f32,
    pub attack_cooldown: f32,
    /// Goblins ignore the player beyond this distance
    pub detection_range: f32,
    /// Goblins only roll for attacks inside this distance
    pub attack_range: f32,
    /// Goblins stop advancing once this close
    pub stop_distance: f32,
    /// Per-frame chance an in-range goblin tries to attack
    pub attack_chance: f32,
    pub muzzle_height: f32,
    pub muzzle_offset: f32,
    /// Spawn ring around the arena center
    pub spawn_min_distance: f32,
    pub spawn_ring_width: f32,
}

impl Default for GoblinTuning {
    fn default() -> Self {
        Self {
            speed: 2.0,
            attack_cooldown: 3.0,
            detection_range: 20.0,
            attack_range: 10.0,
            stop_distance: 5.0,
            attack_chance: 0.3,
            muzzle_height: 1.0,
            muzzle_offset: 0.8,
            spawn_min_distance: 10.0,
            spawn_ring_width: 15.0,
        }
    }
}

/// Fireball tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireballTuning {
    pub player_speed: f32,
    pub enemy_speed: f32,
    /// Seconds before a fireball burns out
    pub lifespan: f32,
    /// Seconds between trailing ember puffs (cosmetic)
    pub ember_interval: f32,
}

impl Default for FireballTuning {
    fn default() -> Self {
        Self {
            player_speed: 15.0,
            enemy_speed: 8.0,
            lifespan: 3.0,
            ember_interval: 0.05,
        }
    }
}

/// Session-level rules: caps, scoring, spawning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesTuning {
    pub max_health: u8,
    pub max_goblins: usize,
    pub max_fireballs: usize,
    pub initial_goblins: usize,
    pub fireball_damage: u8,
    pub points_per_goblin: u64,
    /// Per-frame chance of an ambient goblin spawn
    pub ambient_spawn_chance: f32,
    /// Chance a score increase calls in a reinforcement
    pub reinforcement_chance: f32,
    /// Reinforcement soft cap starts here...
    pub reinforcement_base: usize,
    /// ...grows by one per this many points...
    pub reinforcement_score_step: u64,
    /// ...up to this many extra goblins
    pub reinforcement_max_bonus: usize,
}

impl Default for RulesTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            max_goblins: 5,
            max_fireballs: 10,
            initial_goblins: 3,
            fireball_damage: 10,
            points_per_goblin: 10,
            ambient_spawn_chance: 0.002,
            reinforcement_chance: 0.3,
            reinforcement_base: 3,
            reinforcement_score_step: 100,
            reinforcement_max_bonus: 5,
        }
    }
}

/// Complete gameplay balance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub goblin: GoblinTuning,
    pub fireball: FireballTuning,
    pub rules: RulesTuning,
    pub radii: CollisionRadii,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or break the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("player.speed", self.player.speed),
            ("player.fire_cooldown", self.player.fire_cooldown),
            ("goblin.speed", self.goblin.speed),
            ("goblin.attack_cooldown", self.goblin.attack_cooldown),
            ("goblin.detection_range", self.goblin.detection_range),
            ("fireball.player_speed", self.fireball.player_speed),
            ("fireball.enemy_speed", self.fireball.enemy_speed),
            ("fireball.lifespan", self.fireball.lifespan),
            ("fireball.ember_interval", self.fireball.ember_interval),
            ("radii.player", self.radii.player),
            ("radii.goblin", self.radii.goblin),
            ("radii.fireball", self.radii.fireball),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }

        let chances = [
            ("goblin.attack_chance", self.goblin.attack_chance),
            ("rules.ambient_spawn_chance", self.rules.ambient_spawn_chance),
            ("rules.reinforcement_chance", self.rules.reinforcement_chance),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::NotProbability { field, value });
            }
        }

        if self.rules.max_fireballs == 0 {
            return Err(TuningError::ZeroCap {
                field: "rules.max_fireballs",
            });
        }
        if self.rules.max_health == 0 {
            return Err(TuningError::ZeroCap {
                field: "rules.max_health",
            });
        }
        if self.rules.reinforcement_score_step == 0 {
            return Err(TuningError::ZeroCap {
                field: "rules.reinforcement_score_step",
            });
        }
        Ok(())
    }

    /// Soft cap on goblins for reinforcement spawns at the given score
    pub fn reinforcement_cap(&self, score: u64) -> usize {
        let bonus = score
            .checked_div(self.rules.reinforcement_score_step)
            .unwrap_or(0)
            .min(self.rules.reinforcement_max_bonus as u64) as usize;
        (self.rules.reinforcement_base + bonus).min(self.rules.max_goblins)
    }
}
