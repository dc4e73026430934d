//! Game state and the world aggregate
//!
//! `GameState` is the per-session scoreboard (health, score, phase, caps).
//! `World` bundles it with every entity, the effect list and the RNG.

use glam::Vec3;
use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::EffectList;
use super::entity::{EntityId, EntityKind, Goblin, Player};
use super::registry::{Registry, SpawnRequest};
use crate::consts::*;
use crate::tuning::{CollisionRadii, Tuning};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start; nothing simulates
    Loading,
    /// Active gameplay
    Running,
    /// Frozen until toggled back
    Paused,
    /// Health reached zero; frozen until restart
    GameOver,
}

/// Notifications produced by the simulation, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HealthChanged(u8),
    ScoreChanged(u64),
    GameOver { score: u64 },
    PhaseChanged(GamePhase),
    Spawned { id: EntityId, pos: Vec3 },
    Despawned { id: EntityId },
    GoblinKilled { goblin: EntityId, at: Vec3 },
    PlayerHit { at: Vec3 },
}

/// Per-session scoreboard and rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// 0..=max_health
    pub player_health: u8,
    pub max_health: u8,
    pub score: u64,
    pub phase: GamePhase,
    pub radii: CollisionRadii,
    /// Pending notifications
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player_health: tuning.rules.max_health,
            max_health: tuning.rules.max_health,
            score: 0,
            phase: GamePhase::Loading,
            radii: tuning.radii,
            events: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            info!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    /// Back to full health and zero score, running
    pub fn reset(&mut self) {
        self.player_health = self.max_health;
        self.score = 0;
        self.events.push(GameEvent::HealthChanged(self.player_health));
        self.events.push(GameEvent::ScoreChanged(self.score));
        self.set_phase(GamePhase::Running);
    }

    /// Apply damage. Ignored once the game is over; health never goes
    /// below zero. Returns true if this blow ended the game.
    pub fn damage(&mut self, amount: u8) -> bool {
        if self.is_game_over() {
            return false;
        }

        self.player_health = self.player_health.saturating_sub(amount);
        self.events.push(GameEvent::HealthChanged(self.player_health));

        if self.player_health == 0 {
            self.set_phase(GamePhase::GameOver);
            self.events.push(GameEvent::GameOver { score: self.score });
            info!("game over with score {}", self.score);
            return true;
        }
        false
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::ScoreChanged(self.score));
    }
}

/// Resting heights (center above ground) of the player and goblin models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestHeights {
    pub player: f32,
    pub goblin: f32,
}

impl Default for RestHeights {
    fn default() -> Self {
        Self {
            player: PLAYER_PLACEHOLDER_REST,
            goblin: GOBLIN_PLACEHOLDER_REST,
        }
    }
}

/// Everything the simulation owns
#[derive(Debug, Clone)]
pub struct World {
    pub seed: u64,
    pub tuning: Tuning,
    pub state: GameState,
    pub player: Player,
    pub registry: Registry,
    pub effects: EffectList,
    pub rest: RestHeights,
    /// Simulated seconds spent running (frozen while paused)
    pub clock: f32,
    /// Collider overlay toggle
    pub debug_colliders: bool,
    pub(crate) rng: Pcg32,
}

/// Default effect budget until settings say otherwise
const DEFAULT_EFFECT_CAP: usize = 256;

impl World {
    /// Fresh session in the Loading phase, initial goblins already placed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let rest = RestHeights::default();
        let mut world = Self {
            seed,
            state: GameState::new(&tuning),
            player: Player::new(PLAYER_START, rest.player),
            registry: Registry::new(&tuning),
            effects: EffectList::new(DEFAULT_EFFECT_CAP, seed ^ 0x9e37_79b9_7f4a_7c15),
            rest,
            clock: 0.0,
            debug_colliders: false,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        };
        world.spawn_initial_goblins();
        world
    }

    pub(crate) fn spawn_initial_goblins(&mut self) {
        for _ in 0..self.tuning.rules.initial_goblins {
            self.spawn_goblin();
        }
    }

    /// Place a goblin on the spawn ring; refused silently at the cap
    pub fn spawn_goblin(&mut self) -> Option<EntityId> {
        let pos = Goblin::spawn_point(&mut self.rng, &self.tuning.goblin, self.rest.goblin);
        let id = self.registry.spawn(SpawnRequest::Goblin { pos }, self.clock)?;
        self.state.events.push(GameEvent::Spawned { id, pos });
        Some(id)
    }

    /// Update the resting height of a kind once its model is known
    pub fn set_rest_height(&mut self, kind: EntityKind, height: f32) {
        match kind {
            EntityKind::Player => {
                self.rest.player = height;
                self.player.pos.y = height;
            }
            EntityKind::Goblin => {
                self.rest.goblin = height;
                for goblin in self.registry.goblins_mut() {
                    goblin.pos.y = height;
                }
            }
            EntityKind::Fireball => {}
        }
    }

    /// Position of any live entity, player included
    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        match id.kind {
            EntityKind::Player => Some(self.player.pos),
            EntityKind::Goblin => self.registry.goblin(id).map(|g| g.pos),
            EntityKind::Fireball => self.registry.fireball(id).map(|f| f.pos),
        }
    }

    /// Take every notification produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}
