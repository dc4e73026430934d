//! Simulation module
//!
//! All gameplay logic lives here:
//! - One tick per rendered frame, dt clamped
//! - Seeded RNG only, so a session replays from its seed
//! - Registration-order iteration
//! - No rendering or platform dependencies

pub mod collision;
pub mod effects;
pub mod entity;
pub mod registry;
pub mod state;
pub mod tick;

pub use collision::{ColliderDisc, Hit, check_collisions, collider_discs, discs_overlap};
pub use effects::{EffectKind, EffectList, VisualEffect};
pub use entity::{EntityId, EntityKind, Fireball, FireballSpawn, Goblin, Movement, Owner, Player};
pub use registry::{EntityRef, Registry, SpawnRequest};
pub use state::{GameEvent, GamePhase, GameState, RestHeights, World};
pub use tick::{TickInput, count_fireballs, restart, start, tick};
