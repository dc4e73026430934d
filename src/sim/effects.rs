//! Timed visual effects
//!
//! Purely cosmetic. Effects are ticked by the same frame driver as the
//! simulation, each carries its own expiry, and none of them can reach
//! game state or the registry. An effect pinned to an entity dies with it.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Seconds a hit burst stays on screen
pub const HIT_BURST_TTL: f32 = 0.35;
pub const HIT_BURST_PARTICLES: usize = 20;
pub const MUZZLE_FLASH_TTL: f32 = 0.1;
pub const MUZZLE_FLASH_PARTICLES: usize = 10;
pub const ATTACK_FLASH_TTL: f32 = 0.2;
/// Gravity on burst particles (units/s²)
const PARTICLE_GRAVITY: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Orange burst where a fireball struck
    HitBurst,
    /// Blue flash at the wizard's hands
    MuzzleFlash,
    /// Red flash on a goblin as it throws
    AttackFlash,
    /// Trail puff behind a fireball
    Ember,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// Offset from the effect origin
    pub offset: Vec3,
    pub vel: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualEffect {
    pub kind: EffectKind,
    pub pos: Vec3,
    pub age: f32,
    pub ttl: f32,
    /// Follows this entity; dropped once it is gone
    pub anchor: Option<EntityId>,
    pub particles: Vec<Particle>,
}

impl VisualEffect {
    /// 1.0 when fresh, 0.0 at expiry
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / self.ttl).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.ttl
    }
}

/// Bounded list of live effects
#[derive(Debug, Clone)]
pub struct EffectList {
    effects: Vec<VisualEffect>,
    cap: usize,
    /// Cosmetic randomness, kept apart from the simulation's RNG
    rng: Pcg32,
}

impl EffectList {
    pub fn new(cap: usize, seed: u64) -> Self {
        Self {
            effects: Vec::new(),
            cap,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.effects.truncate(cap);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualEffect> {
        self.effects.iter()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    fn push(&mut self, effect: VisualEffect) {
        // Full list: the new effect is simply not shown
        if self.effects.len() < self.cap {
            self.effects.push(effect);
        }
    }

    pub fn hit_burst(&mut self, at: Vec3) {
        let particles = (0..HIT_BURST_PARTICLES)
            .map(|_| {
                let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
                let radius = self.rng.random::<f32>();
                let height = self.rng.random::<f32>() * 2.0;
                Particle {
                    offset: Vec3::new(angle.cos() * radius, height, angle.sin() * radius),
                    vel: Vec3::new(
                        (self.rng.random::<f32>() - 0.5) * 3.0,
                        self.rng.random::<f32>() * 3.0,
                        (self.rng.random::<f32>() - 0.5) * 3.0,
                    ),
                }
            })
            .collect();
        self.push(VisualEffect {
            kind: EffectKind::HitBurst,
            pos: at,
            age: 0.0,
            ttl: HIT_BURST_TTL,
            anchor: None,
            particles,
        });
    }

    pub fn muzzle_flash(&mut self, at: Vec3, dir: Vec3) {
        let spread = 0.3;
        let particles = (0..MUZZLE_FLASH_PARTICLES)
            .map(|_| Particle {
                offset: Vec3::ZERO,
                vel: Vec3::new(
                    dir.x + (self.rng.random::<f32>() - 0.5) * spread,
                    (self.rng.random::<f32>() - 0.5) * spread,
                    dir.z + (self.rng.random::<f32>() - 0.5) * spread,
                ) * 6.0,
            })
            .collect();
        self.push(VisualEffect {
            kind: EffectKind::MuzzleFlash,
            pos: at,
            age: 0.0,
            ttl: MUZZLE_FLASH_TTL,
            anchor: None,
            particles,
        });
    }

    pub fn attack_flash(&mut self, goblin: EntityId, at: Vec3) {
        self.push(VisualEffect {
            kind: EffectKind::AttackFlash,
            pos: at,
            age: 0.0,
            ttl: ATTACK_FLASH_TTL,
            anchor: Some(goblin),
            particles: Vec::new(),
        });
    }

    pub fn ember(&mut self, at: Vec3, dir: Vec3) {
        let ttl = 0.5 + self.rng.random::<f32>() * 0.5;
        let vel = Vec3::new(
            -dir.x * 0.5 + (self.rng.random::<f32>() - 0.5),
            1.2 + self.rng.random::<f32>(),
            -dir.z * 0.5 + (self.rng.random::<f32>() - 0.5),
        );
        self.push(VisualEffect {
            kind: EffectKind::Ember,
            pos: at,
            age: 0.0,
            ttl,
            anchor: None,
            particles: vec![Particle {
                offset: Vec3::ZERO,
                vel,
            }],
        });
    }

    /// Age every effect and drop the finished ones.
    ///
    /// `anchor_pos` resolves an anchored effect's entity; `None` means the
    /// entity is gone and the effect goes with it.
    pub fn tick(&mut self, dt: f32, anchor_pos: impl Fn(EntityId) -> Option<Vec3>) {
        self.effects.retain_mut(|effect| {
            if let Some(anchor) = effect.anchor {
                match anchor_pos(anchor) {
                    Some(pos) => effect.pos = pos,
                    None => return false,
                }
            }

            effect.age += dt;
            let gravity = matches!(effect.kind, EffectKind::HitBurst);
            for particle in &mut effect.particles {
                particle.offset += particle.vel * dt;
                if gravity {
                    particle.vel.y -= PARTICLE_GRAVITY * dt;
                }
            }
            !effect.is_expired()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;

    fn goblin_id() -> EntityId {
        EntityId {
            kind: EntityKind::Goblin,
            serial: 4,
        }
    }

    #[test]
    fn test_effects_expire() {
        let mut effects = EffectList::new(16, 1);
        effects.hit_burst(Vec3::ZERO);
        effects.muzzle_flash(Vec3::ZERO, Vec3::X);
        assert_eq!(effects.len(), 2);

        effects.tick(0.15, |_| None);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.iter().next().unwrap().kind, EffectKind::HitBurst);

        effects.tick(0.25, |_| None);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_anchored_effect_follows_then_dies_with_entity() {
        let mut effects = EffectList::new(16, 1);
        effects.attack_flash(goblin_id(), Vec3::ZERO);

        effects.tick(0.05, |_| Some(Vec3::new(1.0, 0.0, 2.0)));
        assert_eq!(effects.iter().next().unwrap().pos, Vec3::new(1.0, 0.0, 2.0));

        // Goblin removed before the flash finished
        effects.tick(0.05, |_| None);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_cap_drops_new_effects() {
        let mut effects = EffectList::new(2, 1);
        for _ in 0..5 {
            effects.ember(Vec3::ZERO, Vec3::X);
        }
        assert_eq!(effects.len(), 2);

        effects.set_cap(0);
        effects.hit_burst(Vec3::ZERO);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_opacity_fades() {
        let mut effects = EffectList::new(4, 9);
        effects.hit_burst(Vec3::ZERO);
        effects.tick(HIT_BURST_TTL / 2.0, |_| None);
        let opacity = effects.iter().next().unwrap().opacity();
        assert!((opacity - 0.5).abs() < 1e-4);
    }
}
