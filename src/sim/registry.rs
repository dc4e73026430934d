//! Object registry: owns every goblin and fireball
//!
//! Removal is deferred. `remove` only marks an entity; it stays in its
//! array (invisible to the live iterators) until `flush`, so a collision
//! pass can remove entities while it walks the arrays. Marking and liveness
//! checks are hash lookups; fireballs sit in a ring so the cap evicts from
//! the front.

use std::collections::{HashSet, VecDeque};

use glam::Vec3;
use log::debug;

use super::entity::{EntityId, EntityKind, Fireball, FireballSpawn, Goblin};
use crate::tuning::{FireballTuning, Tuning};

/// What to spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnRequest {
    Goblin { pos: Vec3 },
    Fireball(FireballSpawn),
}

/// Borrowed view of a live entity
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Goblin(&'a Goblin),
    Fireball(&'a Fireball),
}

impl EntityRef<'_> {
    pub fn id(&self) -> EntityId {
        match self {
            EntityRef::Goblin(g) => g.id,
            EntityRef::Fireball(f) => f.id,
        }
    }

    pub fn pos(&self) -> Vec3 {
        match self {
            EntityRef::Goblin(g) => g.pos,
            EntityRef::Fireball(f) => f.pos,
        }
    }
}

/// Goblins and fireballs, in registration order
#[derive(Debug, Clone)]
pub struct Registry {
    goblins: Vec<Goblin>,
    /// Oldest at the front
    fireballs: VecDeque<Fireball>,
    /// Everything physically stored, marked or not
    present: HashSet<EntityId>,
    /// Marked for removal, dropped on the next flush
    doomed: HashSet<EntityId>,
    /// Everything physically removed since the last `drain_removed`
    removed: Vec<EntityId>,
    max_goblins: usize,
    max_fireballs: usize,
    fireball_tuning: FireballTuning,
    next_serial: u32,
}

impl Registry {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            goblins: Vec::with_capacity(tuning.rules.max_goblins),
            fireballs: VecDeque::with_capacity(tuning.rules.max_fireballs),
            present: HashSet::new(),
            doomed: HashSet::new(),
            removed: Vec::new(),
            max_goblins: tuning.rules.max_goblins,
            max_fireballs: tuning.rules.max_fireballs,
            fireball_tuning: tuning.fireball.clone(),
            // Serial 0 belongs to the player
            next_serial: 1,
        }
    }

    fn next_id(&mut self, kind: EntityKind) -> EntityId {
        let serial = self.next_serial;
        self.next_serial += 1;
        EntityId { kind, serial }
    }

    /// Spawn an entity at sim time `now`.
    ///
    /// A goblin over the cap is refused (`None`). A fireball over the cap
    /// evicts the oldest live fireball first.
    pub fn spawn(&mut self, request: SpawnRequest, now: f32) -> Option<EntityId> {
        match request {
            SpawnRequest::Goblin { pos } => {
                if self.goblin_count() >= self.max_goblins {
                    return None;
                }
                let id = self.next_id(EntityKind::Goblin);
                self.goblins.push(Goblin::new(id, pos));
                self.present.insert(id);
                debug!("spawned {id} at ({:.1}, {:.1})", pos.x, pos.z);
                Some(id)
            }
            SpawnRequest::Fireball(spawn) => {
                self.compact_fireballs();
                while self.fireballs.len() >= self.max_fireballs {
                    let Some(evicted) = self.fireballs.pop_front() else {
                        break;
                    };
                    debug!("fireball cap reached, evicting {}", evicted.id);
                    self.present.remove(&evicted.id);
                    self.removed.push(evicted.id);
                }
                let id = self.next_id(EntityKind::Fireball);
                self.fireballs
                    .push_back(Fireball::new(id, spawn, now, &self.fireball_tuning));
                self.present.insert(id);
                Some(id)
            }
        }
    }

    /// Mark an entity for removal. Unknown or already removed ids are ignored.
    /// Returns true if this call marked it.
    /// The player is never registry-owned.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.present.contains(&id) && self.doomed.insert(id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.present.contains(&id) && !self.doomed.contains(&id)
    }

    /// Physically drop everything marked for removal
    pub fn flush(&mut self) {
        if self.doomed.is_empty() {
            return;
        }
        let doomed = &self.doomed;
        let removed = &mut self.removed;
        self.goblins.retain(|g| {
            let keep = !doomed.contains(&g.id);
            if !keep {
                removed.push(g.id);
            }
            keep
        });
        self.compact_fireballs();
        for id in self.doomed.drain() {
            self.present.remove(&id);
        }
    }

    /// Physically drop marked fireballs; their marks are kept until `flush`
    fn compact_fireballs(&mut self) {
        let doomed = &self.doomed;
        let present = &mut self.present;
        let removed = &mut self.removed;
        self.fireballs.retain(|f| {
            let keep = !doomed.contains(&f.id);
            if !keep {
                present.remove(&f.id);
                removed.push(f.id);
            }
            keep
        });
    }

    /// Drop every goblin and fireball
    pub fn clear(&mut self) {
        self.removed.extend(self.goblins.drain(..).map(|g| g.id));
        self.removed.extend(self.fireballs.drain(..).map(|f| f.id));
        self.present.clear();
        self.doomed.clear();
    }

    /// Ids removed since the last call, in removal order
    pub fn drain_removed(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.removed)
    }

    /// Visit every live entity: goblins first, then fireballs
    pub fn for_each_active(&self, mut visit: impl FnMut(EntityRef<'_>)) {
        for goblin in self.goblins() {
            visit(EntityRef::Goblin(goblin));
        }
        for fireball in self.fireballs() {
            visit(EntityRef::Fireball(fireball));
        }
    }

    pub fn goblins(&self) -> impl Iterator<Item = &Goblin> {
        self.goblins.iter().filter(|g| !self.doomed.contains(&g.id))
    }

    pub fn fireballs(&self) -> impl Iterator<Item = &Fireball> {
        self.fireballs.iter().filter(|f| !self.doomed.contains(&f.id))
    }

    pub fn goblins_mut(&mut self) -> impl Iterator<Item = &mut Goblin> {
        let doomed = &self.doomed;
        self.goblins.iter_mut().filter(move |g| !doomed.contains(&g.id))
    }

    pub fn fireballs_mut(&mut self) -> impl Iterator<Item = &mut Fireball> {
        let doomed = &self.doomed;
        self.fireballs.iter_mut().filter(move |f| !doomed.contains(&f.id))
    }

    pub fn goblin(&self, id: EntityId) -> Option<&Goblin> {
        self.goblins().find(|g| g.id == id)
    }

    pub fn fireball(&self, id: EntityId) -> Option<&Fireball> {
        self.fireballs().find(|f| f.id == id)
    }

    pub fn goblin_count(&self) -> usize {
        self.goblins().count()
    }

    pub fn fireball_count(&self) -> usize {
        self.fireballs().count()
    }

    pub fn max_goblins(&self) -> usize {
        self.max_goblins
    }

    pub fn max_fireballs(&self) -> usize {
        self.max_fireballs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Owner;

    fn shot(x: f32) -> SpawnRequest {
        SpawnRequest::Fireball(FireballSpawn {
            pos: Vec3::new(x, 1.0, 0.0),
            dir: Vec3::X,
            owner: Owner::Player,
        })
    }

    fn goblin() -> SpawnRequest {
        SpawnRequest::Goblin { pos: Vec3::ZERO }
    }

    #[test]
    fn test_goblin_cap_refuses_silently() {
        let mut registry = Registry::new(&Tuning::default());
        for _ in 0..5 {
            assert!(registry.spawn(goblin(), 0.0).is_some());
        }
        assert!(registry.spawn(goblin(), 0.0).is_none());
        assert_eq!(registry.goblin_count(), 5);
    }

    #[test]
    fn test_fireball_cap_evicts_oldest() {
        let mut registry = Registry::new(&Tuning::default());
        let ids: Vec<_> = (0..10)
            .map(|i| registry.spawn(shot(i as f32), 0.0).unwrap())
            .collect();
        registry.drain_removed();

        let newest = registry.spawn(shot(99.0), 0.0).unwrap();
        assert_eq!(registry.fireball_count(), 10);
        assert!(!registry.is_alive(ids[0]));
        assert!(registry.is_alive(ids[1]));
        assert!(registry.is_alive(newest));
        assert_eq!(registry.drain_removed(), vec![ids[0]]);
    }

    #[test]
    fn test_marked_fireballs_free_capacity_before_eviction() {
        let mut registry = Registry::new(&Tuning::default());
        let ids: Vec<_> = (0..10)
            .map(|i| registry.spawn(shot(i as f32), 0.0).unwrap())
            .collect();
        registry.remove(ids[4]);
        registry.spawn(shot(50.0), 0.0);
        // The marked one made room, so the oldest survives
        assert!(registry.is_alive(ids[0]));
        assert!(!registry.is_alive(ids[4]));
        assert_eq!(registry.fireball_count(), 10);
    }

    #[test]
    fn test_removal_is_deferred_and_idempotent() {
        let mut registry = Registry::new(&Tuning::default());
        let a = registry.spawn(goblin(), 0.0).unwrap();
        let b = registry.spawn(goblin(), 0.0).unwrap();

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert!(!registry.is_alive(a));
        assert_eq!(registry.goblin_count(), 1);

        let mut seen = Vec::new();
        registry.for_each_active(|e| seen.push(e.id()));
        assert_eq!(seen, vec![b]);

        registry.flush();
        assert_eq!(registry.drain_removed(), vec![a]);
        // Gone for good; removing again is a no-op
        assert!(!registry.remove(a));
        assert!(!registry.remove(EntityId::PLAYER));
    }

    #[test]
    fn test_evicted_fireball_is_gone_for_good() {
        let mut tuning = Tuning::default();
        tuning.rules.max_fireballs = 3;
        let mut registry = Registry::new(&tuning);
        let ids: Vec<_> = (0..3)
            .map(|i| registry.spawn(shot(i as f32), 0.0).unwrap())
            .collect();
        registry.remove(ids[1]);

        // Compaction frees the marked slot, then the cap still holds
        let d = registry.spawn(shot(3.0), 0.0).unwrap();
        let e = registry.spawn(shot(4.0), 0.0).unwrap();
        assert!(!registry.is_alive(ids[0]));
        assert!(!registry.remove(ids[0]));
        assert!(!registry.remove(ids[1]));
        let order: Vec<_> = registry.fireballs().map(|f| f.id).collect();
        assert_eq!(order, vec![ids[2], d, e]);

        registry.flush();
        assert_eq!(registry.drain_removed(), vec![ids[1], ids[0]]);
        assert!(registry.remove(d));
        registry.flush();
        assert!(!registry.is_alive(d));
        assert_eq!(registry.fireball_count(), 2);
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut registry = Registry::new(&Tuning::default());
        let g = registry.spawn(goblin(), 0.0).unwrap();
        let f = registry.spawn(shot(0.0), 0.0).unwrap();
        assert_eq!(g.kind, EntityKind::Goblin);
        assert_eq!(f.kind, EntityKind::Fireball);
        assert_ne!(g.serial, f.serial);

        registry.clear();
        let g2 = registry.spawn(goblin(), 0.0).unwrap();
        assert!(g2.serial > f.serial);
        assert_eq!(registry.drain_removed(), vec![g, f]);
    }
}
