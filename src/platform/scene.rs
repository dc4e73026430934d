//! Scene mirroring
//!
//! The renderer owns meshes, lights and the camera. The core only tells it
//! which entities exist and, once per frame, where everything is.

use std::collections::HashMap;

use glam::Vec3;
use serde::Serialize;

use crate::sim::{
    ColliderDisc, EntityId, EntityKind, GameEvent, GamePhase, VisualEffect, World, collider_discs,
};

/// An entity as the scene first sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec3,
}

/// Placement of one entity this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub id: EntityId,
    pub pos: Vec3,
    pub yaw: f32,
}

/// Everything the renderer needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameView<'a> {
    pub phase: GamePhase,
    pub player: Placement,
    pub goblins: Vec<Placement>,
    pub fireballs: Vec<Placement>,
    pub effects: Vec<&'a VisualEffect>,
    /// Present while the collider overlay is on
    pub colliders: Option<Vec<ColliderDisc>>,
}

impl<'a> FrameView<'a> {
    pub fn capture(world: &'a World) -> Self {
        let goblins = world
            .registry
            .goblins()
            .map(|g| Placement {
                id: g.id,
                pos: g.pos,
                yaw: g.yaw,
            })
            .collect();
        let fireballs = world
            .registry
            .fireballs()
            .map(|f| Placement {
                id: f.id,
                pos: f.pos,
                yaw: crate::yaw_toward(f.dir),
            })
            .collect();
        let colliders = world
            .debug_colliders
            .then(|| collider_discs(&world.registry, world.player.pos, &world.state.radii));

        Self {
            phase: world.state.phase,
            player: Placement {
                id: EntityId::PLAYER,
                pos: world.player.pos,
                yaw: world.player.yaw,
            },
            goblins,
            fireballs,
            effects: world.effects.iter().collect(),
            colliders,
        }
    }
}

/// Rendering collaborator
pub trait SceneBackend {
    fn add_to_scene(&mut self, node: SceneNode);
    fn remove_from_scene(&mut self, id: EntityId);
    fn render(&mut self, view: &FrameView<'_>);
}

/// Mirror spawns and despawns into the scene
pub fn sync_scene(scene: &mut dyn SceneBackend, events: &[GameEvent]) {
    for event in events {
        match *event {
            GameEvent::Spawned { id, pos } => scene.add_to_scene(SceneNode {
                id,
                kind: id.kind,
                pos,
            }),
            GameEvent::Despawned { id } => scene.remove_from_scene(id),
            _ => {}
        }
    }
}

/// Scene that only keeps books; used headless and in tests
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    pub nodes: HashMap<EntityId, SceneNode>,
    pub frames: usize,
    pub last_goblins: usize,
    pub last_fireballs: usize,
    pub last_effects: usize,
    pub last_colliders: Option<usize>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.nodes.values().filter(|n| n.kind == kind).count()
    }
}

impl SceneBackend for RecordingScene {
    fn add_to_scene(&mut self, node: SceneNode) {
        self.nodes.insert(node.id, node);
    }

    fn remove_from_scene(&mut self, id: EntityId) {
        self.nodes.remove(&id);
    }

    fn render(&mut self, view: &FrameView<'_>) {
        self.frames += 1;
        self.last_goblins = view.goblins.len();
        self.last_fireballs = view.fireballs.len();
        self.last_effects = view.effects.len();
        self.last_colliders = view.colliders.as_ref().map(Vec::len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_sync_follows_spawn_and_despawn() {
        let mut world = World::new(3, Tuning::default());
        let mut scene = RecordingScene::new();
        let events = world.drain_events();
        sync_scene(&mut scene, &events);
        assert_eq!(scene.count(EntityKind::Goblin), 3);

        let victim = world.registry.goblins().next().unwrap().id;
        sync_scene(&mut scene, &[GameEvent::Despawned { id: victim }]);
        assert_eq!(scene.count(EntityKind::Goblin), 2);
        assert!(!scene.nodes.contains_key(&victim));

        // Unknown ids are harmless
        sync_scene(&mut scene, &[GameEvent::Despawned { id: victim }]);
        assert_eq!(scene.nodes.len(), 2);
    }

    #[test]
    fn test_view_carries_colliders_only_when_enabled() {
        let mut world = World::new(3, Tuning::default());
        let view = FrameView::capture(&world);
        assert_eq!(view.goblins.len(), 3);
        assert!(view.colliders.is_none());

        world.debug_colliders = true;
        let view = FrameView::capture(&world);
        // Player plus three goblins
        assert_eq!(view.colliders.map(|c| c.len()), Some(4));
    }

    #[test]
    fn test_view_serializes() {
        let world = World::new(3, Tuning::default());
        let json = serde_json::to_string(&FrameView::capture(&world)).unwrap();
        assert!(json.contains("\"phase\":\"Loading\""));
    }
}
