//! Per-frame simulation step
//!
//! One call per rendered frame: entity updates, collisions, spawn policy,
//! deferred removals, effects. Paused, loading and finished sessions only
//! process the pause/debug toggles.

use glam::Vec3;
use log::debug;
use rand::Rng;

use super::collision::{Hit, check_collisions};
use super::entity::{EntityId, FireballSpawn, Movement, Owner};
use super::registry::SpawnRequest;
use super::state::{GameEvent, GamePhase, World};
use crate::consts::*;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub movement: Movement,
    /// Fire pressed this frame
    pub fire: bool,
    /// Pause toggle pressed this frame
    pub pause: bool,
    /// Collider overlay toggle pressed this frame
    pub toggle_debug: bool,
}

/// Leave the loading screen
pub fn start(world: &mut World) {
    if world.state.phase == GamePhase::Loading {
        world.state.set_phase(GamePhase::Running);
    }
}

/// Fresh session in place: full health, zero score, no fireballs, player at
/// the start, a new initial batch of goblins. Works from any phase.
pub fn restart(world: &mut World) {
    world.registry.clear();
    world.effects.clear();
    world.player.reset(PLAYER_START);
    world.state.reset();
    push_despawns(world);
    world.spawn_initial_goblins();
    log::info!("restarted session (seed {})", world.seed);
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if input.toggle_debug {
        world.debug_colliders = !world.debug_colliders;
        debug!("collider overlay {}", if world.debug_colliders { "on" } else { "off" });
    }

    if input.pause {
        match world.state.phase {
            GamePhase::Running => world.state.set_phase(GamePhase::Paused),
            GamePhase::Paused => world.state.set_phase(GamePhase::Running),
            GamePhase::Loading | GamePhase::GameOver => {}
        }
    }

    if !world.state.is_running() {
        return;
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    world.clock += dt;
    let now = world.clock;

    // Player
    world
        .player
        .update(dt, input.movement, &world.tuning.player, world.rest.player);
    let player_shot = if input.fire {
        world.player.try_fire(now, &world.tuning.player)
    } else {
        None
    };

    // Goblins
    let player_pos = world.player.pos;
    let mut goblin_shots: Vec<(EntityId, FireballSpawn)> = Vec::new();
    for goblin in world.registry.goblins_mut() {
        if let Some(shot) = goblin.update(
            dt,
            now,
            player_pos,
            &world.tuning.goblin,
            world.rest.goblin,
            &mut world.rng,
        ) {
            goblin_shots.push((goblin.id, shot));
        }
    }

    // Fireballs already in flight; this frame's shots start moving next frame
    let mut expired = Vec::new();
    let mut embers = Vec::new();
    let ember_interval = world.tuning.fireball.ember_interval;
    for fireball in world.registry.fireballs_mut() {
        let step = fireball.update(dt, now, ember_interval);
        if step.expired {
            expired.push(fireball.id);
        } else if step.ember {
            embers.push((fireball.pos, fireball.dir));
        }
    }
    for id in expired {
        world.registry.remove(id);
    }
    for (pos, dir) in embers {
        world.effects.ember(pos, dir);
    }

    if let Some(shot) = player_shot {
        world.effects.muzzle_flash(shot.pos, shot.dir);
        launch(world, shot);
    }
    for (goblin, shot) in goblin_shots {
        if let Some(pos) = world.position_of(goblin) {
            world.effects.attack_flash(goblin, pos);
        }
        launch(world, shot);
    }

    // Collisions
    let hits = check_collisions(&world.registry, world.player.pos, &world.state.radii);
    for hit in hits {
        apply_hit(world, hit);
    }

    // Ambient spawns
    if world.rng.random::<f32>() < world.tuning.rules.ambient_spawn_chance
        && world.registry.goblin_count() < world.registry.max_goblins()
    {
        world.spawn_goblin();
    }

    world.registry.flush();
    push_despawns(world);

    let registry = &world.registry;
    world.effects.tick(dt, |id| registry.goblin(id).map(|g| g.pos));
}

fn launch(world: &mut World, shot: FireballSpawn) {
    if let Some(id) = world.registry.spawn(SpawnRequest::Fireball(shot), world.clock) {
        debug!(
            "{id} launched by {:?} toward ({:.2}, {:.2})",
            shot.owner, shot.dir.x, shot.dir.z
        );
        world.state.events.push(GameEvent::Spawned { id, pos: shot.pos });
    }
    // Anything the cap pushed out
    push_despawns(world);
}

fn apply_hit(world: &mut World, hit: Hit) {
    match hit {
        Hit::Goblin {
            fireball,
            goblin,
            at,
            distance,
        } => {
            debug!("{fireball} hit {goblin} at distance {distance:.3}");
            world.effects.hit_burst(at);
            world.state.add_score(world.tuning.rules.points_per_goblin);
            maybe_reinforce(world);
            world.registry.remove(goblin);
            world.registry.remove(fireball);
            world
                .state
                .events
                .push(GameEvent::GoblinKilled { goblin, at });
        }
        Hit::Player { fireball, at, .. } => {
            debug!("{fireball} hit the player");
            world.effects.hit_burst(at + Vec3::Y);
            world.state.damage(world.tuning.rules.fireball_damage);
            world.registry.remove(fireball);
            world.state.events.push(GameEvent::PlayerHit { at });
        }
    }
}

/// Scoring can call in another goblin while the horde is under its
/// score-scaled soft cap
fn maybe_reinforce(world: &mut World) {
    let cap = world.tuning.reinforcement_cap(world.state.score);
    if world.registry.goblin_count() < cap
        && world.rng.random::<f32>() < world.tuning.rules.reinforcement_chance
    {
        world.spawn_goblin();
    }
}

fn push_despawns(world: &mut World) {
    for id in world.registry.drain_removed() {
        world.state.events.push(GameEvent::Despawned { id });
    }
}

/// Fireballs owned by `owner`, for assertions and HUD counters
pub fn count_fireballs(world: &World, owner: Owner) -> usize {
    world.registry.fireballs().filter(|f| f.owner == owner).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    const DT: f32 = 1.0 / 60.0;

    /// A running world with no goblins and no random spawns
    fn quiet_world() -> World {
        let mut tuning = Tuning::default();
        tuning.rules.initial_goblins = 0;
        tuning.rules.ambient_spawn_chance = 0.0;
        tuning.rules.reinforcement_chance = 0.0;
        let mut world = World::new(12345, tuning);
        start(&mut world);
        world.drain_events();
        world
    }

    fn place_goblin(world: &mut World, pos: Vec3) -> EntityId {
        world
            .registry
            .spawn(SpawnRequest::Goblin { pos }, world.clock)
            .unwrap()
    }

    fn place_fireball(world: &mut World, pos: Vec3, dir: Vec3, owner: Owner) -> EntityId {
        world
            .registry
            .spawn(SpawnRequest::Fireball(FireballSpawn { pos, dir, owner }), world.clock)
            .unwrap()
    }

    #[test]
    fn test_loading_does_not_simulate() {
        let mut world = World::new(1, Tuning::default());
        let before: Vec<_> = world.registry.goblins().map(|g| g.pos).collect();
        tick(&mut world, &TickInput::default(), DT);
        let after: Vec<_> = world.registry.goblins().map(|g| g.pos).collect();
        assert_eq!(before, after);
        assert_eq!(world.clock, 0.0);

        start(&mut world);
        assert_eq!(world.state.phase, GamePhase::Running);
    }

    #[test]
    fn test_pause_toggle_freezes_world() {
        let mut world = quiet_world();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut world, &pause, DT);
        assert_eq!(world.state.phase, GamePhase::Paused);

        let walk = TickInput {
            movement: Movement {
                right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut world, &walk, DT);
        assert_eq!(world.player.pos.x, 0.0);

        tick(&mut world, &pause, DT);
        assert_eq!(world.state.phase, GamePhase::Running);
        tick(&mut world, &walk, DT);
        assert!(world.player.pos.x > 0.0);
    }

    #[test]
    fn test_fire_twice_within_cooldown_spawns_one() {
        let mut world = quiet_world();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &fire, DT);
        tick(&mut world, &fire, DT);
        assert_eq!(count_fireballs(&world, Owner::Player), 1);

        // Past the cooldown a second shot goes out
        for _ in 0..30 {
            tick(&mut world, &TickInput::default(), DT);
        }
        tick(&mut world, &fire, DT);
        assert_eq!(count_fireballs(&world, Owner::Player), 2);
    }

    #[test]
    fn test_fireball_expires_after_lifespan() {
        let mut world = quiet_world();
        let id = place_fireball(&mut world, Vec3::new(50.0, 1.0, 0.0), Vec3::X, Owner::Enemy);
        // 3 s lifespan at 0.1 s per frame
        for _ in 0..29 {
            tick(&mut world, &TickInput::default(), 0.1);
        }
        assert!(world.registry.is_alive(id));
        tick(&mut world, &TickInput::default(), 0.1);
        tick(&mut world, &TickInput::default(), 0.1);
        assert!(!world.registry.is_alive(id));
        assert!(
            world
                .drain_events()
                .contains(&GameEvent::Despawned { id })
        );
    }

    #[test]
    fn test_expired_fireball_cannot_score() {
        let mut world = quiet_world();
        let at = Vec3::new(50.0, 1.0, 0.0);
        let fireball = place_fireball(&mut world, at, Vec3::ZERO, Owner::Player);
        for _ in 0..29 {
            tick(&mut world, &TickInput::default(), 0.1);
        }
        tick(&mut world, &TickInput::default(), 0.05);
        assert!(world.registry.is_alive(fireball));

        // Out of detection range, so the goblin stays on top of the fireball
        let goblin = place_goblin(&mut world, Vec3::new(50.0, 0.8, 0.0));
        tick(&mut world, &TickInput::default(), 0.1);

        assert_eq!(world.state.score, 0);
        assert!(!world.registry.is_alive(fireball));
        assert!(world.registry.is_alive(goblin));
    }

    #[test]
    fn test_goblin_hit_scores_and_removes_both() {
        let mut world = quiet_world();
        let goblin = place_goblin(&mut world, Vec3::new(5.0, 0.0, 5.0));
        let fireball = place_fireball(&mut world, Vec3::new(5.1, 0.0, 5.1), Vec3::X, Owner::Player);

        // The goblin is within detection range and walks toward the player;
        // both still overlap after one frame
        tick(&mut world, &TickInput::default(), 0.0);
        assert_eq!(world.state.score, 10);
        assert!(!world.registry.is_alive(goblin));
        assert!(!world.registry.is_alive(fireball));
        assert_eq!(world.registry.goblin_count(), 0);

        let events = world.drain_events();
        assert!(events.contains(&GameEvent::ScoreChanged(10)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GoblinKilled { .. })));
        assert!(world.effects.iter().next().is_some());
    }

    #[test]
    fn test_enemy_fireball_damages_player() {
        let mut world = quiet_world();
        let fireball = place_fireball(&mut world, Vec3::new(0.5, 1.0, 0.0), Vec3::X, Owner::Enemy);
        tick(&mut world, &TickInput::default(), 0.0);
        assert_eq!(world.state.player_health, 90);
        assert!(!world.registry.is_alive(fireball));
        assert!(world.drain_events().contains(&GameEvent::HealthChanged(90)));
    }

    #[test]
    fn test_death_ends_game_and_freezes() {
        let mut world = quiet_world();
        world.state.player_health = 10;
        place_fireball(&mut world, Vec3::ZERO, Vec3::X, Owner::Enemy);
        tick(&mut world, &TickInput::default(), 0.0);
        assert_eq!(world.state.player_health, 0);
        assert!(world.state.is_game_over());
        assert!(world.drain_events().contains(&GameEvent::GameOver { score: 0 }));

        let clock = world.clock;
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut world, &pause, DT);
        assert!(world.state.is_game_over());
        assert_eq!(world.clock, clock);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut world = World::new(7, Tuning::default());
        start(&mut world);
        world.state.player_health = 0;
        world.state.score = 340;
        world.state.set_phase(GamePhase::GameOver);
        place_fireball(&mut world, Vec3::ZERO, Vec3::X, Owner::Player);
        world.player.pos = Vec3::new(9.0, 1.0, -3.0);

        restart(&mut world);
        assert_eq!(world.state.player_health, 100);
        assert_eq!(world.state.score, 0);
        assert!(!world.state.is_game_over());
        assert!(world.state.is_running());
        assert_eq!(world.registry.fireball_count(), 0);
        assert_eq!(world.registry.goblin_count(), 3);
        assert_eq!(world.player.pos.x, 0.0);
        assert_eq!(world.player.pos.z, 0.0);
    }

    #[test]
    fn test_fireball_cap_in_play() {
        let mut world = quiet_world();
        let first = place_fireball(&mut world, Vec3::new(90.0, 1.0, 0.0), Vec3::X, Owner::Player);
        for i in 1..10 {
            place_fireball(&mut world, Vec3::new(90.0, 1.0, i as f32), Vec3::X, Owner::Player);
        }
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &fire, DT);
        assert_eq!(world.registry.fireball_count(), 10);
        assert!(!world.registry.is_alive(first));
    }

    #[test]
    fn test_goblin_attack_flash_dies_with_goblin() {
        let mut tuning = Tuning::default();
        tuning.rules.initial_goblins = 0;
        tuning.rules.ambient_spawn_chance = 0.0;
        tuning.goblin.attack_chance = 1.0;
        let mut world = World::new(3, tuning);
        start(&mut world);

        let goblin = place_goblin(&mut world, Vec3::new(6.0, 0.8, 0.0));
        tick(&mut world, &TickInput::default(), DT);
        assert_eq!(count_fireballs(&world, Owner::Enemy), 1);
        assert!(world.effects.iter().any(|e| e.anchor == Some(goblin)));

        world.registry.remove(goblin);
        world.registry.flush();
        tick(&mut world, &TickInput::default(), DT);
        assert!(world.effects.iter().all(|e| e.anchor.is_none()));
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = World::new(99999, Tuning::default());
        let mut b = World::new(99999, Tuning::default());
        start(&mut a);
        start(&mut b);
        let inputs = [
            TickInput {
                movement: Movement {
                    forward: true,
                    ..Default::default()
                },
                fire: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                movement: Movement {
                    left: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        for frame in 0..600 {
            let input = &inputs[frame % inputs.len()];
            tick(&mut a, input, DT);
            tick(&mut b, input, DT);
        }
        assert_eq!(a.state.score, b.state.score);
        assert_eq!(a.state.player_health, b.state.player_health);
        let pa: Vec<_> = a.registry.goblins().map(|g| g.pos).collect();
        let pb: Vec<_> = b.registry.goblins().map(|g| g.pos).collect();
        assert_eq!(pa, pb);
    }
}
