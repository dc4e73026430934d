//! Frame driver
//!
//! Owns the world and its collaborators' state. Once per rendered frame it
//! polls assets, feeds input to the simulation, routes the resulting events
//! to the UI and the scene, then hands the scene a frame to draw.

use log::info;

use crate::platform::scene::Placement;
use crate::platform::{
    AssetLoader, AssetManager, FrameView, InputState, Key, SceneBackend, SceneNode, sync_scene,
};
use crate::settings::{QualityPreset, Settings};
use crate::sim::{self, EntityId, EntityKind, GameEvent, World};
use crate::tuning::Tuning;
use crate::ui::{EventBus, GameObserver, Hud, Radar, notify};

pub struct Game {
    pub world: World,
    pub hud: Hud,
    settings: Settings,
    bus: EventBus,
    assets: AssetManager,
    input: InputState,
    player_in_scene: bool,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let mut world = World::new(seed, tuning);
        world.effects.set_cap(settings.max_effects());
        world.debug_colliders = settings.show_colliders;
        let hud = Hud::new(&world.state);
        info!("new game (seed {seed}, quality {})", settings.quality);

        Self {
            world,
            hud,
            settings,
            bus: EventBus::new(),
            assets: AssetManager::default(),
            input: InputState::new(),
            player_in_scene: false,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.bus.subscribe(observer);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Take new preferences; the collider overlay follows them too
    pub fn apply_settings(&mut self, settings: Settings) {
        self.world.effects.set_cap(settings.max_effects());
        self.world.debug_colliders = settings.show_colliders;
        self.settings = settings;
    }

    pub fn set_quality(&mut self, preset: QualityPreset) {
        let mut settings = self.settings.clone();
        settings.apply_preset(preset);
        info!("quality set to {preset}");
        self.apply_settings(settings);
    }

    pub fn assets_ready(&self) -> bool {
        self.assets.all_settled()
    }

    pub fn key_down(&mut self, key: Key) {
        self.input.key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    pub fn key_down_code(&mut self, code: &str) {
        self.input.key_down_code(code);
    }

    pub fn key_up_code(&mut self, code: &str) {
        self.input.key_up_code(code);
    }

    /// Window lost focus: release every held key
    pub fn blur(&mut self) {
        self.input.clear();
    }

    pub fn start(&mut self) {
        sim::start(&mut self.world);
    }

    pub fn restart(&mut self) {
        sim::restart(&mut self.world);
    }

    /// One rendered frame
    pub fn frame(&mut self, dt: f32, loader: &mut dyn AssetLoader, scene: &mut dyn SceneBackend) {
        if !self.player_in_scene {
            scene.add_to_scene(SceneNode {
                id: EntityId::PLAYER,
                kind: EntityKind::Player,
                pos: self.world.player.pos,
            });
            self.player_in_scene = true;
        }

        for model in self.assets.update(loader, dt) {
            self.world.set_rest_height(model.kind, model.rest_height);
        }

        let input = self.input.take_tick_input();
        sim::tick(&mut self.world, &input, dt);

        let events = self.world.drain_events();
        self.route_events(&events, scene);
        self.hud.update_counts(&self.world);

        scene.render(&FrameView::capture(&self.world));
    }

    fn route_events(&mut self, events: &[GameEvent], scene: &mut dyn SceneBackend) {
        for event in events {
            notify(&mut self.hud, event);
        }
        self.bus.dispatch(events);
        sync_scene(scene, events);
    }

    /// Radar contents, when the radar is enabled
    pub fn radar(&self) -> Option<Radar> {
        self.settings.show_radar.then(|| Radar::capture(&self.world))
    }

    pub fn player_placement(&self) -> Placement {
        Placement {
            id: EntityId::PLAYER,
            pos: self.world.player.pos,
            yaw: self.world.player.yaw,
        }
    }

    pub fn hud_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.hud)
    }
}
