//! Goblin Arena entry point
//!
//! On the web the page drives everything through `WasmGame`. Natively there
//! is no window; we play a scripted headless session and log how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use serde::Serialize;
    use wasm_bindgen::prelude::*;

    use goblin_arena::platform::{FrameView, MemoryLoader, SceneBackend, SceneNode};
    use goblin_arena::sim::EntityId;
    use goblin_arena::{Game, QualityPreset, Settings, Tuning};

    /// Scene that queues changes for the page to pull after each frame
    #[derive(Default, Serialize)]
    struct PageScene {
        added: Vec<SceneNode>,
        removed: Vec<EntityId>,
        #[serde(skip)]
        frame: String,
    }

    impl SceneBackend for PageScene {
        fn add_to_scene(&mut self, node: SceneNode) {
            self.added.push(node);
        }

        fn remove_from_scene(&mut self, id: EntityId) {
            self.added.retain(|n| n.id != id);
            self.removed.push(id);
        }

        fn render(&mut self, view: &FrameView<'_>) {
            match serde_json::to_string(view) {
                Ok(json) => self.frame = json,
                Err(e) => log::warn!("Frame serialization failed: {e}"),
            }
        }
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|e| {
            log::warn!("Serialization failed: {e}");
            String::from("null")
        })
    }

    #[wasm_bindgen]
    pub struct WasmGame {
        game: Game,
        loader: MemoryLoader,
        scene: PageScene,
    }

    #[wasm_bindgen]
    impl WasmGame {
        /// Both arguments are optional JSON blobs; bad input falls back to
        /// the defaults
        #[wasm_bindgen(constructor)]
        pub fn new(settings_json: Option<String>, tuning_json: Option<String>) -> WasmGame {
            let settings = settings_json
                .as_deref()
                .map(Settings::from_json_or_default)
                .unwrap_or_default();
            let tuning = match tuning_json.as_deref().map(Tuning::from_json) {
                Some(Ok(tuning)) => tuning,
                Some(Err(e)) => {
                    log::warn!("Ignoring tuning: {e}");
                    Tuning::default()
                }
                None => Tuning::default(),
            };

            let seed = js_sys::Date::now() as u64;
            log::info!("Game initialized with seed: {seed}");

            WasmGame {
                game: Game::new(seed, tuning, settings),
                loader: MemoryLoader::new(),
                scene: PageScene::default(),
            }
        }

        pub fn key_down(&mut self, code: &str) {
            self.game.key_down_code(code);
        }

        pub fn key_up(&mut self, code: &str) {
            self.game.key_up_code(code);
        }

        pub fn blur(&mut self) {
            self.game.blur();
        }

        pub fn start(&mut self) {
            self.game.start();
        }

        pub fn restart(&mut self) {
            self.game.restart();
        }

        pub fn frame(&mut self, dt: f32) {
            self.game.frame(dt, &mut self.loader, &mut self.scene);
        }

        /// Switch to a named preset ("low", "medium", "high"); false if the
        /// name is unknown
        pub fn set_quality(&mut self, name: &str) -> bool {
            match name.parse::<QualityPreset>() {
                Ok(preset) => {
                    self.game.set_quality(preset);
                    true
                }
                Err(e) => {
                    log::warn!("{e}");
                    false
                }
            }
        }

        pub fn assets_ready(&self) -> bool {
            self.game.assets_ready()
        }

        /// Model paths the page should start loading
        pub fn outstanding_models(&self) -> js_sys::Array {
            self.loader.outstanding().map(JsValue::from_str).collect()
        }

        pub fn model_loaded(&mut self, path: &str, height: f32) {
            self.loader.finish(path, height);
        }

        pub fn model_failed(&mut self, path: &str, reason: &str) {
            self.loader.fail(path, reason);
        }

        /// Nodes added/removed since the last call, as JSON
        pub fn take_scene_changes(&mut self) -> String {
            let json = to_json(&self.scene);
            self.scene.added.clear();
            self.scene.removed.clear();
            json
        }

        pub fn frame_json(&self) -> String {
            self.scene.frame.clone()
        }

        pub fn hud_json(&self) -> String {
            to_json(&self.game.hud)
        }

        pub fn radar_json(&self) -> String {
            to_json(&self.game.radar())
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the first logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Goblin Arena starting...");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Goblin Arena (native) starting...");
    log::info!("No renderer natively - playing a headless session");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use goblin_arena::platform::assets::PLAYER_MODEL_PATH;
    use goblin_arena::platform::{Key, MemoryLoader, RecordingScene};
    use goblin_arena::sim::GamePhase;
    use goblin_arena::{Game, Settings, Tuning};

    const DT: f32 = 1.0 / 60.0;
    /// Two simulated minutes
    const MAX_FRAMES: u32 = 60 * 120;

    pub fn run() {
        let seed = std::env::var("GOBLIN_ARENA_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(42);
        let mut game = Game::new(seed, Tuning::default(), Settings::default());

        // The goblin model never arrives, so it settles on the placeholder
        let mut loader = MemoryLoader::new().with_model(PLAYER_MODEL_PATH, 180.0);
        let mut scene = RecordingScene::new();

        let mut loading_frames = 0;
        while !game.assets_ready() {
            game.frame(DT, &mut loader, &mut scene);
            loading_frames += 1;
        }
        log::info!("Assets settled after {loading_frames} frames");

        game.start();
        let mut frames = 0;
        while frames < MAX_FRAMES && game.world.state.phase == GamePhase::Running {
            steer(&mut game);
            game.frame(DT, &mut loader, &mut scene);
            frames += 1;
        }

        log::info!(
            "Session over after {:.1}s: score {}, health {}, {} goblins left, phase {:?}",
            frames as f32 * DT,
            game.hud.score,
            game.hud.health,
            game.hud.goblins,
            game.world.state.phase
        );
        log::info!(
            "Scene saw {} frames, {} nodes live",
            scene.frames,
            scene.nodes.len()
        );
    }

    /// Walk toward the nearest goblin along its dominant axis and keep firing
    fn steer(game: &mut Game) {
        for key in [Key::W, Key::A, Key::S, Key::D] {
            game.key_up(key);
        }

        let player = game.world.player.pos;
        let nearest = game
            .world
            .registry
            .goblins()
            .map(|g| g.pos - player)
            .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()));

        let Some(offset) = nearest else {
            return;
        };
        let key = if offset.x.abs() > offset.z.abs() {
            if offset.x > 0.0 { Key::D } else { Key::A }
        } else if offset.z > 0.0 {
            Key::S
        } else {
            Key::W
        };
        game.key_down(key);
        game.key_down(Key::Space);
    }
}
