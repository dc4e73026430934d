//! Collaborator seams
//!
//! Everything the simulation talks to but does not own:
//! - Keyboard input
//! - Model loading (with timeout and placeholder fallback)
//! - The scene graph / renderer

pub mod assets;
pub mod input;
pub mod scene;

pub use assets::{AssetError, AssetLoader, AssetManager, MemoryLoader, ModelInfo, ResolvedModel};
pub use input::{InputState, Key};
pub use scene::{FrameView, RecordingScene, SceneBackend, SceneNode, sync_scene};
