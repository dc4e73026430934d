//! Model loading
//!
//! The page owns the actual loader; we only ask for a model, poll it once
//! per frame and decide how big it is and where it rests. A model that
//! fails or takes longer than [`ASSET_TIMEOUT_SECS`] is replaced by the
//! placeholder shape for the rest of the session.

use std::collections::HashMap;
use std::task::Poll;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::consts::*;
use crate::sim::EntityKind;

pub const PLAYER_MODEL_PATH: &str = "./wizard.glb";
pub const GOBLIN_MODEL_PATH: &str = "./goblin.glb";

/// Reasons a model ends up as a placeholder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("{path} still pending after {secs}s")]
    Timeout { path: String, secs: f32 },
}

/// What the loader reports about a model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInfo {
    /// Height of the unscaled bounding box
    pub height: f32,
}

/// Non-blocking model loader provided by the host
pub trait AssetLoader {
    /// Start loading `path`; repeated requests are harmless
    fn request(&mut self, path: &str);

    /// Check on a requested model
    fn poll(&mut self, path: &str) -> Poll<Result<ModelInfo, AssetError>>;
}

/// Uniform scale that brings `model_height` to `target`, or `fallback` when
/// the bounds make that meaningless
pub fn fit_scale(target: f32, model_height: f32, fallback: f32) -> f32 {
    let scale = target / model_height;
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        fallback
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelSource {
    Loaded,
    Placeholder,
}

/// Final sizing of a model kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedModel {
    pub kind: EntityKind,
    pub source: ModelSource,
    pub scale: f32,
    /// Height of the model's center above the ground
    pub rest_height: f32,
}

impl ResolvedModel {
    pub fn placeholder(kind: EntityKind) -> Self {
        Self {
            kind,
            source: ModelSource::Placeholder,
            scale: 1.0,
            rest_height: placeholder_rest(kind),
        }
    }

    pub fn loaded(kind: EntityKind, info: ModelInfo) -> Self {
        let (target, fallback) = match kind {
            EntityKind::Goblin => (GOBLIN_MODEL_HEIGHT, GOBLIN_FALLBACK_SCALE),
            _ => (PLAYER_MODEL_HEIGHT, PLAYER_FALLBACK_SCALE),
        };
        let scale = fit_scale(target, info.height, fallback);
        let rest = info.height * scale / 2.0;
        Self {
            kind,
            source: ModelSource::Loaded,
            scale,
            rest_height: if rest.is_finite() && rest > 0.0 {
                rest
            } else {
                placeholder_rest(kind)
            },
        }
    }
}

fn placeholder_rest(kind: EntityKind) -> f32 {
    match kind {
        EntityKind::Goblin => GOBLIN_PLACEHOLDER_REST,
        _ => PLAYER_PLACEHOLDER_REST,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SlotState {
    Idle,
    Pending { waited: f32 },
    Settled(ResolvedModel),
}

#[derive(Debug, Clone)]
struct ModelSlot {
    kind: EntityKind,
    path: String,
    state: SlotState,
}

impl ModelSlot {
    fn new(kind: EntityKind, path: &str) -> Self {
        Self {
            kind,
            path: path.to_string(),
            state: SlotState::Idle,
        }
    }

    /// Advance the slot; returns the model the frame it settles
    fn update(&mut self, loader: &mut dyn AssetLoader, dt: f32) -> Option<ResolvedModel> {
        let waited = match self.state {
            SlotState::Settled(_) => return None,
            SlotState::Idle => {
                loader.request(&self.path);
                0.0
            }
            SlotState::Pending { waited } => waited + dt,
        };

        let outcome = match loader.poll(&self.path) {
            Poll::Ready(result) => Some(result),
            Poll::Pending if waited >= ASSET_TIMEOUT_SECS => Some(Err(AssetError::Timeout {
                path: self.path.clone(),
                secs: ASSET_TIMEOUT_SECS,
            })),
            Poll::Pending => None,
        };

        let Some(outcome) = outcome else {
            self.state = SlotState::Pending { waited };
            return None;
        };

        let model = match outcome {
            Ok(info) => {
                let model = ResolvedModel::loaded(self.kind, info);
                info!(
                    "{} loaded (scale {:.3}, rest {:.2})",
                    self.path, model.scale, model.rest_height
                );
                model
            }
            Err(e) => {
                warn!("{e}; using placeholder for {:?}", self.kind);
                ResolvedModel::placeholder(self.kind)
            }
        };
        self.state = SlotState::Settled(model);
        Some(model)
    }
}

/// Tracks the player and goblin models until both have settled
#[derive(Debug, Clone)]
pub struct AssetManager {
    slots: [ModelSlot; 2],
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new(PLAYER_MODEL_PATH, GOBLIN_MODEL_PATH)
    }
}

impl AssetManager {
    pub fn new(player_path: &str, goblin_path: &str) -> Self {
        Self {
            slots: [
                ModelSlot::new(EntityKind::Player, player_path),
                ModelSlot::new(EntityKind::Goblin, goblin_path),
            ],
        }
    }

    /// Poll outstanding models; returns those that settled this frame
    pub fn update(&mut self, loader: &mut dyn AssetLoader, dt: f32) -> Vec<ResolvedModel> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.update(loader, dt))
            .collect()
    }

    pub fn all_settled(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| matches!(slot.state, SlotState::Settled(_)))
    }

    /// Settled model for a kind, if any
    pub fn model(&self, kind: EntityKind) -> Option<ResolvedModel> {
        self.slots.iter().find_map(|slot| match slot.state {
            SlotState::Settled(model) if slot.kind == kind => Some(model),
            _ => None,
        })
    }
}

/// Loader backed by a table of results filled in by the host (or a test).
/// Paths with no entry stay pending.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    models: HashMap<String, Result<ModelInfo, AssetError>>,
    requested: Vec<String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, path: &str, height: f32) -> Self {
        self.finish(path, height);
        self
    }

    pub fn with_failure(mut self, path: &str, reason: &str) -> Self {
        self.fail(path, reason);
        self
    }

    /// The host finished loading `path`
    pub fn finish(&mut self, path: &str, height: f32) {
        self.models.insert(path.to_string(), Ok(ModelInfo { height }));
    }

    /// The host gave up on `path`
    pub fn fail(&mut self, path: &str, reason: &str) {
        self.models.insert(
            path.to_string(),
            Err(AssetError::Load {
                path: path.to_string(),
                reason: reason.to_string(),
            }),
        );
    }

    /// Requested paths with no result yet
    pub fn outstanding(&self) -> impl Iterator<Item = &str> {
        self.requested
            .iter()
            .filter(|p| !self.models.contains_key(p.as_str()))
            .map(String::as_str)
    }

    pub fn requested(&self) -> &[String] {
        &self.requested
    }
}

impl AssetLoader for MemoryLoader {
    fn request(&mut self, path: &str) {
        if !self.requested.iter().any(|p| p == path) {
            self.requested.push(path.to_string());
        }
    }

    fn poll(&mut self, path: &str) -> Poll<Result<ModelInfo, AssetError>> {
        if !self.requested.iter().any(|p| p == path) {
            return Poll::Pending;
        }
        match self.models.get(path) {
            Some(result) => Poll::Ready(result.clone()),
            None => Poll::Pending,
        }
    }
}
