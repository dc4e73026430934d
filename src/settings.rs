//! Visual settings and preferences
//!
//! Cosmetic only: nothing here changes how the simulation plays out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Effect density preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

/// A preset name the page sent that we do not know
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown quality preset `{0}`")]
pub struct UnknownPreset(pub String);

impl QualityPreset {
    /// Maximum live visual effects for this preset
    pub fn max_effects(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for QualityPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

/// Player-facing preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Hit bursts, flashes, embers
    pub effects: bool,

    // === HUD ===
    /// Goblin radar in the corner
    pub show_radar: bool,
    /// Start with the collider overlay on
    pub show_colliders: bool,

    // === Accessibility ===
    /// Reduced motion (no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            effects: true,
            show_radar: true,
            show_colliders: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Switch presets. Picking a preset turns effects back on at that
    /// density; reduced motion is left alone.
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.effects = true;
    }

    /// Effective effect budget (respects the effects toggle and reduced motion)
    pub fn max_effects(&self) -> usize {
        if !self.effects || self.reduced_motion {
            0
        } else {
            self.quality.max_effects()
        }
    }

    /// Parse settings handed over by the page; falls back to defaults
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings ({e}), using defaults");
                Self::default()
            }
        }
    }
}
