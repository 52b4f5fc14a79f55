//! Game tuning surface.
//!
//! Every number that shapes play (radius, caps, odds, rewards, timings) lives
//! in [`GameTuning`]. Defaults match the live game; a RON file can override
//! any subset of fields.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::shared::GhostKind;

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("could not read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tuning file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid tuning value: {0}")]
    Invalid(String),
}

/// Per-kind ghost rewards and hold durations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostKindTuning {
    pub reward_points: u32,
    pub capture_duration_ms: u64,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    /// Real-world distance at which a target becomes interactable.
    pub capture_radius_m: f64,
    pub inventory_limit: usize,
    pub ecto1_unlock_count: u32,
    /// Reward (ECTO-1) position relative to the selected location, degrees.
    pub reward_offset_lat: f64,
    pub reward_offset_lon: f64,
    /// Max ghost displacement from the location center, per axis, degrees.
    pub ghost_jitter_deg: f64,
    pub strong_probability: f64,
    pub common: GhostKindTuning,
    pub strong: GhostKindTuning,
    pub points_per_level: u32,
    /// Payload printed on the physical containment unit's QR code.
    pub containment_unit_id: String,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            capture_radius_m: 15.0,
            inventory_limit: 5,
            ecto1_unlock_count: 5,
            reward_offset_lat: 0.0005,
            reward_offset_lon: -0.0005,
            ghost_jitter_deg: 0.0001,
            strong_probability: 0.25,
            common: GhostKindTuning {
                reward_points: 10,
                capture_duration_ms: 5000,
            },
            strong: GhostKindTuning {
                reward_points: 25,
                capture_duration_ms: 8000,
            },
            points_per_level: 100,
            containment_unit_id: String::from("GHOST-SQUAD-CONTAINMENT-UNIT-01"),
        }
    }
}

impl GameTuning {
    pub fn kind(&self, kind: GhostKind) -> GhostKindTuning {
        match kind {
            GhostKind::Common => self.common,
            GhostKind::Strong => self.strong,
        }
    }

    pub fn capture_duration(&self, kind: GhostKind) -> Duration {
        Duration::from_millis(self.kind(kind).capture_duration_ms)
    }

    pub fn from_ron(text: &str) -> Result<Self, TuningError> {
        let tuning: GameTuning = ron::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Rejects values that would make the game unplayable.
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.capture_radius_m > 0.0) {
            return Err(TuningError::Invalid(format!(
                "capture_radius_m must be positive, got {}",
                self.capture_radius_m
            )));
        }
        if self.inventory_limit == 0 {
            return Err(TuningError::Invalid("inventory_limit must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.strong_probability) {
            return Err(TuningError::Invalid(format!(
                "strong_probability must be within 0..=1, got {}",
                self.strong_probability
            )));
        }
        if self.common.capture_duration_ms == 0 || self.strong.capture_duration_ms == 0 {
            return Err(TuningError::Invalid("capture durations must be non-zero".into()));
        }
        if self.points_per_level == 0 {
            return Err(TuningError::Invalid("points_per_level must be at least 1".into()));
        }
        Ok(())
    }
}
