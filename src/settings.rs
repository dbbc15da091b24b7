//! Engine tuning and preferences
//!
//! Loaded from JSON; any missing field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How a ball with several goals satisfies the win check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalPolicy {
    /// Only the first listed goal counts
    #[default]
    Primary,
    /// Any listed goal counts
    AnyOf,
}

impl GoalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPolicy::Primary => "primary",
            GoalPolicy::AnyOf => "any_of",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "primary" | "first" => Some(GoalPolicy::Primary),
            "any_of" | "any" => Some(GoalPolicy::AnyOf),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("setting `{name}` out of range: {value}")]
    OutOfRange { name: &'static str, value: f32 },
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pixel size of one grid cell
    pub grid_size: f32,

    // === Drag thresholds (multiples of grid_size) ===
    pub dead_zone_factor: f32,
    pub hysteresis_factor: f32,
    pub pick_radius_factor: f32,

    // === Animation durations (seconds) ===
    pub step_duration: f32,
    pub snap_duration: f32,
    pub collapse_duration: f32,
    pub blocked_duration: f32,
    pub flip_duration: f32,
    /// Fraction of `flip_duration` at which the visible face swaps
    pub flip_swap_fraction: f32,

    // === Rules ===
    pub goal_policy: GoalPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,

            dead_zone_factor: DEAD_ZONE_FACTOR,
            hysteresis_factor: HYSTERESIS_FACTOR,
            pick_radius_factor: PICK_RADIUS_FACTOR,

            step_duration: STEP_DURATION,
            snap_duration: SNAP_DURATION,
            collapse_duration: COLLAPSE_DURATION,
            blocked_duration: BLOCKED_DURATION,
            flip_duration: FLIP_DURATION,
            flip_swap_fraction: FLIP_SWAP_FRACTION,

            goal_policy: GoalPolicy::Primary,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(SettingsError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::info!("Using default settings ({err})");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Reject values the drag and flip logic cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("grid_size", self.grid_size),
            ("dead_zone_factor", self.dead_zone_factor),
            ("hysteresis_factor", self.hysteresis_factor),
            ("pick_radius_factor", self.pick_radius_factor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::OutOfRange { name, value });
            }
        }

        let durations = [
            ("step_duration", self.step_duration),
            ("snap_duration", self.snap_duration),
            ("collapse_duration", self.collapse_duration),
            ("blocked_duration", self.blocked_duration),
            ("flip_duration", self.flip_duration),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SettingsError::OutOfRange { name, value });
            }
        }

        if self.hysteresis_factor < self.dead_zone_factor {
            return Err(SettingsError::OutOfRange {
                name: "hysteresis_factor",
                value: self.hysteresis_factor,
            });
        }
        if !(0.0..=1.0).contains(&self.flip_swap_fraction) {
            return Err(SettingsError::OutOfRange {
                name: "flip_swap_fraction",
                value: self.flip_swap_fraction,
            });
        }
        Ok(())
    }

    /// Pointer distance that pins the ball to its settled node
    pub fn dead_zone(&self) -> f32 {
        self.grid_size * self.dead_zone_factor
    }

    /// Pointer distance beyond which a step is attempted
    pub fn hysteresis(&self) -> f32 {
        self.grid_size * self.hysteresis_factor
    }

    /// Pointer-down pick radius
    pub fn pick_radius(&self) -> f32 {
        self.grid_size * self.pick_radius_factor
    }
}
