//! Gameplay tuning
//!
//! Physics and movement constants, loadable from JSON so a level pack can ship
//! its own feel. Missing fields fall back to the defaults in `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable gameplay values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    /// Playfield width used for horizontal wrapping
    pub world_width: f32,
    /// Off-screen distance before wrapping
    pub wrap_margin: f32,

    // === Player physics ===
    /// Gravity along y (negative is down)
    pub gravity: f32,
    /// Vertical velocity applied on launch
    pub launch_velocity: f32,
    /// Horizontal speed at full tilt
    pub horizontal_speed: f32,

    // === Contact responses ===
    /// Vertical velocity after a platform bounce
    pub bounce_velocity: f32,
    /// Vertical velocity after collecting a star
    pub star_boost_velocity: f32,

    // === Input ===
    /// Weight of the newest tilt sample (0.0 - 1.0)
    pub bias_smoothing: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            wrap_margin: WRAP_MARGIN,

            gravity: GRAVITY,
            launch_velocity: LAUNCH_VELOCITY,
            horizontal_speed: HORIZONTAL_SPEED,

            bounce_velocity: PLATFORM_BOUNCE_VELOCITY,
            star_boost_velocity: STAR_BOOST_VELOCITY,

            bias_smoothing: BIAS_SMOOTHING,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
