//! Sky Hop - A vertical-scrolling platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, contacts, level loading, run loop)
//! - `run`: Run driver wiring the simulation to HUD/persistence/presentation hooks
//! - `persistence`: High score and lifetime star storage
//! - `settings`: Data-driven gameplay tuning

pub mod persistence;
pub mod run;
pub mod settings;
pub mod sim;

pub use persistence::{JsonFileStore, Persistence, SaveData};
pub use run::{EffectPlayer, Hud, Presentation, RunLoop};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the display cadence)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Playfield width; the world wraps horizontally around it
    pub const WORLD_WIDTH: f32 = 320.0;
    /// Distance past either edge before the player re-enters on the other side
    pub const WRAP_MARGIN: f32 = 20.0;

    /// Player spawn point (horizontally centered, just above the bottom)
    pub const PLAYER_START_X: f32 = 160.0;
    pub const PLAYER_START_Y: f32 = 80.0;
    pub const PLAYER_RADIUS: f32 = 20.0;

    /// Gravity along y (pixels/s²), x is unaffected
    pub const GRAVITY: f32 = -300.0;
    /// Vertical velocity applied by the first tap
    pub const LAUNCH_VELOCITY: f32 = 400.0;
    /// Horizontal speed at full tilt
    pub const HORIZONTAL_SPEED: f32 = 400.0;
    /// Vertical velocity after bouncing off a platform
    pub const PLATFORM_BOUNCE_VELOCITY: f32 = 250.0;
    /// Vertical velocity after collecting a star
    pub const STAR_BOOST_VELOCITY: f32 = 400.0;

    /// Entity collision shapes for the reference contact detector
    pub const STAR_RADIUS: f32 = 14.0;
    pub const PLATFORM_HALF_WIDTH: f32 = 44.0;
    pub const PLATFORM_HALF_HEIGHT: f32 = 8.0;

    /// Entities this far below the player are culled
    pub const CULL_DISTANCE: f32 = 300.0;
    /// Falling this far below the best height ends the run
    pub const FALLOUT_MARGIN: f32 = 800.0;

    /// Height at which the layers start scrolling
    pub const SCROLL_THRESHOLD: f32 = 200.0;
    pub const BACKGROUND_PARALLAX: f32 = 0.1;
    pub const MIDGROUND_PARALLAX: f32 = 0.25;

    /// Weight of a fresh tilt sample in the smoothed horizontal bias
    pub const BIAS_SMOOTHING: f32 = 0.75;

    /// Star rewards (score, stars)
    pub const NORMAL_STAR_SCORE: u64 = 20;
    pub const NORMAL_STAR_COUNT: u32 = 1;
    pub const SPECIAL_STAR_SCORE: u64 = 100;
    pub const SPECIAL_STAR_COUNT: u32 = 5;
}

/// Wrap a horizontal coordinate around a cylindrical world.
///
/// Leaving past `-margin` re-enters at `width + margin` and vice versa, so the
/// jump happens while the body is fully off screen.
#[inline]
pub fn wrap_horizontal(x: f32, width: f32, margin: f32) -> f32 {
    if x < -margin {
        width + margin
    } else if x > width + margin {
        -margin
    } else {
        x
    }
}

/// Integer height used for scoring (heights are scored in whole units)
#[inline]
pub fn score_height(y: f32) -> i32 {
    y.floor() as i32
}
