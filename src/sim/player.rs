//! Player body and launch state
//!
//! The player sits fixed at its spawn point until the first tap, then is
//! steered horizontally by the smoothed tilt bias while gravity and contacts
//! drive its vertical motion.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::BodyMasks;
use super::entity::EntityId;
use crate::consts::*;
use crate::settings::Settings;
use crate::{score_height, wrap_horizontal};

/// Launch state of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchState {
    /// Waiting for the first tap, physics suppressed
    NotLaunched,
    /// In flight
    Launched,
}

/// Smoothed horizontal steering input shared with the sensor callback.
///
/// Stored as `f32` bits in an atomic so the sampling side can write from its
/// own thread. Only the latest value matters, so relaxed ordering is enough and
/// a lost update is harmless.
#[derive(Debug, Clone, Default)]
pub struct HorizontalBias(Arc<AtomicU32>);

impl HorizontalBias {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest smoothed value
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the value (tests, scripted input)
    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Fold a raw tilt sample in: `new = w*sample + (1-w)*old`
    pub fn sample(&self, raw: f32, weight: f32) {
        let old = self.get();
        self.set(raw * weight + old * (1.0 - weight));
    }
}

/// The player body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerController {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub launch: LaunchState,
    /// Best integer height reached this run
    pub max_height_reached: i32,
    pub masks: BodyMasks,
}

impl PlayerController {
    pub fn new(id: EntityId, start: Vec2) -> Self {
        let masks = BodyMasks::player();
        debug_assert!(
            masks.is_valid_player_config(),
            "player body must not collide with itself"
        );
        Self {
            id,
            pos: start,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            launch: LaunchState::NotLaunched,
            max_height_reached: score_height(start.y),
            masks,
        }
    }

    #[inline]
    pub fn is_launched(&self) -> bool {
        self.launch == LaunchState::Launched
    }

    /// Launch the player on first tap.
    ///
    /// Returns false (and changes nothing) if already launched.
    pub fn launch(&mut self, launch_velocity: f32) -> bool {
        if self.is_launched() {
            return false;
        }
        self.launch = LaunchState::Launched;
        self.vel.y = launch_velocity;
        true
    }

    /// Current scoring height
    #[inline]
    pub fn height(&self) -> i32 {
        score_height(self.pos.y)
    }

    /// True while the player is moving down
    #[inline]
    pub fn is_falling(&self) -> bool {
        self.vel.y < 0.0
    }

    /// Apply tilt steering and horizontal wrap (run after the physics step)
    pub fn steer(&mut self, bias: f32, settings: &Settings) {
        if !self.is_launched() {
            return;
        }
        self.vel.x = bias * settings.horizontal_speed;
        self.pos.x = wrap_horizontal(self.pos.x, settings.world_width, settings.wrap_margin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::category::CollisionCategory;

    fn player() -> PlayerController {
        PlayerController::new(EntityId::PLAYER, Vec2::new(PLAYER_START_X, PLAYER_START_Y))
    }

    #[test]
    fn test_new_player_masks() {
        let p = player();
        assert!(p.masks.is_valid_player_config());
        assert!(p.masks.reports_contact_with(&BodyMasks::entity(CollisionCategory::STAR)));
        assert!(p.masks.reports_contact_with(&BodyMasks::entity(CollisionCategory::PLATFORM)));
    }

    #[test]
    fn test_launch_once() {
        let mut p = player();
        assert!(!p.is_launched());
        assert!(p.launch(LAUNCH_VELOCITY));
        assert_eq!(p.vel.y, LAUNCH_VELOCITY);

        // Second tap mid-flight is ignored
        p.vel.y = -50.0;
        assert!(!p.launch(LAUNCH_VELOCITY));
        assert_eq!(p.vel.y, -50.0);
    }

    #[test]
    fn test_steer_ignored_before_launch() {
        let mut p = player();
        p.steer(1.0, &Settings::default());
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_steer_and_wrap() {
        let settings = Settings::default();
        let mut p = player();
        p.launch(LAUNCH_VELOCITY);
        p.steer(0.5, &settings);
        assert_eq!(p.vel.x, 0.5 * settings.horizontal_speed);

        p.pos.x = settings.world_width + settings.wrap_margin + 1.0;
        p.steer(0.5, &settings);
        assert_eq!(p.pos.x, -settings.wrap_margin);

        p.pos.x = -settings.wrap_margin - 1.0;
        p.steer(-0.5, &settings);
        assert_eq!(p.pos.x, settings.world_width + settings.wrap_margin);
    }

    #[test]
    fn test_bias_smoothing() {
        let bias = HorizontalBias::new();
        bias.sample(1.0, 0.75);
        assert!((bias.get() - 0.75).abs() < 1e-6);
        bias.sample(0.0, 0.75);
        assert!((bias.get() - 0.1875).abs() < 1e-6);
    }

    #[test]
    fn test_bias_shared_across_clones() {
        let sensor_side = HorizontalBias::new();
        let sim_side = sensor_side.clone();
        let handle = std::thread::spawn(move || sensor_side.set(-0.4));
        handle.join().unwrap();
        assert_eq!(sim_side.get(), -0.4);
    }
}
