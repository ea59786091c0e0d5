//! Reference physics step
//!
//! Constant gravity plus explicit Euler integration for the single player
//! body. Hosts with a real physics engine skip this and write the player's
//! position and velocity back themselves.

use super::player::PlayerController;
use super::state::GameState;

/// Integrate one player body over `dt`. No-op until launched.
pub fn integrate(player: &mut PlayerController, gravity: f32, dt: f32) {
    if !player.is_launched() {
        return;
    }
    player.vel.y += gravity * dt;
    player.pos += player.vel * dt;
}

/// Advance the run's player body, frozen once the run has ended
pub fn step(state: &mut GameState, dt: f32) {
    if state.is_ended() {
        return;
    }
    integrate(&mut state.player, state.settings.gravity, dt);
}
