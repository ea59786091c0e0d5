//! Per-frame run update
//!
//! Runs after the physics step and contact dispatch for the frame: steering,
//! height scoring, culling, camera scroll and the end-of-run check, in that
//! order.

use super::state::{CameraOffsets, GameEvent, GameState, RunOutcome, RunState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tap: launches the player on the first one, ignored afterwards
    pub launch: bool,
}

/// Advance the run by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Frozen after game over
    if state.is_ended() {
        return;
    }

    if input.launch && state.player.launch(state.settings.launch_velocity) {
        state.run_state = RunState::Running;
        log::info!("Run started");
    }

    // Parked until the first tap
    if state.run_state != RunState::Running {
        return;
    }

    state.time_ticks += 1;

    let bias = state.bias.get();
    state.player.steer(bias, &state.settings);

    update_height_score(state);
    cull_entities(state);
    update_camera(state);
    check_run_end(state);
}

/// Award net upward progress: only new best heights score
fn update_height_score(state: &mut GameState) {
    let height = state.player.height();
    if height > state.player.max_height_reached {
        let gained = (height - state.player.max_height_reached) as u64;
        state.summary.score += gained;
        state.player.max_height_reached = height;
        state.push_hud_update();
    }
}

/// Mark entities that fell out of the window behind the player, then sweep
fn cull_entities(state: &mut GameState) {
    let player_y = state.player.pos.y;
    let cull_distance = state.cull_distance;

    let culled = state
        .entities
        .iter_mut()
        .map(|e| e.check_removal(player_y, cull_distance))
        .filter(|&removed| removed)
        .count();

    if !state.deferred_effects {
        state.finish_all_pending();
    }

    state.sweep_removed();

    if culled > 0 {
        log::trace!("Culled {} entities below {}", culled, player_y - cull_distance);
    }
}

/// Scroll the layers once the player is past the threshold
fn update_camera(state: &mut GameState) {
    if let Some(offsets) = CameraOffsets::for_height(state.player.pos.y) {
        state.camera = offsets;
    }
}

fn check_run_end(state: &mut GameState) {
    let player_y = state.player.pos.y;
    let best = state.player.max_height_reached as f32;

    let outcome = if player_y > state.summary.level_end_height {
        Some(RunOutcome::Completed)
    } else if player_y < best - state.summary.fallout_margin {
        Some(RunOutcome::FellOut)
    } else {
        None
    };

    if let Some(outcome) = outcome {
        end_run(state, outcome);
    }
}

/// One-shot transition to Ended
fn end_run(state: &mut GameState, outcome: RunOutcome) {
    if state.is_ended() {
        return;
    }
    state.run_state = RunState::Ended;
    state.summary.outcome = Some(outcome);
    log::info!(
        "Run ended ({:?}): score {}, stars {}, best height {}",
        outcome,
        state.summary.score,
        state.summary.stars_collected,
        state.player.max_height_reached
    );
    state.events.push(GameEvent::RunEnded {
        summary: state.summary.clone(),
    });
}
