//! Run state and core simulation types
//!
//! Everything one run owns: the player, the live entity window, the score
//! counters and camera offsets, plus the events recorded for the host.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Effect, Entity, EntityId, Removal};
use super::level::Level;
use super::player::{HorizontalBias, PlayerController};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Player parked at the spawn point, waiting for the first tap
    Idle,
    /// Active gameplay
    Running,
    /// Run over; the simulation is frozen
    Ended,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Climbed past the level end height
    Completed,
    /// Fell too far below the best height
    FellOut,
}

/// Counters and limits for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub stars_collected: u32,
    pub level_end_height: f32,
    pub fallout_margin: f32,
    /// Set when the run ends
    pub outcome: Option<RunOutcome>,
}

impl RunSummary {
    pub fn new(level_end_height: f32, fallout_margin: f32) -> Self {
        Self {
            score: 0,
            stars_collected: 0,
            level_end_height,
            fallout_margin,
            outcome: None,
        }
    }
}

/// Vertical displacement of each scrolling layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraOffsets {
    /// Distant scenery, 1/10 speed
    pub background: f32,
    /// Branches, 1/4 speed
    pub midground: f32,
    /// Gameplay layer, full speed
    pub foreground: f32,
}

impl CameraOffsets {
    /// Offsets for a player at height `player_y`, or None below the threshold
    pub fn for_height(player_y: f32) -> Option<Self> {
        if player_y <= SCROLL_THRESHOLD {
            return None;
        }
        let delta = player_y - SCROLL_THRESHOLD;
        Some(Self {
            background: -delta * BACKGROUND_PARALLAX,
            midground: -delta * MIDGROUND_PARALLAX,
            foreground: -delta,
        })
    }
}

/// Things the host must react to, drained after each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score or star count changed
    HudChanged { score: u64, stars: u32 },
    /// Play an effect; the entity finishes removal when it completes
    EffectRequested { entity: EntityId, effect: Effect },
    /// The run just ended (recorded exactly once)
    RunEnded { summary: RunSummary },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub run_state: RunState,
    pub player: PlayerController,
    /// Live entity window (sorted by id for determinism and lookup)
    pub entities: Vec<Entity>,
    pub summary: RunSummary,
    pub camera: CameraOffsets,
    pub settings: Settings,
    pub cull_distance: f32,
    /// One past the highest entity id the level issued
    pub entity_id_limit: u32,
    /// Shared with the tilt sensor
    pub bias: HorizontalBias,
    /// When false, stars waiting on an effect are removed at the end of the tick
    pub deferred_effects: bool,
    /// Simulation tick counter (Running ticks only)
    pub time_ticks: u64,
    /// Events not yet handed to the host
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a run on an expanded level
    pub fn new(level: Level, settings: Settings) -> Self {
        let mut entities = level.entities;
        entities.sort_by_key(|e| e.id());
        let entity_id_limit = entities
            .last()
            .map_or(EntityId::PLAYER.0 + 1, |e| e.id().0 + 1);

        Self {
            run_state: RunState::Idle,
            player: PlayerController::new(
                EntityId::PLAYER,
                Vec2::new(settings.world_width / 2.0, PLAYER_START_Y),
            ),
            entities,
            summary: RunSummary::new(level.end_y, level.fallout_margin),
            camera: CameraOffsets::default(),
            settings,
            cull_distance: level.cull_distance,
            entity_id_limit,
            bias: HorizontalBias::new(),
            deferred_effects: false,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.run_state == RunState::Ended
    }

    /// Whether `id` names a level entity, live or already removed
    #[inline]
    pub fn issued_entity(&self, id: EntityId) -> bool {
        id != EntityId::PLAYER && id.0 < self.entity_id_limit
    }

    /// Look up a live (not yet swept) entity by id
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id())
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id())
            .ok()
            .map(|i| &mut self.entities[i])
    }

    /// Drop every entity marked removed
    pub fn sweep_removed(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.removal() != Removal::Removed);
        before - self.entities.len()
    }

    /// Complete all deferred removals at once
    pub fn finish_all_pending(&mut self) -> usize {
        self.entities
            .iter_mut()
            .map(|e| e.finish_pending_removal())
            .filter(|&finished| finished)
            .count()
    }

    /// The effect for `id` completed: finish its removal.
    ///
    /// Late signals for entities already culled are ignored.
    pub fn effect_finished(&mut self, id: EntityId) -> bool {
        let finished = self
            .entity_mut(id)
            .is_some_and(|e| e.finish_pending_removal());
        if finished {
            self.sweep_removed();
        }
        finished
    }

    pub fn push_hud_update(&mut self) {
        self.events.push(GameEvent::HudChanged {
            score: self.summary.score,
            stars: self.summary.stars_collected,
        });
    }

    /// Take all recorded events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
