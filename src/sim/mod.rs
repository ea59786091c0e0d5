//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - Removals are marked, then swept; never mid-iteration
//! - No rendering, audio or platform dependencies

pub mod category;
pub mod collision;
pub mod contact;
pub mod entity;
pub mod level;
pub mod physics;
pub mod player;
pub mod state;
pub mod tick;

pub use category::{BodyMasks, CollisionCategory};
pub use collision::{CollisionResult, detect_contacts};
pub use contact::{ContactError, ContactEvent, dispatch_contact, other_endpoint};
pub use entity::{
    ContactOutcome, Effect, Entity, EntityId, GameObject, PlatformEntity, PlatformKind, Removal,
    StarEntity, StarKind,
};
pub use level::{Level, LevelData, LevelError, load_level};
pub use player::{HorizontalBias, LaunchState, PlayerController};
pub use state::{CameraOffsets, GameEvent, GameState, RunOutcome, RunState, RunSummary};
pub use tick::{TickInput, tick};
