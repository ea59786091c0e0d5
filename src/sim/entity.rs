//! Level entities: stars and platforms
//!
//! Every entity carries a `GameObject` header (identity, position, removal
//! lifecycle). Contact responses only *mark* removal; the owning collection is
//! swept afterwards so iteration is never invalidated.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::{BodyMasks, CollisionCategory};
use super::player::PlayerController;
use super::state::RunSummary;
use crate::consts::*;
use crate::settings::Settings;

/// Stable entity identity (also the physics body handle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The player body always uses id 0; level entities start at 1.
    pub const PLAYER: Self = Self(0);
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Removal lifecycle of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Removal {
    #[default]
    Live,
    /// Responded to its contact, waiting on an effect before leaving
    Pending,
    /// Marked for the next sweep
    Removed,
}

/// Shared entity header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    pub id: EntityId,
    pub pos: Vec2,
    pub removal: Removal,
}

impl GameObject {
    pub fn new(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            removal: Removal::Live,
        }
    }

    /// Cull if the player is more than `cull_distance` above this object.
    ///
    /// Returns true when this call marked the object removed.
    pub fn check_removal(&mut self, player_y: f32, cull_distance: f32) -> bool {
        if self.removal != Removal::Removed && player_y - self.pos.y > cull_distance {
            self.removal = Removal::Removed;
            return true;
        }
        false
    }
}

/// Star types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarKind {
    Normal,
    Special,
}

impl StarKind {
    /// Level-data discriminant: 0 = Normal, 1 = Special
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StarKind::Normal),
            1 => Some(StarKind::Special),
            _ => None,
        }
    }

    pub fn score_delta(self) -> u64 {
        match self {
            StarKind::Normal => NORMAL_STAR_SCORE,
            StarKind::Special => SPECIAL_STAR_SCORE,
        }
    }

    pub fn star_delta(self) -> u32 {
        match self {
            StarKind::Normal => NORMAL_STAR_COUNT,
            StarKind::Special => SPECIAL_STAR_COUNT,
        }
    }
}

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Normal,
    /// Crumbles after one bounce
    Break,
}

impl PlatformKind {
    /// Level-data discriminant: 0 = Normal, 1 = Break
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PlatformKind::Normal),
            1 => Some(PlatformKind::Break),
            _ => None,
        }
    }
}

/// A collectible star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarEntity {
    pub object: GameObject,
    pub kind: StarKind,
}

/// A platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntity {
    pub object: GameObject,
    pub kind: PlatformKind,
}

/// Side effect an entity asks the host to play before it finishes removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Star pickup chime
    StarPing,
}

/// Result of a contact response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactOutcome {
    /// Score or star count changed; the HUD needs a refresh
    pub scoring_changed: bool,
    /// Effect whose completion finishes a deferred removal
    pub effect: Option<Effect>,
}

impl ContactOutcome {
    pub const NONE: Self = Self {
        scoring_changed: false,
        effect: None,
    };
}

/// Any non-player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entity {
    Star(StarEntity),
    Platform(PlatformEntity),
}

impl Entity {
    pub fn star(id: EntityId, pos: Vec2, kind: StarKind) -> Self {
        Entity::Star(StarEntity {
            object: GameObject::new(id, pos),
            kind,
        })
    }

    pub fn platform(id: EntityId, pos: Vec2, kind: PlatformKind) -> Self {
        Entity::Platform(PlatformEntity {
            object: GameObject::new(id, pos),
            kind,
        })
    }

    pub fn object(&self) -> &GameObject {
        match self {
            Entity::Star(s) => &s.object,
            Entity::Platform(p) => &p.object,
        }
    }

    pub fn object_mut(&mut self) -> &mut GameObject {
        match self {
            Entity::Star(s) => &mut s.object,
            Entity::Platform(p) => &mut p.object,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.object().id
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.object().pos
    }

    #[inline]
    pub fn removal(&self) -> Removal {
        self.object().removal
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.removal() == Removal::Live
    }

    pub fn category(&self) -> CollisionCategory {
        match self {
            Entity::Star(_) => CollisionCategory::STAR,
            Entity::Platform(_) => CollisionCategory::PLATFORM,
        }
    }

    pub fn masks(&self) -> BodyMasks {
        BodyMasks::entity(self.category())
    }

    /// Per-frame culling check
    pub fn check_removal(&mut self, player_y: f32, cull_distance: f32) -> bool {
        self.object_mut().check_removal(player_y, cull_distance)
    }

    /// React to the player touching this entity.
    ///
    /// Mutates the run counters and the player's velocity directly. An entity
    /// that is already on its way out does nothing, which keeps star rewards
    /// exactly-once even if the physics layer keeps reporting the overlap.
    pub fn respond_to_player_contact(
        &mut self,
        player: &mut PlayerController,
        summary: &mut RunSummary,
        settings: &Settings,
    ) -> ContactOutcome {
        if !self.is_live() {
            return ContactOutcome::NONE;
        }

        match self {
            Entity::Star(star) => {
                summary.score += star.kind.score_delta();
                summary.stars_collected += star.kind.star_delta();
                player.vel.y = settings.star_boost_velocity;
                star.object.removal = Removal::Pending;
                ContactOutcome {
                    scoring_changed: true,
                    effect: Some(Effect::StarPing),
                }
            }
            Entity::Platform(platform) => {
                // Only bounce when coming down onto it
                if player.is_falling() {
                    player.vel.y = settings.bounce_velocity;
                    if platform.kind == PlatformKind::Break {
                        platform.object.removal = Removal::Removed;
                    }
                }
                ContactOutcome::NONE
            }
        }
    }

    /// Finish a deferred removal once its effect has played
    pub fn finish_pending_removal(&mut self) -> bool {
        let object = self.object_mut();
        if object.removal == Removal::Pending {
            object.removal = Removal::Removed;
            return true;
        }
        false
    }
}
