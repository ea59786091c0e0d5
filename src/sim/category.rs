//! Collision categories and contact masks
//!
//! The player never physically collides with anything: every interaction is a
//! reported contact that gameplay code resolves. Categories are disjoint bits so
//! they can be OR'd into "interested in" masks.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Category bit of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionCategory(pub u32);

impl CollisionCategory {
    /// No category, an empty mask.
    pub const NONE: Self = Self(0);

    /// The player body.
    pub const PLAYER: Self = Self(1 << 0);

    /// Collectible stars.
    pub const STAR: Self = Self(1 << 1);

    /// Platforms the player bounces off.
    pub const PLATFORM: Self = Self(1 << 2);

    /// Check if these bits contain all of `other`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any bit of `other` is set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CollisionCategory {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Category and mask configuration handed to the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyMasks {
    /// What this body is
    pub category: CollisionCategory,
    /// Categories that physically block this body
    pub collision: CollisionCategory,
    /// Categories whose overlaps are reported as contacts
    pub contact_test: CollisionCategory,
}

impl BodyMasks {
    /// The player: collides with nothing, reports stars and platforms.
    pub const fn player() -> Self {
        Self {
            category: CollisionCategory::PLAYER,
            collision: CollisionCategory::NONE,
            contact_test: CollisionCategory(
                CollisionCategory::STAR.0 | CollisionCategory::PLATFORM.0,
            ),
        }
    }

    /// A static, non-player entity of the given category.
    ///
    /// Entities report nothing themselves; the player's mask drives contacts.
    pub const fn entity(category: CollisionCategory) -> Self {
        Self {
            category,
            collision: CollisionCategory::NONE,
            contact_test: CollisionCategory::NONE,
        }
    }

    /// Whether a contact between bodies `self` and `other` would be reported.
    pub fn reports_contact_with(&self, other: &BodyMasks) -> bool {
        self.contact_test.intersects(other.category) || other.contact_test.intersects(self.category)
    }

    /// Player configs must never list the player in their blocking mask.
    pub fn is_valid_player_config(&self) -> bool {
        self.category == CollisionCategory::PLAYER
            && !self.collision.intersects(CollisionCategory::PLAYER)
    }
}
