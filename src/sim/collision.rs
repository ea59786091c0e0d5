//! Reference contact detection
//!
//! A stand-in for the physics engine's broad phase: the player is a circle,
//! stars are circles and platforms are axis-aligned boxes. Only overlaps are
//! reported; nothing is pushed apart, since the player never physically
//! collides with anything.

use glam::Vec2;

use super::contact::ContactEvent;
use super::entity::Entity;
use super::state::GameState;
use crate::consts::*;

/// Result of an overlap check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Overlap depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            penetration: 0.0,
        }
    }
}

/// Overlap between two circles
pub fn circle_circle_collision(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> CollisionResult {
    let dist = (a - b).length();
    let reach = a_radius + b_radius;
    if dist < reach {
        return CollisionResult {
            hit: true,
            penetration: reach - dist,
        };
    }
    CollisionResult::miss()
}

/// Overlap between a circle and an axis-aligned box given by center and half extents
pub fn circle_box_collision(
    center: Vec2,
    radius: f32,
    box_center: Vec2,
    half_extents: Vec2,
) -> CollisionResult {
    let min = box_center - half_extents;
    let max = box_center + half_extents;
    let closest = center.clamp(min, max);
    let dist = (center - closest).length();

    if dist < radius {
        return CollisionResult {
            hit: true,
            penetration: radius - dist,
        };
    }
    CollisionResult::miss()
}

/// Check the player against one entity's shape
pub fn player_entity_collision(player_pos: Vec2, player_radius: f32, entity: &Entity) -> CollisionResult {
    match entity {
        Entity::Star(star) => {
            circle_circle_collision(player_pos, player_radius, star.object.pos, STAR_RADIUS)
        }
        Entity::Platform(platform) => circle_box_collision(
            player_pos,
            player_radius,
            platform.object.pos,
            Vec2::new(PLATFORM_HALF_WIDTH, PLATFORM_HALF_HEIGHT),
        ),
    }
}

/// Report contacts between the player and every live entity it overlaps.
///
/// Entities are checked in id order; only pairs the masks ask about are
/// reported.
pub fn detect_contacts(state: &GameState) -> Vec<ContactEvent> {
    let player = &state.player;
    state
        .entities
        .iter()
        .filter(|e| e.is_live() && player.masks.reports_contact_with(&e.masks()))
        .filter_map(|e| {
            let result = player_entity_collision(player.pos, player.radius, e);
            if !result.hit {
                return None;
            }
            log::trace!("Player overlaps {} by {:.2}", e.id(), result.penetration);
            Some(ContactEvent::new(player.id, e.id()))
        })
        .collect()
}
