//! Contact dispatch
//!
//! The physics layer reports overlaps as an unordered pair of bodies. Which
//! side holds the player is not guaranteed, so the non-player side is always
//! found by identity before its response runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{ContactOutcome, EntityId};
use super::state::{GameEvent, GameState, RunState};

/// A reported overlap between two bodies (order unspecified)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub a: EntityId,
    pub b: EntityId,
}

impl ContactEvent {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        Self { a, b }
    }
}

/// A contact that cannot come from a correctly configured physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactError {
    /// Neither endpoint is the player
    NoPlayerEndpoint { a: EntityId, b: EntityId },
    /// Both endpoints are the player
    PlayerWithItself,
    /// The non-player endpoint was never issued by the level loader
    UnknownEntity(EntityId),
}

impl fmt::Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPlayerEndpoint { a, b } => {
                write!(f, "contact between {a} and {b} does not involve the player")
            }
            Self::PlayerWithItself => write!(f, "contact reports the player with itself"),
            Self::UnknownEntity(id) => write!(f, "contact names unknown entity {id}"),
        }
    }
}

impl std::error::Error for ContactError {}

/// Pick the endpoint that is not the player
pub fn other_endpoint(event: ContactEvent, player: EntityId) -> Result<EntityId, ContactError> {
    match (event.a == player, event.b == player) {
        (true, false) => Ok(event.b),
        (false, true) => Ok(event.a),
        (true, true) => Err(ContactError::PlayerWithItself),
        (false, false) => Err(ContactError::NoPlayerEndpoint {
            a: event.a,
            b: event.b,
        }),
    }
}

/// Resolve one contact against the run.
///
/// Records a HUD event when scoring changed and an effect request when the
/// entity defers its removal. Contacts arriving while the run is not
/// running, or for entities already gone, are ignored.
pub fn dispatch_contact(
    state: &mut GameState,
    event: ContactEvent,
) -> Result<ContactOutcome, ContactError> {
    let other = other_endpoint(event, state.player.id).inspect_err(|e| {
        log::error!("Contact invariant violated: {e}");
    })?;

    if !state.issued_entity(other) {
        let err = ContactError::UnknownEntity(other);
        log::error!("Contact invariant violated: {err}");
        return Err(err);
    }

    // Parked before the first tap, frozen after game over
    if state.run_state != RunState::Running {
        return Ok(ContactOutcome::NONE);
    }

    let GameState {
        entities,
        player,
        summary,
        settings,
        ..
    } = &mut *state;

    let Ok(index) = entities.binary_search_by_key(&other, |e| e.id()) else {
        log::trace!("Late contact with removed entity {other}");
        return Ok(ContactOutcome::NONE);
    };

    let outcome = entities[index].respond_to_player_contact(player, summary, settings);
    log::debug!("Contact with {other}: {outcome:?}");

    if outcome.scoring_changed {
        state.push_hud_update();
    }
    if let Some(effect) = outcome.effect {
        state.events.push(GameEvent::EffectRequested {
            entity: other,
            effect,
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Settings;
    use crate::sim::entity::{Entity, PlatformKind, Removal, StarKind};
    use crate::sim::level::Level;
    use glam::Vec2;

    fn state() -> GameState {
        let mut state = GameState::new(
            Level {
                entities: vec![
                    Entity::platform(EntityId(1), Vec2::new(160.0, 160.0), PlatformKind::Break),
                    Entity::star(EntityId(2), Vec2::new(160.0, 220.0), StarKind::Normal),
                ],
                end_y: 1000.0,
                cull_distance: CULL_DISTANCE,
                fallout_margin: FALLOUT_MARGIN,
            },
            Settings::default(),
        );
        state.player.launch(LAUNCH_VELOCITY);
        state.run_state = RunState::Running;
        state
    }

    #[test]
    fn test_other_endpoint_either_order() {
        let p = EntityId::PLAYER;
        let e = EntityId(5);
        assert_eq!(other_endpoint(ContactEvent::new(p, e), p), Ok(e));
        assert_eq!(other_endpoint(ContactEvent::new(e, p), p), Ok(e));
        assert_eq!(
            other_endpoint(ContactEvent::new(p, p), p),
            Err(ContactError::PlayerWithItself)
        );
        assert!(matches!(
            other_endpoint(ContactEvent::new(e, EntityId(6)), p),
            Err(ContactError::NoPlayerEndpoint { .. })
        ));
    }

    #[test]
    fn test_star_contact_signals_hud_once() {
        let mut state = state();

        // Physics reports the overlap a few frames running, in both orders
        for event in [
            ContactEvent::new(EntityId(2), EntityId::PLAYER),
            ContactEvent::new(EntityId::PLAYER, EntityId(2)),
            ContactEvent::new(EntityId(2), EntityId::PLAYER),
        ] {
            dispatch_contact(&mut state, event).unwrap();
        }

        assert_eq!(state.summary.score, 20);
        assert_eq!(state.summary.stars_collected, 1);
        let events = state.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::HudChanged { score: 20, stars: 1 },
                GameEvent::EffectRequested {
                    entity: EntityId(2),
                    effect: crate::sim::entity::Effect::StarPing,
                },
            ]
        );
        assert_eq!(state.entity(EntityId(2)).unwrap().removal(), Removal::Pending);
    }

    #[test]
    fn test_platform_contact_no_hud() {
        let mut state = state();
        state.player.vel.y = -40.0;

        let outcome =
            dispatch_contact(&mut state, ContactEvent::new(EntityId(1), EntityId::PLAYER)).unwrap();
        assert!(!outcome.scoring_changed);
        assert!(state.events.is_empty());
        assert_eq!(state.player.vel.y, state.settings.bounce_velocity);
        assert_eq!(state.entity(EntityId(1)).unwrap().removal(), Removal::Removed);
    }

    #[test]
    fn test_late_contact_is_ignored() {
        let mut state = state();
        state.entities.clear();
        let outcome =
            dispatch_contact(&mut state, ContactEvent::new(EntityId::PLAYER, EntityId(2))).unwrap();
        assert_eq!(outcome, ContactOutcome::NONE);
        assert_eq!(state.summary.score, 0);
    }

    #[test]
    fn test_contact_while_idle_is_ignored() {
        let mut state = state();
        state.run_state = RunState::Idle;
        state.player = crate::sim::player::PlayerController::new(
            EntityId::PLAYER,
            Vec2::new(PLAYER_START_X, PLAYER_START_Y),
        );

        let outcome =
            dispatch_contact(&mut state, ContactEvent::new(EntityId::PLAYER, EntityId(2))).unwrap();
        assert_eq!(outcome, ContactOutcome::NONE);
        assert_eq!(state.summary.score, 0);
        assert_eq!(state.summary.stars_collected, 0);
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert!(state.events.is_empty());
        assert!(state.entity(EntityId(2)).unwrap().is_live());
    }

    #[test]
    fn test_contact_after_end_is_ignored() {
        let mut state = state();
        state.run_state = RunState::Ended;
        let outcome =
            dispatch_contact(&mut state, ContactEvent::new(EntityId(2), EntityId::PLAYER)).unwrap();
        assert_eq!(outcome, ContactOutcome::NONE);
        assert_eq!(state.summary.score, 0);
    }

    #[test]
    fn test_contact_with_unissued_id_is_error() {
        let mut state = state();
        let err = dispatch_contact(&mut state, ContactEvent::new(EntityId::PLAYER, EntityId(9999)))
            .unwrap_err();
        assert_eq!(err, ContactError::UnknownEntity(EntityId(9999)));

        // Ids the level did issue stay silent once removed
        state.entities.clear();
        let late = dispatch_contact(&mut state, ContactEvent::new(EntityId(1), EntityId::PLAYER));
        assert_eq!(late, Ok(ContactOutcome::NONE));
    }

    #[test]
    fn test_contact_without_player_is_error() {
        let mut state = state();
        let err = dispatch_contact(&mut state, ContactEvent::new(EntityId(1), EntityId(2)))
            .unwrap_err();
        assert_eq!(
            err,
            ContactError::NoPlayerEndpoint {
                a: EntityId(1),
                b: EntityId(2)
            }
        );
        assert!(state.entity(EntityId(1)).unwrap().is_live());
    }
}
