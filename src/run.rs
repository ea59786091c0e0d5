//! Run driver
//!
//! Owns one `GameState` and the host-side collaborators. The simulation only
//! records `GameEvent`s; this is the single place they turn into HUD refreshes,
//! effect playback and the end-of-run hand-off.

use crate::persistence::Persistence;
use crate::settings::Settings;
use crate::sim::{
    ContactError, ContactEvent, Effect, EntityId, GameEvent, GameState, HorizontalBias, Level,
    RunSummary, TickInput, detect_contacts, dispatch_contact, physics, tick,
};

/// Score display
pub trait Hud {
    fn update_hud(&mut self, score: u64, stars: u32);
}

/// End-of-run screen
pub trait Presentation {
    fn present_end_screen(&mut self, summary: &RunSummary);
}

/// Plays effects; the host calls `RunLoop::effect_finished` when one completes
pub trait EffectPlayer {
    fn play(&mut self, entity: EntityId, effect: Effect);
}

/// A single run wired to its collaborators
pub struct RunLoop {
    state: GameState,
    hud: Box<dyn Hud>,
    persistence: Box<dyn Persistence>,
    presentation: Box<dyn Presentation>,
    effects: Option<Box<dyn EffectPlayer>>,
}

impl RunLoop {
    pub fn new(
        level: Level,
        settings: Settings,
        hud: Box<dyn Hud>,
        persistence: Box<dyn Persistence>,
        presentation: Box<dyn Presentation>,
    ) -> Self {
        Self {
            state: GameState::new(level, settings),
            hud,
            persistence,
            presentation,
            effects: None,
        }
    }

    /// Defer star removal until the effect player reports completion
    pub fn with_effects(mut self, effects: Box<dyn EffectPlayer>) -> Self {
        self.state.deferred_effects = true;
        self.effects = Some(effects);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Handle for the tilt sensor callback
    pub fn bias(&self) -> HorizontalBias {
        self.state.bias.clone()
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    /// Player tapped the screen
    pub fn tap(&mut self) {
        tick(&mut self.state, &TickInput { launch: true });
        self.flush_events();
    }

    /// Resolve a contact reported by the physics collaborator
    pub fn handle_contact(&mut self, event: ContactEvent) -> Result<(), ContactError> {
        let result = dispatch_contact(&mut self.state, event).map(|_| ());
        self.flush_events();
        result
    }

    /// An effect requested for `entity` finished playing
    pub fn effect_finished(&mut self, entity: EntityId) {
        self.state.effect_finished(entity);
    }

    /// Per-frame update, after physics and contacts for the frame
    pub fn tick(&mut self) {
        tick(&mut self.state, &TickInput::default());
        self.flush_events();
    }

    /// One full frame with the reference physics and contact detector
    pub fn step_reference(&mut self, dt: f32) -> Result<(), ContactError> {
        physics::step(&mut self.state, dt);
        for contact in detect_contacts(&self.state) {
            self.handle_contact(contact)?;
        }
        self.tick();
        Ok(())
    }

    fn flush_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::HudChanged { score, stars } => self.hud.update_hud(score, stars),
                GameEvent::EffectRequested { entity, effect } => {
                    if let Some(effects) = self.effects.as_mut() {
                        effects.play(entity, effect);
                    }
                }
                GameEvent::RunEnded { summary } => {
                    self.persistence
                        .save_state(summary.score, summary.stars_collected);
                    self.presentation.present_end_screen(&summary);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{Entity, PlatformKind, RunOutcome, RunState, StarKind};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        hud: Vec<(u64, u32)>,
        saves: Vec<(u64, u32)>,
        screens: Vec<RunSummary>,
        effects: Vec<EntityId>,
        /// Order of end-of-run hooks
        order: Vec<&'static str>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Calls>>);

    impl Hud for Recorder {
        fn update_hud(&mut self, score: u64, stars: u32) {
            self.0.borrow_mut().hud.push((score, stars));
        }
    }

    impl Persistence for Recorder {
        fn save_state(&mut self, score: u64, stars: u32) {
            let mut calls = self.0.borrow_mut();
            calls.saves.push((score, stars));
            calls.order.push("save");
        }
    }

    impl Presentation for Recorder {
        fn present_end_screen(&mut self, summary: &RunSummary) {
            let mut calls = self.0.borrow_mut();
            calls.screens.push(summary.clone());
            calls.order.push("present");
        }
    }

    impl EffectPlayer for Recorder {
        fn play(&mut self, entity: EntityId, _effect: Effect) {
            self.0.borrow_mut().effects.push(entity);
        }
    }

    fn run_loop(entities: Vec<Entity>, end_y: f32) -> (RunLoop, Recorder) {
        let rec = Recorder::default();
        let run = RunLoop::new(
            Level {
                entities,
                end_y,
                cull_distance: CULL_DISTANCE,
                fallout_margin: FALLOUT_MARGIN,
            },
            Settings::default(),
            Box::new(rec.clone()),
            Box::new(rec.clone()),
            Box::new(rec.clone()),
        );
        (run, rec)
    }

    #[test]
    fn test_completion_invokes_hooks_once() {
        let (mut run, rec) = run_loop(Vec::new(), 1000.0);
        run.tap();

        run.state.player.pos.y = 1001.0;
        run.tick();
        assert!(run.is_ended());

        // More frames and taps after game over change nothing
        for _ in 0..5 {
            run.tap();
            run.tick();
            run.step_reference(SIM_DT).unwrap();
        }

        let calls = rec.0.borrow();
        assert_eq!(calls.saves, vec![(921, 0)]);
        assert_eq!(calls.screens.len(), 1);
        assert_eq!(calls.screens[0].outcome, Some(RunOutcome::Completed));
        assert_eq!(calls.order, vec!["save", "present"]);
    }

    #[test]
    fn test_star_contact_updates_hud() {
        let (mut run, rec) = run_loop(
            vec![Entity::star(EntityId(1), Vec2::new(160.0, 90.0), StarKind::Special)],
            1000.0,
        );
        run.tap();
        run.handle_contact(ContactEvent::new(EntityId(1), EntityId::PLAYER))
            .unwrap();
        run.handle_contact(ContactEvent::new(EntityId::PLAYER, EntityId(1)))
            .unwrap();

        let calls = rec.0.borrow();
        assert_eq!(calls.hud, vec![(100, 5)]);
        // No effect player attached
        assert!(calls.effects.is_empty());
    }

    #[test]
    fn test_overlap_before_tap_scores_nothing() {
        let (mut run, rec) = run_loop(
            vec![Entity::star(EntityId(1), Vec2::new(160.0, 90.0), StarKind::Special)],
            1000.0,
        );

        // Spawn overlaps the star, but the run has not started
        run.step_reference(SIM_DT).unwrap();
        assert_eq!(run.state().run_state, RunState::Idle);
        assert_eq!(run.state().summary.score, 0);
        assert_eq!(run.state().player.vel, Vec2::ZERO);
        assert!(run.state().entity(EntityId(1)).unwrap().is_live());
        assert!(rec.0.borrow().hud.is_empty());

        // Still there to collect once launched
        run.tap();
        run.step_reference(SIM_DT).unwrap();
        assert_eq!(run.state().summary.stars_collected, 1);
    }

    #[test]
    fn test_effect_player_defers_removal() {
        let (run, rec) = run_loop(
            vec![Entity::star(EntityId(1), Vec2::new(160.0, 90.0), StarKind::Normal)],
            1000.0,
        );
        let mut run = run.with_effects(Box::new(rec.clone()));
        run.tap();
        run.handle_contact(ContactEvent::new(EntityId::PLAYER, EntityId(1)))
            .unwrap();
        run.tick();
        assert_eq!(rec.0.borrow().effects, vec![EntityId(1)]);
        assert!(run.state().entity(EntityId(1)).is_some());

        // Chime still playing: repeated contacts score nothing
        run.handle_contact(ContactEvent::new(EntityId::PLAYER, EntityId(1)))
            .unwrap();
        assert_eq!(run.state().summary.score, 20);

        run.effect_finished(EntityId(1));
        assert!(run.state().entity(EntityId(1)).is_none());
        assert_eq!(rec.0.borrow().effects.len(), 1);
    }

    #[test]
    fn test_fallout_hands_off_summary() {
        let (mut run, rec) = run_loop(
            vec![Entity::platform(EntityId(1), Vec2::new(20.0, 900.0), PlatformKind::Normal)],
            5000.0,
        );
        run.tap();
        assert_eq!(run.state().run_state, RunState::Running);

        // Launch and fall with nothing to land on
        for _ in 0..(60 * 30) {
            run.step_reference(SIM_DT).unwrap();
            if run.is_ended() {
                break;
            }
        }
        assert!(run.is_ended());

        let calls = rec.0.borrow();
        assert_eq!(calls.screens.len(), 1);
        assert_eq!(calls.screens[0].outcome, Some(RunOutcome::FellOut));
        assert_eq!(calls.saves[0].0, calls.screens[0].score);
    }

    #[test]
    fn test_invalid_contact_is_reported() {
        let (mut run, _rec) = run_loop(Vec::new(), 1000.0);
        assert!(run
            .handle_contact(ContactEvent::new(EntityId(4), EntityId(5)))
            .is_err());
    }

    #[test]
    fn test_bias_handle_steers_player() {
        let (mut run, _rec) = run_loop(Vec::new(), 1000.0);
        let sensor = run.bias();
        run.tap();
        sensor.set(0.5);
        run.tick();
        assert_eq!(run.state().player.vel.x, 0.5 * HORIZONTAL_SPEED);
    }
}
