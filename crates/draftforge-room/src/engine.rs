//! Turn engine: the only code that moves a session's cursors.
//!
//! Every mutation of a started session goes through [`DraftSession::apply`]:
//! player submissions after the legality chain accepts them, and forced
//! selections after the chain produced the candidate pool. Advancing always
//! resets the turn countdown, including the step where the immunity
//! sequence hands over to the main schema.

use draftforge_protocol::{EntityId, ServerEvent, Side};
use draftforge_tick::ClockTick;
use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::legality::{self, Rejection};
use crate::{DraftSession, IMMUNITY_SEQUENCE, Phase, TurnStep};

/// What the governor should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The session is finished or gone; the governor exits.
    Stopped,
}

impl TickOutcome {
    pub fn is_stopped(self) -> bool {
        self == Self::Stopped
    }
}

impl DraftSession {
    /// Leaves the lobby. Returns `false` if the session already started.
    ///
    /// Publishes `session_started` followed by the new state.
    pub fn begin(&mut self) -> bool {
        if self.phase != Phase::Lobby {
            return false;
        }
        let next = if self.schema.requires_immunity() {
            Phase::Immunity
        } else {
            Phase::Main
        };
        self.enter(next);
        self.immunity_cursor = 0;
        self.main_cursor = 0;
        self.clock.reset_turn();

        info!(room_code = %self.code, phase = %self.phase, "draft started");
        self.publish(ServerEvent::SessionStarted);
        self.publish_state();
        true
    }

    /// Bans or picks `entity` for `side`.
    ///
    /// A refusal leaves the session untouched and publishes nothing.
    pub fn submit_selection(&mut self, side: Side, entity: &EntityId) -> Result<(), Rejection> {
        let step = self.playable_step()?;
        if step.side != side {
            return Err(Rejection::OutOfTurn {
                expected: step.side,
            });
        }
        legality::check(&self.board, &self.catalog, &step, entity)?;
        self.apply(step, entity.clone());
        Ok(())
    }

    /// Applies a uniformly random legal selection for the side to act.
    ///
    /// Returns the chosen entity, or `None` if nothing is legal (the turn
    /// stays open and the next expiry tries again).
    pub fn force_selection(&mut self, rng: &mut impl Rng) -> Option<EntityId> {
        let step = self.playable_step().ok()?;
        let chosen = {
            let pool = legality::candidates(&self.board, &self.catalog, &step);
            if pool.is_empty() {
                warn!(
                    room_code = %self.code,
                    side = ?step.side,
                    action = %step.action,
                    "no legal selection to force, skipping"
                );
                return None;
            }
            pool[rng.random_range(0..pool.len())].clone()
        };
        info!(
            room_code = %self.code,
            side = ?step.side,
            entity = %chosen,
            "reserve exhausted, forcing selection"
        );
        self.apply(step, chosen.clone());
        Some(chosen)
    }

    /// One governor second.
    ///
    /// Publishes a `tick` while the session is live. When the acting side's
    /// reserve has crossed the floor, a selection is forced first and the
    /// tick carries the reset countdown.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickOutcome {
        let Some(step) = self.current_step() else {
            return TickOutcome::Stopped;
        };
        if let ClockTick::Expired(side) = self.clock.tick(step.side) {
            debug!(room_code = %self.code, ?side, "reserve below floor");
            self.force_selection(rng);
            if self.is_finished() {
                return TickOutcome::Stopped;
            }
        }
        let update = self.clock.snapshot();
        self.publish(ServerEvent::Tick(update));
        TickOutcome::Continue
    }

    fn playable_step(&self) -> Result<TurnStep, Rejection> {
        match self.phase {
            Phase::Lobby => Err(Rejection::NotStarted),
            Phase::Finished => Err(Rejection::Finished),
            Phase::Immunity | Phase::Main => self.current_step().ok_or(Rejection::Finished),
        }
    }

    fn apply(&mut self, step: TurnStep, entity: EntityId) {
        debug!(
            room_code = %self.code,
            side = ?step.side,
            action = %step.action,
            entity = %entity,
            "selection applied"
        );
        self.board.record(step.side, step.action, entity);
        self.advance();
    }

    fn advance(&mut self) {
        self.clock.reset_turn();
        match self.phase {
            Phase::Immunity => {
                self.immunity_cursor += 1;
                if self.immunity_cursor >= IMMUNITY_SEQUENCE.len() {
                    self.enter(Phase::Main);
                    self.main_cursor = 0;
                    info!(room_code = %self.code, "immunity phase complete");
                }
            }
            Phase::Main => {
                self.main_cursor += 1;
                if self.main_cursor >= self.schema.len() {
                    self.finish();
                    return;
                }
            }
            Phase::Lobby | Phase::Finished => return,
        }
        self.publish_state();
    }

    fn finish(&mut self) {
        self.enter(Phase::Finished);
        self.finished_at = Some(Instant::now());
        self.timer.cancel();
        info!(room_code = %self.code, "draft finished");
        let state = self.public_state();
        self.publish(ServerEvent::SessionFinished { state });
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "{} -> {next}",
            self.phase
        );
        self.phase = next;
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use draftforge_protocol::{Action, ConnectionId, DurableId, RoomCode};
    use draftforge_session::Seating;
    use draftforge_tick::ClockConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{Catalog, SchemaBook};

    const ROSTER: [&str; 12] = [
        "e0", "e1", "e2", "e3", "e4", "e5", "e6", "e7", "e8", "e9", "e10", "e11",
    ];

    fn session(schema: &str, clock: ClockConfig) -> DraftSession {
        let schema = SchemaBook::builtin().get(schema).unwrap();
        let catalog = Catalog::from_groups([("all".to_string(), ROSTER)]).unwrap();
        let mut seating =
            Seating::with_creator(None, DurableId::new("a"), ConnectionId(1));
        seating.admit(None, &DurableId::new("b"), ConnectionId(2), false);
        DraftSession::new(
            RoomCode::new("TEST"),
            schema,
            Arc::new(catalog),
            clock,
            seating,
        )
    }

    fn started(schema: &str) -> DraftSession {
        let mut s = session(schema, ClockConfig::default());
        s.begin();
        s
    }

    fn id(s: &str) -> EntityId {
        EntityId::from(s)
    }

    #[test]
    fn test_submit_selection_before_begin_rejected() {
        let mut s = session("classic", ClockConfig::default());
        assert_eq!(
            s.submit_selection(Side::A, &id("e0")),
            Err(Rejection::NotStarted)
        );
    }

    #[test]
    fn test_begin_twice_returns_false() {
        let mut s = started("classic");
        assert!(!s.begin());
        assert_eq!(s.phase(), Phase::Main);
    }

    #[test]
    fn test_begin_immunity_schema_enters_immunity() {
        let s = started("gitcg_cup_2");
        assert_eq!(s.phase(), Phase::Immunity);
        assert_eq!(s.current_step(), Some(IMMUNITY_SEQUENCE[0]));
        assert!(s.public_state().immunity_active);
    }

    #[test]
    fn test_submit_selection_out_of_turn_changes_nothing() {
        let mut s = started("classic");
        let before = s.public_state();

        let err = s.submit_selection(Side::B, &id("e0")).unwrap_err();

        assert_eq!(err, Rejection::OutOfTurn { expected: Side::A });
        assert_eq!(s.public_state(), before);
        assert_eq!(s.main_cursor(), 0);
    }

    #[test]
    fn test_submit_selection_resets_countdown() {
        let mut s = started("classic");
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..5 {
            s.tick(&mut rng);
        }
        assert_eq!(s.clock().countdown(), 55);

        s.submit_selection(Side::A, &id("e0")).unwrap();

        assert_eq!(s.clock().countdown(), 60);
    }

    #[test]
    fn test_immunity_to_main_same_step() {
        let mut s = started("gitcg_cup_2");
        for (side, e) in [(Side::A, "e0"), (Side::B, "e1"), (Side::A, "e2")] {
            s.submit_selection(side, &id(e)).unwrap();
            assert_eq!(s.phase(), Phase::Immunity);
        }

        s.submit_selection(Side::B, &id("e3")).unwrap();

        assert_eq!(s.phase(), Phase::Main);
        assert_eq!(s.immunity_cursor(), 4);
        assert_eq!(s.main_cursor(), 0);
        assert_eq!(s.clock().countdown(), 60);
        assert_eq!(s.board().immunity_bans, vec![id("e0"), id("e1")]);
        assert_eq!(s.board().immunity_pool, vec![id("e2"), id("e3")]);
    }

    #[test]
    fn test_force_selection_picks_legal_entity() {
        let mut s = started("classic");
        let mut rng = StdRng::seed_from_u64(42);

        let chosen = s.force_selection(&mut rng).unwrap();

        assert!(s.board().is_banned(&chosen));
        assert_eq!(s.main_cursor(), 1);
    }

    #[test]
    fn test_force_selection_empty_pool_is_noop() {
        // Tiny roster: ban every entity, then nothing is left for B.
        let schema = Arc::new(
            crate::Schema::new(
                "tiny",
                vec![
                    TurnStep::ban(Side::A),
                    TurnStep::pick(Side::B),
                ],
            )
            .unwrap(),
        );
        let catalog = Catalog::from_groups([("g".to_string(), ["only"])]).unwrap();
        let seating = Seating::with_creator(None, DurableId::new("a"), ConnectionId(1));
        let mut s = DraftSession::new(
            RoomCode::new("TINY"),
            schema,
            Arc::new(catalog),
            ClockConfig::default(),
            seating,
        );
        s.begin();
        s.submit_selection(Side::A, &id("only")).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(s.force_selection(&mut rng), None);
        assert_eq!(s.main_cursor(), 1);
        assert_eq!(s.phase(), Phase::Main);
    }

    #[test]
    fn test_tick_expiry_forces_once_and_resets() {
        let mut s = session(
            "classic",
            ClockConfig {
                turn_secs: 1,
                initial_reserve_secs: 0,
                reserve_floor_secs: 0,
            },
        );
        s.begin();
        let mut rng = StdRng::seed_from_u64(9);

        s.tick(&mut rng); // countdown 1 -> 0
        assert_eq!(s.main_cursor(), 0);
        s.tick(&mut rng); // reserve 0 -> -1, below floor

        assert_eq!(s.main_cursor(), 1);
        assert_eq!(s.board().bans.len(), 1);
        assert_eq!(s.board().bans[0].side, Side::A);
        assert_eq!(s.clock().countdown(), 1);
        assert_eq!(s.clock().reserve(Side::A), -1);
    }

    #[test]
    fn test_tick_publishes_snapshot() {
        let mut s = started("classic");
        let (tx, mut rx) = mpsc::unbounded_channel();
        s.audience.subscribe(ConnectionId(1), tx);

        assert_eq!(s.tick(&mut StdRng::seed_from_u64(0)), TickOutcome::Continue);

        match rx.try_recv().unwrap() {
            ServerEvent::Tick(update) => {
                assert_eq!(update.countdown, 59);
                assert_eq!(update.reserve_a, 300);
            }
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn test_tick_lobby_stops() {
        let mut s = session("classic", ClockConfig::default());
        assert!(s.tick(&mut StdRng::seed_from_u64(0)).is_stopped());
    }

    #[test]
    fn test_finish_publishes_only_session_finished() {
        let mut s = started("classic");
        let (tx, mut rx) = mpsc::unbounded_channel();
        s.audience.subscribe(ConnectionId(1), tx);

        let order: Vec<(Side, Action)> = s
            .schema()
            .steps()
            .iter()
            .map(|st| (st.side, st.action))
            .collect();
        for (i, (side, _)) in order.iter().enumerate() {
            s.submit_selection(*side, &id(ROSTER[i])).unwrap();
        }

        let events: Vec<ServerEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.len(), 10);
        assert!(matches!(events[9], ServerEvent::SessionFinished { .. }));
        assert!(events[..9]
            .iter()
            .all(|e| matches!(e, ServerEvent::StateChanged { .. })));
        assert!(s.finished_at().is_some());
        assert_eq!(
            s.submit_selection(Side::A, &id("e11")),
            Err(Rejection::Finished)
        );
    }
}
