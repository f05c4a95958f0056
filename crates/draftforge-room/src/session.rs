//! The per-room draft aggregate.
//!
//! A [`DraftSession`] owns everything about one room: seating, the
//! subscribers it publishes to, its schema, both cursors, the board, the
//! clock, and the handle of its governor task. The turn rules that mutate
//! it live in the `engine` module.

use std::sync::Arc;

use draftforge_protocol::{PublicState, RoomCode, ServerEvent, Side};
use draftforge_session::{Audience, Seating};
use draftforge_tick::{ClockConfig, TimerHandle, TimerSlot, TurnClock};
use tokio::time::Instant;

use crate::{Board, Catalog, IMMUNITY_SEQUENCE, Phase, Schema, TurnStep};

pub struct DraftSession {
    pub(crate) code: RoomCode,
    pub(crate) schema: Arc<Schema>,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) seating: Seating,
    pub(crate) audience: Audience,
    pub(crate) phase: Phase,
    /// Position in [`IMMUNITY_SEQUENCE`], `0..=4`.
    pub(crate) immunity_cursor: usize,
    /// Position in the schema, `0..=schema.len()`.
    pub(crate) main_cursor: usize,
    pub(crate) board: Board,
    pub(crate) clock: TurnClock,
    pub(crate) timer: TimerSlot,
    pub(crate) last_active: Instant,
    pub(crate) finished_at: Option<Instant>,
}

impl DraftSession {
    pub fn new(
        code: RoomCode,
        schema: Arc<Schema>,
        catalog: Arc<Catalog>,
        clock: ClockConfig,
        seating: Seating,
    ) -> Self {
        Self {
            code,
            schema,
            catalog,
            seating,
            audience: Audience::new(),
            phase: Phase::Lobby,
            immunity_cursor: 0,
            main_cursor: 0,
            board: Board::new(),
            clock: TurnClock::new(clock),
            timer: TimerSlot::new(),
            last_active: Instant::now(),
            finished_at: None,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    pub fn seating(&self) -> &Seating {
        &self.seating
    }

    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    pub fn immunity_cursor(&self) -> usize {
        self.immunity_cursor
    }

    pub fn main_cursor(&self) -> usize {
        self.main_cursor
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Lobby
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    /// `true` while a governor task is installed and running.
    pub fn has_live_timer(&self) -> bool {
        self.timer.is_live()
    }

    /// The turn to play now, `None` in the lobby and once finished.
    pub fn current_step(&self) -> Option<TurnStep> {
        match self.phase {
            Phase::Immunity => IMMUNITY_SEQUENCE.get(self.immunity_cursor).copied(),
            Phase::Main => self.schema.step(self.main_cursor).copied(),
            Phase::Lobby | Phase::Finished => None,
        }
    }

    pub fn current_side(&self) -> Option<Side> {
        self.current_step().map(|step| step.side)
    }

    pub(crate) fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Replaces the governor task, aborting any previous one.
    pub(crate) fn install_timer(&mut self, handle: TimerHandle) {
        self.timer.install(handle);
    }

    pub(crate) fn publish(&mut self, event: ServerEvent) {
        self.audience.publish(&event);
    }

    pub(crate) fn publish_state(&mut self) {
        let state = self.public_state();
        self.publish(ServerEvent::StateChanged { state });
    }

    /// What clients are allowed to see.
    pub fn public_state(&self) -> PublicState {
        let step = self.current_step();
        PublicState {
            room_code: self.code.clone(),
            schema: self.schema.name().to_string(),
            started: self.is_started(),
            immunity_active: self.phase == Phase::Immunity,
            finished: self.is_finished(),
            current_side: step.map(|s| s.side),
            current_action: step.map(|s| s.action),
            step_number: (self.main_cursor + 1).min(self.schema.len()),
            bans: self.board.bans.clone(),
            picks_a: self.board.picks(Side::A).to_vec(),
            picks_b: self.board.picks(Side::B).to_vec(),
            immunity_bans: self.board.immunity_bans.clone(),
            immunity_pool: self.board.immunity_pool.clone(),
            name_a: self.seating.display_name(Side::A).to_string(),
            name_b: self.seating.display_name(Side::B).to_string(),
            ready: self.seating.ready_flags(),
        }
    }
}

impl std::fmt::Debug for DraftSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSession")
            .field("code", &self.code)
            .field("schema", &self.schema.name())
            .field("phase", &self.phase)
            .field("immunity_cursor", &self.immunity_cursor)
            .field("main_cursor", &self.main_cursor)
            .finish_non_exhaustive()
    }
}
