//! Draft manager: the registry of live sessions.
//!
//! Creates sessions under fresh room codes, routes connections into them,
//! forwards turns to the engine, and sweeps out sessions nobody needs.
//!
//! # Concurrency note
//!
//! `DraftManager` is plain synchronous state. The server wraps it in one
//! `tokio::sync::Mutex` (see [`DraftService`](crate::DraftService)) so
//! commands, governor ticks and reaper sweeps each run to completion
//! without interleaving.

use std::collections::HashMap;
use std::sync::Arc;

use draftforge_protocol::{
    ConnectionId, DurableId, Entity, EntityId, PublicState, Role, RoomCode, ServerEvent, Side,
};
use draftforge_session::{Admission, EventSender, Seating};
use draftforge_tick::TimerHandle;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;

use crate::{Catalog, DraftConfig, DraftSession, RoomError, SchemaBook, TickOutcome, code};

/// What a connection receives on entering a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub room_code: RoomCode,
    pub role: Role,
    pub state: PublicState,
    pub catalog: Vec<Entity>,
}

impl From<Joined> for ServerEvent {
    fn from(joined: Joined) -> Self {
        ServerEvent::Joined {
            room_code: joined.room_code,
            role: joined.role,
            state: joined.state,
            catalog: joined.catalog,
        }
    }
}

/// Result of a `set_ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Recorded; still waiting on the other side.
    Waiting,
    /// Both sides ready: the draft began and needs a governor.
    Started,
    /// The draft had already begun; nothing changed.
    Ignored,
}

/// Owns every live [`DraftSession`], keyed by room code.
pub struct DraftManager {
    sessions: HashMap<RoomCode, DraftSession>,
    schemas: SchemaBook,
    catalog: Arc<Catalog>,
    config: DraftConfig,
    /// Room codes and forced selections.
    rng: StdRng,
}

impl DraftManager {
    pub fn new(catalog: Catalog, schemas: SchemaBook, config: DraftConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            schemas,
            catalog: Arc::new(catalog),
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replaces the random source with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Entering a room
    // -----------------------------------------------------------------------

    /// Opens a room with the caller seated as side A.
    ///
    /// `schema` of `None` picks the default schema; an unknown name is an
    /// error and creates nothing.
    pub fn create_session(
        &mut self,
        connection: ConnectionId,
        sender: EventSender,
        display_name: Option<String>,
        schema: Option<&str>,
        durable_id: DurableId,
    ) -> Result<Joined, RoomError> {
        let schema = self
            .schemas
            .resolve(schema)
            .ok_or_else(|| RoomError::UnknownSchema(schema.unwrap_or_default().to_string()))?;
        let sessions = &self.sessions;
        let room_code = code::allocate(&mut self.rng, |c| sessions.contains_key(c))?;

        let seating = Seating::with_creator(display_name, durable_id, connection);
        let mut session = DraftSession::new(
            room_code.clone(),
            schema,
            Arc::clone(&self.catalog),
            self.config.clock,
            seating,
        );
        session.audience.subscribe(connection, sender);

        let joined = Self::welcome(&mut session, connection, Role::A);
        tracing::info!(
            room_code = %room_code,
            schema = session.schema().name(),
            %connection,
            "draft room created"
        );
        self.sessions.insert(room_code, session);
        Ok(joined)
    }

    /// Enters an existing room as a returning player, side B, or spectator.
    pub fn join_session(
        &mut self,
        connection: ConnectionId,
        sender: EventSender,
        room_code: &RoomCode,
        display_name: Option<String>,
        durable_id: &DurableId,
        as_spectator: bool,
    ) -> Result<Joined, RoomError> {
        let session = self
            .sessions
            .get_mut(room_code)
            .ok_or_else(|| RoomError::NotFound(room_code.clone()))?;

        let admission = session
            .seating
            .admit(display_name, durable_id, connection, as_spectator);
        session.audience.subscribe(connection, sender);
        session.touch();

        let joined = Self::welcome(session, connection, admission.role());
        if let Admission::Seated(_) = admission {
            session.publish_state();
        }
        tracing::info!(%room_code, %connection, role = ?admission.role(), "joined draft room");
        Ok(joined)
    }

    /// Re-enters a room after a dropped connection.
    ///
    /// The durable id decides the role; unknown ids watch. A room that no
    /// longer exists reports the session as expired.
    pub fn rejoin_session(
        &mut self,
        connection: ConnectionId,
        sender: EventSender,
        room_code: &RoomCode,
        durable_id: &DurableId,
    ) -> Result<Joined, RoomError> {
        let session = self
            .sessions
            .get_mut(room_code)
            .ok_or_else(|| RoomError::SessionExpired(room_code.clone()))?;

        let admission = session.seating.readmit(durable_id, connection);
        session.audience.subscribe(connection, sender);
        session.touch();

        tracing::info!(%room_code, %connection, role = ?admission.role(), "rejoined draft room");
        Ok(Self::welcome(session, connection, admission.role()))
    }

    /// Sends `joined` to the newcomer before anything else reaches them.
    fn welcome(session: &mut DraftSession, connection: ConnectionId, role: Role) -> Joined {
        let joined = Joined {
            room_code: session.code.clone(),
            role,
            state: session.public_state(),
            catalog: session.catalog.entities().to_vec(),
        };
        session
            .audience
            .send_to(connection, joined.clone().into());
        joined
    }

    // -----------------------------------------------------------------------
    // Playing
    // -----------------------------------------------------------------------

    /// The side `connection` plays in `room_code`.
    pub fn side_of(&self, room_code: &RoomCode, connection: ConnectionId) -> Result<Side, RoomError> {
        let session = self.session(room_code)?;
        session
            .seating
            .side_of(connection)
            .ok_or(RoomError::Rejected(crate::Rejection::NoSide))
    }

    /// Marks `side` ready, starting the draft once both sides are.
    pub fn mark_ready(&mut self, room_code: &RoomCode, side: Side) -> Result<ReadyOutcome, RoomError> {
        let session = self.session_mut(room_code)?;
        if session.is_started() {
            return Ok(ReadyOutcome::Ignored);
        }
        session.touch();
        session.seating.mark_ready(side);
        session.publish_state();

        if !session.seating.both_ready() {
            return Ok(ReadyOutcome::Waiting);
        }
        session.begin();
        Ok(ReadyOutcome::Started)
    }

    /// Forwards a submission to the engine.
    ///
    /// Refusals come back as [`RoomError::Rejected`] and are logged at
    /// debug; the session is untouched and its idle timer keeps running.
    pub fn submit_selection(
        &mut self,
        room_code: &RoomCode,
        side: Side,
        entity: &EntityId,
    ) -> Result<(), RoomError> {
        let session = self.session_mut(room_code)?;
        session.submit_selection(side, entity).map_err(|rejection| {
            tracing::debug!(%room_code, ?side, %entity, %rejection, "submission refused");
            RoomError::Rejected(rejection)
        })?;
        session.touch();
        Ok(())
    }

    /// One governor tick for `room_code`. A missing session stops its
    /// governor.
    pub fn tick(&mut self, room_code: &RoomCode) -> TickOutcome {
        let Self { sessions, rng, .. } = self;
        match sessions.get_mut(room_code) {
            Some(session) => session.tick(rng),
            None => TickOutcome::Stopped,
        }
    }

    /// Hands the session its governor. Returns `false` (and drops the
    /// handle, aborting the task) if the session is gone.
    pub fn attach_timer(&mut self, room_code: &RoomCode, handle: TimerHandle) -> bool {
        match self.sessions.get_mut(room_code) {
            Some(session) => {
                session.install_timer(handle);
                true
            }
            None => false,
        }
    }

    /// Forgets `connection` in `room_code`. The clock keeps running.
    pub fn disconnect(&mut self, room_code: &RoomCode, connection: ConnectionId) {
        let Some(session) = self.sessions.get_mut(room_code) else {
            return;
        };
        let role = session.seating.release(connection);
        session.audience.unsubscribe(connection);
        session.touch();
        tracing::info!(%room_code, %connection, role = ?role, "left draft room");
    }

    // -----------------------------------------------------------------------
    // Reaper
    // -----------------------------------------------------------------------

    /// Removes sessions finished longer than the retention window ago, and
    /// abandoned sessions idle longer than the idle window. Returns the
    /// codes removed.
    pub fn sweep(&mut self, now: Instant) -> Vec<RoomCode> {
        let retention = self.config.finished_retention;
        let idle = self.config.idle_window;
        let mut removed = Vec::new();

        self.sessions.retain(|code, session| {
            let expired = session
                .finished_at
                .is_some_and(|at| now.saturating_duration_since(at) > retention);
            let abandoned = !session.seating.has_connected()
                && now.saturating_duration_since(session.last_active) > idle;
            if expired || abandoned {
                session.timer.cancel();
                tracing::info!(room_code = %code, expired, abandoned, "reaping draft room");
                removed.push(code.clone());
                return false;
            }
            true
        });
        removed
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn get(&self, room_code: &RoomCode) -> Option<&DraftSession> {
        self.sessions.get(room_code)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session(&self, room_code: &RoomCode) -> Result<&DraftSession, RoomError> {
        self.sessions
            .get(room_code)
            .ok_or_else(|| RoomError::NotFound(room_code.clone()))
    }

    fn session_mut(&mut self, room_code: &RoomCode) -> Result<&mut DraftSession, RoomError> {
        self.sessions
            .get_mut(room_code)
            .ok_or_else(|| RoomError::NotFound(room_code.clone()))
    }
}
