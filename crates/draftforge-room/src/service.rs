//! Async facade over the shared [`DraftManager`], plus the two background
//! tasks that drive it: one governor per running draft, and the reaper.

use std::sync::Arc;
use std::time::Duration;

use draftforge_protocol::{ConnectionId, DurableId, EntityId, RoomCode};
use draftforge_session::EventSender;
use draftforge_tick::{TickerConfig, Ticker, TimerHandle};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::{DraftManager, Joined, ReadyOutcome, RoomError};

/// The manager as shared between connection handlers and background tasks.
pub type SharedManager = Arc<Mutex<DraftManager>>;

/// Cheap-to-clone handle used by the gateway. Every method takes the
/// manager lock once and runs to completion under it.
#[derive(Clone)]
pub struct DraftService {
    manager: SharedManager,
    ticker: TickerConfig,
}

impl DraftService {
    pub fn new(manager: DraftManager) -> Self {
        let ticker = manager.config().ticker.clone();
        Self {
            manager: Arc::new(Mutex::new(manager)),
            ticker,
        }
    }

    /// The underlying lock, for tests and the reaper.
    pub fn shared(&self) -> SharedManager {
        Arc::clone(&self.manager)
    }

    pub async fn create(
        &self,
        connection: ConnectionId,
        sender: EventSender,
        display_name: Option<String>,
        schema: Option<String>,
        durable_id: DurableId,
    ) -> Result<Joined, RoomError> {
        self.manager.lock().await.create_session(
            connection,
            sender,
            display_name,
            schema.as_deref(),
            durable_id,
        )
    }

    pub async fn join(
        &self,
        connection: ConnectionId,
        sender: EventSender,
        room_code: &RoomCode,
        display_name: Option<String>,
        durable_id: &DurableId,
        as_spectator: bool,
    ) -> Result<Joined, RoomError> {
        self.manager.lock().await.join_session(
            connection,
            sender,
            room_code,
            display_name,
            durable_id,
            as_spectator,
        )
    }

    pub async fn rejoin(
        &self,
        connection: ConnectionId,
        sender: EventSender,
        room_code: &RoomCode,
        durable_id: &DurableId,
    ) -> Result<Joined, RoomError> {
        self.manager
            .lock()
            .await
            .rejoin_session(connection, sender, room_code, durable_id)
    }

    /// Marks the caller's side ready. When that starts the draft, the
    /// governor is spawned and handed to the session before the lock is
    /// released, so no tick can run against a session without its timer.
    pub async fn set_ready(
        &self,
        room_code: &RoomCode,
        connection: ConnectionId,
    ) -> Result<ReadyOutcome, RoomError> {
        let mut manager = self.manager.lock().await;
        let side = manager.side_of(room_code, connection)?;
        let outcome = manager.mark_ready(room_code, side)?;
        if outcome == ReadyOutcome::Started {
            let handle = spawn_governor(self.shared(), room_code.clone(), self.ticker.clone());
            manager.attach_timer(room_code, handle);
        }
        Ok(outcome)
    }

    pub async fn submit(
        &self,
        room_code: &RoomCode,
        connection: ConnectionId,
        entity: &EntityId,
    ) -> Result<(), RoomError> {
        let mut manager = self.manager.lock().await;
        let side = manager.side_of(room_code, connection)?;
        manager.submit_selection(room_code, side, entity)
    }

    pub async fn disconnect(&self, room_code: &RoomCode, connection: ConnectionId) {
        self.manager.lock().await.disconnect(room_code, connection);
    }

    /// Starts the periodic sweep at the configured interval.
    pub async fn spawn_reaper(&self) -> JoinHandle<()> {
        let interval = self.manager.lock().await.config().sweep_interval;
        spawn_reaper(self.shared(), interval)
    }
}

// ---------------------------------------------------------------------------
// Background tasks
// ---------------------------------------------------------------------------

/// Spawns the 1 Hz governor for `room_code`.
///
/// The task exits on its own once the session finishes or disappears;
/// dropping the returned handle aborts it.
pub fn spawn_governor(
    manager: SharedManager,
    room_code: RoomCode,
    ticker: TickerConfig,
) -> TimerHandle {
    let task = tokio::spawn(async move {
        let mut ticker = Ticker::new(ticker);
        tracing::debug!(%room_code, "governor started");
        loop {
            ticker.wait_for_tick().await;
            if manager.lock().await.tick(&room_code).is_stopped() {
                break;
            }
        }
        tracing::debug!(%room_code, "governor stopped");
    });
    TimerHandle::new(task.abort_handle())
}

/// Spawns the reaper: every `interval`, sweep the registry.
pub fn spawn_reaper(manager: SharedManager, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sweeps = time::interval_at(Instant::now() + interval, interval);
        sweeps.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            sweeps.tick().await;
            let removed = manager.lock().await.sweep(Instant::now());
            if !removed.is_empty() {
                tracing::info!(count = removed.len(), "reaper removed draft rooms");
            }
        }
    })
}
