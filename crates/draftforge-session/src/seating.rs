//! Seating: who plays side A, who plays side B, and who is watching.
//!
//! Every seat remembers two identities:
//!
//! - the **connection** currently bound to it (transient, replaced on every
//!   reconnect, `None` while the player is away), and
//! - the **durable id** the player supplied when first seated (never
//!   changes, used to recognise them when they come back).
//!
//! ```text
//! admit(durable seen before) ──→ Reconnected(side)   (rebind connection)
//! admit(connection seated)   ──→ Reconnected(side)   (no change)
//! admit(new, B free)         ──→ Seated(B)
//! admit(anything else)       ──→ Spectating
//! ```
//!
//! Seats are never vacated once taken. A player who drops keeps their side
//! and their readiness; only the connection binding is cleared.

use std::collections::{HashMap, HashSet};

use draftforge_protocol::{ConnectionId, DurableId, ReadyFlags, Role, Side};

/// Display name given to the creator when they don't supply one.
pub const DEFAULT_NAME_A: &str = "Player 1";
/// Display name given to side B when they don't supply one.
pub const DEFAULT_NAME_B: &str = "Player 2";
/// Shown in place of side B's name until someone takes the seat.
pub const EMPTY_SEAT_NAME: &str = "Waiting...";

/// One occupied side.
#[derive(Debug, Clone)]
pub struct Seat {
    pub display_name: String,
    pub durable_id: DurableId,
    /// Connection currently acting for this side, if any.
    pub connection: Option<ConnectionId>,
    pub ready: bool,
}

impl Seat {
    fn new(display_name: String, durable_id: DurableId, connection: ConnectionId) -> Self {
        Self {
            display_name,
            durable_id,
            connection: Some(connection),
            ready: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// How a connection was let into a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The durable id was already seated; the new connection now acts for
    /// that side. Nothing else about the room changed.
    Reconnected(Side),
    /// The connection took a previously empty seat.
    Seated(Side),
    /// The connection watches without a side.
    Spectating,
}

impl Admission {
    /// The role reported back to the client.
    pub fn role(self) -> Role {
        match self {
            Self::Reconnected(side) | Self::Seated(side) => side.into(),
            Self::Spectating => Role::Spectator,
        }
    }
}

/// Seats and spectators of one draft room.
#[derive(Debug, Clone)]
pub struct Seating {
    seats: [Option<Seat>; 2],

    /// Durable id → side, kept in sync with `seats`. Lets a returning
    /// player be found without scanning both seats.
    durable: HashMap<DurableId, Side>,

    spectators: HashSet<ConnectionId>,
}

impl Seating {
    /// Seats the room creator as side A.
    pub fn with_creator(
        display_name: Option<String>,
        durable_id: DurableId,
        connection: ConnectionId,
    ) -> Self {
        let name = non_empty(display_name).unwrap_or_else(|| DEFAULT_NAME_A.to_string());
        let mut durable = HashMap::new();
        durable.insert(durable_id.clone(), Side::A);
        Self {
            seats: [Some(Seat::new(name, durable_id, connection)), None],
            durable,
            spectators: HashSet::new(),
        }
    }

    /// Lets a connection in through `join`.
    ///
    /// A known durable id always wins, even when `as_spectator` is set: a
    /// player can't lose their side by joining with the wrong flag. A
    /// connection never holds both seats.
    pub fn admit(
        &mut self,
        display_name: Option<String>,
        durable_id: &DurableId,
        connection: ConnectionId,
        as_spectator: bool,
    ) -> Admission {
        if let Some(side) = self.durable.get(durable_id).copied() {
            self.rebind(side, connection);
            return Admission::Reconnected(side);
        }
        if let Some(side) = self.side_of(connection) {
            return Admission::Reconnected(side);
        }

        if !as_spectator && self.seats[Side::B.index()].is_none() {
            let name =
                non_empty(display_name).unwrap_or_else(|| DEFAULT_NAME_B.to_string());
            self.seats[Side::B.index()] =
                Some(Seat::new(name, durable_id.clone(), connection));
            self.durable.insert(durable_id.clone(), Side::B);
            self.spectators.remove(&connection);
            tracing::info!(%connection, "side B seated");
            return Admission::Seated(Side::B);
        }

        self.spectators.insert(connection);
        Admission::Spectating
    }

    /// Lets a connection back in through `rejoin`: rebind a known durable
    /// id, otherwise watch.
    pub fn readmit(&mut self, durable_id: &DurableId, connection: ConnectionId) -> Admission {
        match self.durable.get(durable_id).copied() {
            Some(side) => {
                self.rebind(side, connection);
                Admission::Reconnected(side)
            }
            None => {
                self.spectators.insert(connection);
                Admission::Spectating
            }
        }
    }

    fn rebind(&mut self, side: Side, connection: ConnectionId) {
        if let Some(seat) = self.seats[side.index()].as_mut() {
            let previous = seat.connection.replace(connection);
            tracing::info!(
                ?side,
                %connection,
                previous = ?previous,
                "seat rebound to new connection"
            );
        }
        // A connection that was watching and now plays stops watching.
        self.spectators.remove(&connection);
    }

    /// Forgets `connection`. Seats stay taken; spectators are dropped.
    ///
    /// Returns the role the connection held, or `None` if it held nothing
    /// (for instance a stale connection already replaced by a reconnect).
    pub fn release(&mut self, connection: ConnectionId) -> Option<Role> {
        let mut role = None;
        for side in Side::BOTH {
            if let Some(seat) = self.seats[side.index()].as_mut() {
                if seat.connection == Some(connection) {
                    seat.connection = None;
                    role.get_or_insert(Role::from(side));
                }
            }
        }
        let watched = self.spectators.remove(&connection);
        role.or(watched.then_some(Role::Spectator))
    }

    pub fn seat(&self, side: Side) -> Option<&Seat> {
        self.seats[side.index()].as_ref()
    }

    /// The side `connection` currently acts for.
    pub fn side_of(&self, connection: ConnectionId) -> Option<Side> {
        Side::BOTH.into_iter().find(|side| {
            self.seat(*side)
                .is_some_and(|seat| seat.connection == Some(connection))
        })
    }

    /// Records readiness. Returns `false` if nobody sits at `side`.
    pub fn mark_ready(&mut self, side: Side) -> bool {
        match self.seats[side.index()].as_mut() {
            Some(seat) => {
                seat.ready = true;
                true
            }
            None => false,
        }
    }

    pub fn both_ready(&self) -> bool {
        Side::BOTH
            .into_iter()
            .all(|side| self.seat(side).is_some_and(|seat| seat.ready))
    }

    pub fn ready_flags(&self) -> ReadyFlags {
        let ready = |side| self.seat(side).is_some_and(|seat| seat.ready);
        ReadyFlags {
            a: ready(Side::A),
            b: ready(Side::B),
        }
    }

    /// Name shown for `side`; a placeholder while the seat is empty.
    pub fn display_name(&self, side: Side) -> &str {
        self.seat(side)
            .map(|seat| seat.display_name.as_str())
            .unwrap_or(EMPTY_SEAT_NAME)
    }

    /// `true` while any seat or spectator has a live connection.
    pub fn has_connected(&self) -> bool {
        !self.spectators.is_empty()
            || self.seats.iter().flatten().any(Seat::is_connected)
    }

    pub fn spectator_count(&self) -> usize {
        self.spectators.len()
    }
}

fn non_empty(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

// =========================================================================
// Tests
// =========================================================================
