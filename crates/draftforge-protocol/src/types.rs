//! Core protocol types for Draftforge's wire format.
//!
//! Everything in this module travels "on the wire": commands that clients
//! send, events the server publishes, and the public projection of a draft
//! session. Internal identities (connection ids, durable ids) appear in
//! commands but are never echoed back inside [`PublicState`].

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The short code that names a draft room, e.g. `"K7QZ"`.
///
/// Newtype wrapper so a room code can't be confused with an entity id or a
/// durable id, even though all three are strings underneath.
/// `#[serde(transparent)]` keeps the JSON form a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Wraps a raw string as a room code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transient identity of a single live connection.
///
/// Assigned by the gateway when a socket is accepted and gone when it
/// closes. A participant who reconnects gets a new `ConnectionId`; the
/// [`DurableId`] is what ties the two connections to the same seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Opaque, caller-supplied identity that survives reconnects.
///
/// The server never interprets it. It is only compared for equality
/// against the ids recorded when a side was seated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurableId(pub String);

impl DurableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Identifier of a selectable roster entity (a character, a hero, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Sides, roles, actions
// ---------------------------------------------------------------------------

/// One of the two competing participants of a draft.
///
/// Side A is always the room creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Both sides, in seating order.
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Array index for per-side storage (`A` = 0, `B` = 1).
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// The role a connection holds inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
    #[serde(rename = "spectator")]
    Spectator,
}

impl From<Side> for Role {
    fn from(side: Side) -> Self {
        match side {
            Side::A => Role::A,
            Side::B => Role::B,
        }
    }
}

/// What a turn asks the acting side to do.
///
/// `Ban` and `Pick` appear in draft schemas; the two `Immunity*` actions
/// only appear in the immunity sequence that precedes some schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Ban,
    Pick,
    ImmunityBan,
    ImmunityPick,
}

impl Action {
    /// `true` for the two actions of the immunity sequence.
    pub fn is_immunity(self) -> bool {
        matches!(self, Self::ImmunityBan | Self::ImmunityPick)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ban => "ban",
            Self::Pick => "pick",
            Self::ImmunityBan => "immunity_ban",
            Self::ImmunityPick => "immunity_pick",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Roster and public state
// ---------------------------------------------------------------------------

/// A selectable roster entry: its id plus the group it is displayed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub group: String,
}

/// One entry of the global ban list: who banned what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub entity_id: EntityId,
    pub side: Side,
}

/// Readiness of both sides before the draft starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyFlags {
    pub a: bool,
    pub b: bool,
}

/// The client-visible projection of a draft session.
///
/// This is what every `state_changed` and `session_finished` event carries.
/// It deliberately omits connection and durable identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub room_code: RoomCode,
    /// Name of the draft schema in use.
    pub schema: String,
    pub started: bool,
    pub immunity_active: bool,
    pub finished: bool,
    /// Side to act, `None` before start and after finish.
    pub current_side: Option<Side>,
    pub current_action: Option<Action>,
    /// 1-based main-phase step for display, capped at the schema length.
    pub step_number: usize,
    pub bans: Vec<BanEntry>,
    pub picks_a: Vec<EntityId>,
    pub picks_b: Vec<EntityId>,
    pub immunity_bans: Vec<EntityId>,
    pub immunity_pool: Vec<EntityId>,
    pub name_a: String,
    pub name_b: String,
    pub ready: ReadyFlags,
}

/// Clock snapshot published once per governor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickUpdate {
    /// Seconds left on the current turn.
    pub countdown: u32,
    /// Side A's banked reserve in seconds. Negative once overdrawn.
    pub reserve_a: i32,
    pub reserve_b: i32,
}

// ---------------------------------------------------------------------------
// Commands (client → server)
// ---------------------------------------------------------------------------

/// Commands a client can send.
///
/// `#[serde(tag = "type")]` gives internally tagged JSON:
///   `{ "type": "submit", "room_code": "K7QZ", "entity_id": "ganyu" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Open a new room; the sender becomes side A.
    Create {
        #[serde(default)]
        display_name: Option<String>,
        /// Schema name. The server default is used when absent.
        #[serde(default)]
        schema: Option<String>,
        durable_id: DurableId,
    },

    /// Enter an existing room as side B, spectator, or returning player.
    Join {
        room_code: RoomCode,
        #[serde(default)]
        display_name: Option<String>,
        durable_id: DurableId,
        #[serde(default)]
        as_spectator: bool,
    },

    /// Re-enter a room after a dropped connection.
    Rejoin {
        room_code: RoomCode,
        durable_id: DurableId,
    },

    /// Mark the sender's side ready.
    SetReady { room_code: RoomCode },

    /// Ban or pick `entity_id` on the sender's turn.
    Submit {
        room_code: RoomCode,
        entity_id: EntityId,
    },
}

// ---------------------------------------------------------------------------
// Events (server → client)
// ---------------------------------------------------------------------------

/// Distinct, terminal error codes surfaced to a single caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// `join` named a room that doesn't exist.
    RoomNotFound,
    /// `rejoin` named a room that no longer exists.
    SessionExpired,
    /// `create` named a schema the server doesn't know.
    UnknownSchema,
    /// The command couldn't be decoded.
    BadRequest,
    /// The server couldn't allocate a room.
    Unavailable,
}

/// Events the server publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `create`, `join` and `rejoin`, sent only to the caller.
    Joined {
        room_code: RoomCode,
        role: Role,
        state: PublicState,
        catalog: Vec<Entity>,
    },

    /// The public state changed.
    StateChanged { state: PublicState },

    /// Both sides are ready and the first turn is open.
    SessionStarted,

    /// One governor tick.
    Tick(TickUpdate),

    /// The final turn was taken.
    SessionFinished { state: PublicState },

    /// A lookup or decoding failure, sent only to the caller.
    Error { code: ErrorCode, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! JSON shape tests. Browser clients parse these by hand, so the serde
    //! attributes are part of the contract.

    use super::*;

    fn sample_state() -> PublicState {
        PublicState {
            room_code: RoomCode::new("AB12"),
            schema: "classic".into(),
            started: true,
            immunity_active: false,
            finished: false,
            current_side: Some(Side::B),
            current_action: Some(Action::Pick),
            step_number: 3,
            bans: vec![BanEntry {
                entity_id: EntityId::new("ganyu"),
                side: Side::A,
            }],
            picks_a: vec![],
            picks_b: vec![EntityId::new("diluc")],
            immunity_bans: vec![],
            immunity_pool: vec![],
            name_a: "Player 1".into(),
            name_b: "Player 2".into(),
            ready: ReadyFlags { a: true, b: true },
        }
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::new("K7QZ")).unwrap();
        assert_eq!(json, "\"K7QZ\"");
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "conn-7");
    }

    #[test]
    fn test_entity_id_deserializes_from_plain_string() {
        let id: EntityId = serde_json::from_str("\"xiao\"").unwrap();
        assert_eq!(id, EntityId::new("xiao"));
    }

    // =====================================================================
    // Side / Role / Action
    // =====================================================================

    #[test]
    fn test_side_opponent_is_involution() {
        for side in Side::BOTH {
            assert_ne!(side.opponent(), side);
            assert_eq!(side.opponent().opponent(), side);
        }
    }

    #[test]
    fn test_side_index_matches_seating_order() {
        assert_eq!(Side::A.index(), 0);
        assert_eq!(Side::B.index(), 1);
    }

    #[test]
    fn test_role_json_format() {
        assert_eq!(serde_json::to_string(&Role::A).unwrap(), "\"A\"");
        assert_eq!(
            serde_json::to_string(&Role::Spectator).unwrap(),
            "\"spectator\""
        );
    }

    #[test]
    fn test_role_from_side_matches() {
        assert_eq!(Role::from(Side::A), Role::A);
        assert_eq!(Role::from(Side::B), Role::B);
    }

    #[test]
    fn test_action_serializes_as_snake_case() {
        let json = serde_json::to_string(&Action::ImmunityPick).unwrap();
        assert_eq!(json, "\"immunity_pick\"");
        assert_eq!(Action::ImmunityBan.to_string(), "immunity_ban");
    }

    #[test]
    fn test_action_is_immunity() {
        assert!(Action::ImmunityBan.is_immunity());
        assert!(!Action::Pick.is_immunity());
    }

    // =====================================================================
    // Commands
    // =====================================================================

    #[test]
    fn test_client_command_create_defaults_optional_fields() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"create","durable_id":"u-1"}"#)
                .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::Create {
                display_name: None,
                schema: None,
                durable_id: DurableId::new("u-1"),
            }
        );
    }

    #[test]
    fn test_client_command_join_defaults_as_spectator_false() {
        let cmd: ClientCommand = serde_json::from_str(
            r#"{"type":"join","room_code":"AB12","durable_id":"u-2"}"#,
        )
        .unwrap();
        match cmd {
            ClientCommand::Join { as_spectator, .. } => assert!(!as_spectator),
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn test_client_command_submit_json_format() {
        let cmd = ClientCommand::Submit {
            room_code: RoomCode::new("AB12"),
            entity_id: EntityId::new("nahida"),
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "submit");
        assert_eq!(json["room_code"], "AB12");
        assert_eq!(json["entity_id"], "nahida");
    }

    #[test]
    fn test_client_command_unknown_type_fails() {
        let result: Result<ClientCommand, _> =
            serde_json::from_str(r#"{"type":"cheat"}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // Events
    // =====================================================================

    #[test]
    fn test_server_event_tick_flattens_update() {
        let event = ServerEvent::Tick(TickUpdate {
            countdown: 12,
            reserve_a: 300,
            reserve_b: -2,
        });
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tick");
        assert_eq!(json["countdown"], 12);
        assert_eq!(json["reserve_b"], -2);
    }

    #[test]
    fn test_server_event_state_changed_hides_identities() {
        let event = ServerEvent::StateChanged {
            state: sample_state(),
        };
        let text = serde_json::to_string(&event).unwrap();
        assert!(text.contains("\"state_changed\""));
        assert!(!text.contains("durable"));
        assert!(!text.contains("conn"));
    }

    #[test]
    fn test_server_event_error_code_format() {
        let event = ServerEvent::Error {
            code: ErrorCode::RoomNotFound,
            message: "room ZZZZ not found".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "room_not_found");
    }

    #[test]
    fn test_public_state_current_side_null_before_start() {
        let mut state = sample_state();
        state.current_side = None;
        state.current_action = None;
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert!(json["current_side"].is_null());
        assert!(json["current_action"].is_null());
    }
}
