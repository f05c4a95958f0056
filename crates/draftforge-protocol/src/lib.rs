//! Wire protocol for Draftforge.
//!
//! This crate defines the "language" spoken between draft clients and the
//! server:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], [`PublicState`], ...):
//!   the structures that travel on the wire, plus the identity newtypes
//!   shared by every other crate ([`RoomCode`], [`Side`], [`EntityId`], ...).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) - how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Gateway (bytes) → Protocol (ClientCommand) → Room (DraftSession)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Action, BanEntry, ClientCommand, ConnectionId, DurableId, Entity, EntityId,
    ErrorCode, PublicState, ReadyFlags, Role, RoomCode, ServerEvent, Side,
    TickUpdate,
};
