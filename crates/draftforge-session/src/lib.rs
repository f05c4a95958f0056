//! Who is in a draft room, and how events reach them.
//!
//! This crate handles the people side of a session:
//!
//! 1. **Seating** ([`Seating`]): side A, side B, spectators, readiness.
//! 2. **Reconnection**: a player is recognised by the durable id they
//!    supplied when seated, never by their connection.
//! 3. **Fan-out** ([`Audience`]): every connection in a room subscribes
//!    with an unbounded sender; publishing never blocks.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)     ← owns one Seating + one Audience per session
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol Layer (below) ← ConnectionId, DurableId, ServerEvent
//! ```

mod audience;
mod seating;

pub use audience::{Audience, EventReceiver, EventSender};
pub use seating::{Admission, Seat, Seating, DEFAULT_NAME_A, DEFAULT_NAME_B, EMPTY_SEAT_NAME};
