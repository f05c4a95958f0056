//! Draft sessions for Draftforge.
//!
//! Each room is a [`DraftSession`]: two seats, a schema, a board of bans
//! and picks, and a turn clock. All sessions live in one [`DraftManager`]
//! behind a single lock.
//!
//! # Key types
//!
//! - [`Schema`] / [`SchemaBook`]: the turn orders a draft can follow
//! - [`Catalog`]: the roster that can be banned or picked
//! - [`legality`]: the ordered checks every selection passes through
//! - [`DraftSession`]: one room, advanced by the turn engine
//! - [`DraftManager`]: registry, identity routing and reaper sweep
//! - [`DraftService`]: async facade that also runs governors and the reaper

mod board;
mod catalog;
mod code;
mod config;
mod engine;
mod error;
pub mod legality;
mod manager;
mod schema;
mod service;
mod session;

pub use board::Board;
pub use catalog::{Catalog, CatalogError};
pub use code::CODE_LEN;
pub use config::{DraftConfig, Phase};
pub use engine::TickOutcome;
pub use error::RoomError;
pub use legality::Rejection;
pub use manager::{DraftManager, Joined, ReadyOutcome};
pub use schema::{DEFAULT_SCHEMA, IMMUNITY_SEQUENCE, Schema, SchemaBook, SchemaError, TurnStep};
pub use service::{DraftService, SharedManager, spawn_governor, spawn_reaper};
pub use session::DraftSession;
