//! # Draftforge
//!
//! Real-time draft/ban server. Two sides take turns banning and picking
//! from a shared roster, following a named schema, under a per-turn
//! countdown backed by a banked reserve.
//!
//! The server speaks JSON over WebSocket. Every frame a client sends is a
//! [`ClientCommand`]; every frame it receives is a [`ServerEvent`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use draftforge::prelude::*;
//!
//! # async fn run() -> Result<(), DraftforgeError> {
//! let server = DraftServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{BIND_ENV, CONFIG_ENV, ServerConfig};
pub use error::DraftforgeError;
pub use server::{DraftServer, DraftServerBuilder};

pub use draftforge_protocol::{ClientCommand, ServerEvent};

pub mod prelude {
    pub use crate::{DraftServer, DraftServerBuilder, DraftforgeError, ServerConfig};
    pub use draftforge_protocol::{
        Action, ClientCommand, ErrorCode, PublicState, Role, RoomCode, ServerEvent, Side,
    };
    pub use draftforge_room::{Catalog, SchemaBook};
}
