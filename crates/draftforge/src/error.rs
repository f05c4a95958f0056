//! Unified error type for the Draftforge server.

use std::path::PathBuf;

use draftforge_protocol::ProtocolError;
use draftforge_room::{CatalogError, RoomError};
use tokio_tungstenite::tungstenite;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DraftforgeError {
    /// Binding, accepting, or reading a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The WebSocket handshake or stream failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The config file isn't valid JSON for [`ServerConfig`](crate::ServerConfig).
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The roster couldn't be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A room-level error (not found, expired, unknown schema).
    #[error(transparent)]
    Room(#[from] RoomError),
}
