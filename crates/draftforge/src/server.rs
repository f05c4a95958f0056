//! `DraftServer` builder and server loop.
//!
//! This is the entry point for running a Draftforge server. It ties
//! together all the layers: WebSocket → protocol → draft service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use draftforge_protocol::{Codec, ConnectionId, JsonCodec};
use draftforge_room::{Catalog, DraftManager, DraftService, SchemaBook};
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::{DraftforgeError, ServerConfig};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) service: DraftService,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Draftforge server.
///
/// # Example
///
/// ```rust,no_run
/// use draftforge::prelude::*;
///
/// # async fn run() -> Result<(), DraftforgeError> {
/// let server = DraftServer::builder()
///     .config(ServerConfig::from_env()?)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DraftServerBuilder {
    config: ServerConfig,
    catalog: Option<Catalog>,
    schemas: SchemaBook,
}

impl DraftServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            catalog: None,
            schemas: SchemaBook::builtin(),
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Uses `catalog` instead of loading one from the config.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn schemas(mut self, schemas: SchemaBook) -> Self {
        self.schemas = schemas;
        self
    }

    /// Loads the roster, binds the listener, and prepares the service.
    ///
    /// Uses `JsonCodec` on the wire.
    pub async fn build(self) -> Result<DraftServer<JsonCodec>, DraftforgeError> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => self.config.catalog()?,
        };
        let manager = DraftManager::new(catalog, self.schemas, self.config.draft_config());

        let listener = TcpListener::bind(&self.config.bind).await?;
        tracing::info!(addr = %self.config.bind, "WebSocket listener bound");

        Ok(DraftServer {
            listener,
            state: Arc::new(ServerState {
                service: DraftService::new(manager),
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for DraftServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Draftforge server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DraftServer<C: Codec> {
    listener: TcpListener,
    state: Arc<ServerState<C>>,
}

impl DraftServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DraftServerBuilder {
        DraftServerBuilder::new()
    }
}

impl<C> DraftServer<C>
where
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Starts the reaper, then accepts connections and spawns a handler
    /// task for each. The WebSocket upgrade happens inside that task so a
    /// slow client can't hold up the loop. Runs until the process is
    /// terminated.
    pub async fn run(self) -> Result<(), DraftforgeError> {
        let _reaper = self.state.service.spawn_reaper().await;
        tracing::info!("Draftforge server running");

        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    continue;
                }
            };

            let connection = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                let ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(e) => {
                        tracing::debug!(%connection, %addr, error = %e, "websocket upgrade failed");
                        return;
                    }
                };
                tracing::debug!(%connection, %addr, "accepted WebSocket connection");
                if let Err(e) = handle_connection(connection, ws, state).await {
                    tracing::debug!(%connection, error = %e, "connection ended with error");
                }
            });
        }
    }
}
