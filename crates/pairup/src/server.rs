//! `PairupServer` builder and accept loop.
//!
//! This is the entry point for running a Pairup lobby server. It ties the
//! layers together: transport → protocol → session/lobby → router.

use std::sync::Arc;

use pairup_lobby::{Lobby, LobbyConfig};
use pairup_protocol::{Audience, Codec, JsonCodec, ServerEvent};
use pairup_transport::{Switchboard, Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::PairupError;
use crate::router::handle_connection;

/// The switchboard instantiated for this protocol.
pub(crate) type LobbySwitchboard = Switchboard<Audience, ServerEvent>;

/// Shared server state passed to each connection handler task.
///
/// The lobby mutex is the design's single serialization point: every
/// coordinator call holds it for its full duration, so two events
/// touching the same room can never interleave their mutations. The
/// switchboard has its own mutex and is always locked *after* the lobby,
/// never before — keep that order or a handler pair can deadlock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) lobby: Mutex<Lobby>,
    pub(crate) switchboard: Mutex<LobbySwitchboard>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Pairup server.
///
/// # Example
///
/// ```rust,no_run
/// use pairup::prelude::*;
///
/// # async fn run() -> Result<(), PairupError> {
/// let server = PairupServerBuilder::new()
///     .bind("0.0.0.0:4000")
///     .lobby_config(LobbyConfig {
///         departure_policy: DeparturePolicy::Reserve,
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PairupServerBuilder {
    bind_addr: String,
    lobby_config: LobbyConfig,
}

impl PairupServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            lobby_config: LobbyConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the lobby configuration.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Builds the server: binds the WebSocket transport and assembles the
    /// shared state. Uses `JsonCodec` for the wire format.
    pub async fn build(self) -> Result<PairupServer<JsonCodec>, PairupError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            lobby: Mutex::new(Lobby::new(self.lobby_config)),
            switchboard: Mutex::new(LobbySwitchboard::new()),
            codec: JsonCodec,
        });

        Ok(PairupServer { transport, state })
    }
}

impl Default for PairupServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Pairup lobby server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PairupServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> PairupServer<C> {
    /// Creates a new builder.
    pub fn builder() -> PairupServerBuilder {
        PairupServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a router task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), PairupError> {
        tracing::info!("Pairup lobby server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
