//! `LeapfrogServer` builder and accept loop.
//!
//! This is the entry point for running a Leapfrog server. It ties
//! together all the layers: websocket → protocol → manager → game actor.

use std::net::SocketAddr;
use std::sync::Arc;

use leapfrog_protocol::JsonCodec;
use leapfrog_room::{GameManager, ManagerConfig};
use tokio::net::TcpListener;

use crate::LeapfrogError;
use crate::handler::handle_connection;

/// Address used when none is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) manager: Arc<GameManager>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Leapfrog server.
///
/// # Example
///
/// ```rust,no_run
/// use leapfrog::prelude::*;
///
/// # async fn start() -> Result<(), LeapfrogError> {
/// let server = LeapfrogServer::builder()
///     .bind("0.0.0.0:8000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct LeapfrogServerBuilder {
    bind_addr: String,
    manager_config: ManagerConfig,
}

impl LeapfrogServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            manager_config: ManagerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session manager configuration.
    pub fn manager_config(mut self, config: ManagerConfig) -> Self {
        self.manager_config = config;
        self
    }

    /// Binds the listener and creates the session manager.
    pub async fn build(self) -> Result<LeapfrogServer, LeapfrogError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "leapfrog server listening");

        let state = Arc::new(ServerState {
            manager: Arc::new(GameManager::new(self.manager_config)),
            codec: JsonCodec,
        });
        Ok(LeapfrogServer { listener, state })
    }
}

impl Default for LeapfrogServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Leapfrog server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LeapfrogServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl LeapfrogServer {
    /// Creates a new builder.
    pub fn builder() -> LeapfrogServerBuilder {
        LeapfrogServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The session manager serving this server's connections.
    pub fn manager(&self) -> Arc<GameManager> {
        Arc::clone(&self.state.manager)
    }

    /// Starts the manager's workers and runs the accept loop, spawning a
    /// handler task per connection. Runs until the process is terminated.
    pub async fn run(self) -> Result<(), LeapfrogError> {
        self.state.manager.spawn_workers();
        tracing::info!("leapfrog server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, state).await {
                            tracing::debug!(%addr, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
