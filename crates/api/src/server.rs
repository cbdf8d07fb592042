//! Server configuration and startup.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::routes;
use crate::state::AppState;

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// The HTTP server wrapping the engine.
pub struct ApiServer {
    config: ServerConfig,
}

impl ApiServer {
    /// Creates a server with the given configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Binds and serves until the process is stopped.
    ///
    /// # Errors
    /// Returns an error if binding or serving fails.
    pub async fn run(self, state: AppState) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind).await?;
        info!(addr = %self.config.bind, "api server listening");
        axum::serve(listener, routes::router(state)).await
    }
}
