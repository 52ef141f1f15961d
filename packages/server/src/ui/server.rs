//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use hubbub_shared::{
    interval::Deadline,
    time::{Clock, SystemClock},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    domain::ConnectionRegistry,
    usecase::{PeriodicBroadcast, Room, SocketRelay},
};

use super::{
    config::ServerConfig,
    handler::{echo_handler, health_check, relay_handler, room_handler, room_stats, server_time},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance using the system clock
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new Server instance with an injected clock
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let state = Arc::new(AppState {
            room: Arc::new(Room::new(config.room_id.clone())),
            relay: Arc::new(SocketRelay::new(Arc::new(ConnectionRegistry::new()))),
            clock,
            shutdown: CancellationToken::new(),
        });
        Self { config, state }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Build the router serving every endpoint
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/room/{room_id}", get(room_handler))
            .route("/ws", get(relay_handler))
            .route("/echo", get(echo_handler))
            // HTTP エンドポイント
            .route("/time", get(server_time))
            .route("/api/health", get(health_check))
            .route("/api/stats", get(room_stats))
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Hubbub relay server listening on {}", listener.local_addr()?);
        tracing::info!("Join the room at: ws://{}/room/{}", bind_addr, self.config.room_id);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// On shutdown the periodic broadcaster is cancelled and every room and
    /// relay connection is closed, both when `shutdown` resolves and again after
    /// axum has stopped. Sockets admitted later close themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting connections fails.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let token = self.state.shutdown.clone();

        let broadcaster = self.config.broadcast_interval.map(|period| {
            let deadline = Deadline::with_token(token.child_token(), Some(self.config.broadcast_for));
            let broadcast = PeriodicBroadcast::new(self.state.relay.registry().clone(), period);
            tokio::spawn(async move { broadcast.run(&deadline).await })
        });

        let state = self.state.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                token.cancel();
                state.close_all_connections().await;
            })
            .await?;

        // Upgrades that completed while axum was draining missed the first sweep
        self.state.close_all_connections().await;

        if let Some(broadcaster) = broadcaster
            && let Err(e) = broadcaster.await
        {
            tracing::error!("Periodic broadcast task failed: {}", e);
        }

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
