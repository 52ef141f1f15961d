//! Shared application state.

use std::sync::Arc;

use hubbub_shared::time::Clock;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{FrameSink, FrameSource},
    usecase::{Room, SocketRelay},
};

/// Shared application state
pub struct AppState {
    /// The chat room served under `/room/{room_id}`
    pub room: Arc<Room>,
    /// Raw relay served under `/ws`
    pub relay: Arc<SocketRelay>,
    /// Clock used by `/time`
    pub clock: Arc<dyn Clock>,
    /// Cancelled once the server starts shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Admit an upgraded socket into the room.
    ///
    /// A socket admitted after shutdown began is closed right away, since the
    /// shutdown sweep may already have run.
    pub async fn join_room(&self, sink: Box<dyn FrameSink>, source: Box<dyn FrameSource>) {
        let (user, _) = self.room.accept_connection(sink, source).await;
        if self.shutdown.is_cancelled() {
            tracing::info!("Closing '{}', server is shutting down", user);
            if let Err(e) = self.room.remove_user(&user).await {
                tracing::warn!("Failed to close late room connection: {}", e);
            }
        }
    }

    /// Admit an upgraded socket into the raw relay.
    pub async fn join_relay(&self, sink: Box<dyn FrameSink>, source: Box<dyn FrameSource>) {
        let (connection, _) = self.relay.accept_connection(sink, source).await;
        if self.shutdown.is_cancelled() {
            tracing::info!("Closing relay connection '{}', server is shutting down", connection.id());
            if let Err(e) = self.relay.registry().remove_connection(&connection).await {
                tracing::warn!("Failed to close late relay connection: {}", e);
            }
        }
    }

    /// Close every room and relay connection
    pub async fn close_all_connections(&self) {
        self.room.close_all_connections().await;
        self.relay.registry().close_all().await;
    }
}
