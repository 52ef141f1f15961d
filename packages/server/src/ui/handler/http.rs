//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use hubbub_shared::time::to_rfc3339_micros;

use crate::{infrastructure::dto::StatsDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current server time as RFC 3339 text
pub async fn server_time(State(state): State<Arc<AppState>>) -> String {
    to_rfc3339_micros(&state.clock.now())
}

/// Occupancy of the room and the raw relay
pub async fn room_stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    let registry = state.relay.registry();
    Json(StatsDto {
        room_id: state.room.id().to_string(),
        room_users: state.room.user_count().await,
        room_active_users: state.room.active_user_count().await,
        relay_connections: registry.len().await,
        relay_active_connections: registry.active_count().await,
    })
}
