//! HTTP and WebSocket handlers.

pub mod http;
pub mod websocket;

pub use http::{health_check, room_stats, server_time};
pub use websocket::{echo_handler, relay_handler, room_handler};
