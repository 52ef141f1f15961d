//! Infrastructure layer: adapters between axum sockets and the domain ports.

pub mod dto;
pub mod websocket;

pub use websocket::{WebSocketSink, WebSocketSource, split};
