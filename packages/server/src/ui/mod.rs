//! UI layer: configuration, HTTP routes and WebSocket endpoints.

pub mod config;
pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use config::ServerConfig;
pub use server::Server;
pub use state::AppState;
