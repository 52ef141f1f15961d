//! Server configuration.

use std::{path::PathBuf, time::Duration};

/// Runtime configuration of the relay server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port number to bind to (e.g., 8181)
    pub port: u16,
    /// Directory served for every path without a route
    pub static_dir: PathBuf,
    /// The only room id served under `/room/{room_id}`
    pub room_id: String,
    /// Period of the relay broadcaster; disabled when `None`
    pub broadcast_interval: Option<Duration>,
    /// How long the broadcaster runs before stopping on its own
    pub broadcast_for: Duration,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8181,
            static_dir: PathBuf::from("web/static"),
            room_id: "1".to_string(),
            broadcast_interval: None,
            broadcast_for: Duration::from_secs(100),
        }
    }
}
