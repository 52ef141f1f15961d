//! Error types for the Hubbub client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered the handshake with an HTTP error (e.g. unknown room)
    #[error("Server rejected the connection with HTTP {0}")]
    Rejected(u16),

    /// Connection could not be established
    #[error("Connection error: {0}")]
    ConnectionError(#[from] tokio_tungstenite::tungstenite::Error),

    /// An established connection was lost
    #[error("Connection lost")]
    ConnectionLost,

    /// Every reconnect attempt failed
    #[error("Failed to reconnect after {0} attempts")]
    ReconnectExhausted(u32),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether reconnecting could help
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(_) | Self::Encode(_))
    }
}
