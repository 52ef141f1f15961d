//! Transport ports: the two halves of a duplex socket as seen by the domain.
//!
//! The infrastructure layer implements these for axum WebSockets. Tests use
//! mockall mocks or the channel-backed doubles in [`testing`].

use async_trait::async_trait;

use super::error::TransportError;

/// Write half of a socket
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSink: Send {
    /// Write one text frame holding the full payload
    async fn send_text(&mut self, payload: &str) -> Result<(), TransportError>;

    /// Send a close frame and release the socket
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of a socket
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next inbound text payload.
    ///
    /// Returns an error once the socket is closed or broken. Callers treat any
    /// error as a terminal disconnect.
    async fn next_frame(&mut self) -> Result<String, TransportError>;
}
