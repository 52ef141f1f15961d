//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use super::connection::ConnectionId;

/// Failure reported by a socket half
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer closed the socket, or the stream ended
    #[error("connection closed by peer")]
    Closed,

    /// Any other I/O or protocol failure
    #[error("transport failure: {0}")]
    Io(String),
}

/// Connection lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// A closed connection was asked to become active again
    #[error("connection '{0}' is closed and cannot be reactivated")]
    Reactivation(ConnectionId),
}

/// Registry lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Not found: connection '{0}'")]
    ConnectionNotFound(ConnectionId),

    #[error("Not found: user '{0}'")]
    UserNotFound(Uuid),
}

/// Errors raised while decoding control messages from an inbound frame
#[derive(Debug, Error)]
pub enum ControlDecodeError {
    /// The frame is not valid JSON from this point on
    #[error("malformed JSON in frame: {0}")]
    Syntax(#[source] serde_json::Error),

    /// A JSON value was well-formed but not a control message
    #[error("unexpected control message shape: {0}")]
    Shape(#[source] serde_json::Error),
}
