//! Hubbub CLI chat client.
//!
//! Joins a relay room, sends stdin lines as chat messages and prints every
//! relayed message with a local timestamp.

pub mod error;
pub mod formatter;
pub mod message;
pub mod runner;
pub mod session;
pub mod ui;

pub use error::ClientError;
pub use runner::run_client;
