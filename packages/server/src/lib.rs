//! Hubbub relay server library.
//!
//! A WebSocket relay that tracks live connections in slot-reusing registries
//! and fans chat messages out to every other participant.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
