//! Utilities shared by the Hubbub server and client.

pub mod interval;
pub mod logger;
pub mod time;
