//! Domain layer: connections, their registries and the broadcast engine.
//!
//! Nothing in this layer knows about axum. Sockets reach it only through the
//! [`FrameSink`] and [`FrameSource`] ports defined in [`transport`].

pub mod broadcast;
pub mod connection;
pub mod control;
pub mod error;
pub mod registry;
pub mod slots;
pub mod transport;
pub mod user;

pub use broadcast::{BroadcastReport, DeliveryFailure, deliver};
pub use connection::{Connection, ConnectionId};
pub use control::{ChatContent, ControlMessage, CreateRequest, ErrorReport, decode_frame};
pub use error::{ConnectionError, ControlDecodeError, RegistryError, TransportError};
pub use registry::ConnectionRegistry;
pub use slots::{Occupant, SlotArena, VacancyNotice};
pub use transport::{FrameSink, FrameSource};
pub use user::User;
