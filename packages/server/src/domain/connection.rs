//! Connection: the addressable unit wrapping one client's socket sink.
//!
//! A connection has two flags:
//!
//! - `open`: whether the sink is still held. It only ever goes from `true` to
//!   `false`, and only inside [`Connection::close`] under the sink lock.
//! - `active`: whether registries should deliver to it. A closed connection is
//!   never active. An open one can be toggled with [`Connection::set_active`].
//!
//! Every transition to inactive posts the connection's slot in each registry
//! holding it as vacant. Closing also fires [`Connection::closed`], which read
//! loops watch so a closed connection stops reading as well as writing.

use std::{
    fmt,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::{
    error::{ConnectionError, TransportError},
    slots::{Occupant, VacancyNotice},
    transport::FrameSink,
};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection identifier, used in logs and failure reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

pub struct Connection {
    id: ConnectionId,
    open: AtomicBool,
    active: AtomicBool,
    /// Serializes writes and the close transition
    sink: Mutex<Option<Box<dyn FrameSink>>>,
    /// Cancelled once, on the open to closed transition
    close_signal: CancellationToken,
    vacancy_notices: parking_lot::Mutex<Vec<VacancyNotice>>,
}

impl Connection {
    /// Wrap a freshly upgraded socket sink in an open, active connection
    pub fn new(sink: Box<dyn FrameSink>) -> Self {
        Self {
            id: ConnectionId::next(),
            open: AtomicBool::new(true),
            active: AtomicBool::new(true),
            sink: Mutex::new(Some(sink)),
            close_signal: CancellationToken::new(),
            vacancy_notices: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Lock-free check used by registries
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Whether the socket sink is still held
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Resolve once the connection has been closed
    pub async fn closed(&self) {
        self.close_signal.cancelled().await;
    }

    /// Write `payload` as a single text frame.
    ///
    /// Sending to an inactive connection succeeds without touching the socket.
    pub async fn send(&self, payload: &str) -> Result<(), TransportError> {
        if !self.is_active() {
            return Ok(());
        }

        let mut sink = self.sink.lock().await;
        // closed or deactivated while waiting for the lock
        if !self.is_active() {
            return Ok(());
        }
        match sink.as_mut() {
            Some(sink) => sink.send_text(payload).await,
            None => Ok(()),
        }
    }

    /// Close the connection and release its socket. Idempotent, never fails.
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        if !self.open.swap(false, Ordering::AcqRel) {
            return;
        }
        self.deactivate();
        self.close_signal.cancel();

        if let Some(mut sink) = sink.take()
            && let Err(e) = sink.close().await
        {
            tracing::debug!("Error while closing connection '{}': {}", self.id, e);
        }
        tracing::debug!("Connection '{}' closed", self.id);
    }

    /// Toggle delivery without releasing the socket.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Reactivation`] when asked to activate a
    /// connection that has already been closed.
    pub async fn set_active(&self, active: bool) -> Result<(), ConnectionError> {
        let _sink = self.sink.lock().await;
        if active {
            if !self.is_open() {
                return Err(ConnectionError::Reactivation(self.id));
            }
            self.active.store(true, Ordering::Release);
        } else {
            self.deactivate();
        }
        Ok(())
    }

    fn deactivate(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            for notice in self.vacancy_notices.lock().iter() {
                notice.post();
            }
        }
    }
}

impl Occupant for Connection {
    fn is_active(&self) -> bool {
        Connection::is_active(self)
    }

    fn on_vacate(&self, notice: VacancyNotice) {
        self.vacancy_notices.lock().push(notice);
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .field("active", &self.is_active())
            .finish()
    }
}
