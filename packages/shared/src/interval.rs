//! Periodic task execution driven by a cancellable deadline.
//!
//! [`do_every`] is a generic scheduling helper: it calls a closure with the
//! current time once per period until its [`Deadline`] is cancelled or expires,
//! then reports why it stopped.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Why a periodic task stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StopReason {
    /// The deadline's token was cancelled
    #[error("periodic task cancelled")]
    Cancelled,
    /// The deadline passed
    #[error("periodic task deadline exceeded")]
    DeadlineExceeded,
}

/// A cancellation token with an optional absolute deadline.
///
/// Clones share the same token, so cancelling any clone stops every task
/// waiting on it.
#[derive(Debug, Clone)]
pub struct Deadline {
    token: CancellationToken,
    at: Option<Instant>,
}

impl Deadline {
    /// Create a deadline that expires after `timeout`, or never when `None`
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::with_token(CancellationToken::new(), timeout)
    }

    /// Create a deadline tied to an existing token (e.g. a server shutdown token)
    pub fn with_token(token: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            token,
            at: timeout.map(|timeout| Instant::now() + timeout),
        }
    }

    /// Cancel every task waiting on this deadline
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The reason this deadline is already done, if it is
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.token.is_cancelled() {
            Some(StopReason::Cancelled)
        } else if self.at.is_some_and(|at| Instant::now() >= at) {
            Some(StopReason::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Wait until the deadline is cancelled or expires
    pub async fn done(&self) -> StopReason {
        match self.at {
            Some(at) => tokio::select! {
                biased;
                _ = self.token.cancelled() => StopReason::Cancelled,
                _ = tokio::time::sleep_until(at) => StopReason::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                StopReason::Cancelled
            }
        }
    }
}

/// Run `f(now)` every `period` until `deadline` is done.
///
/// The first call happens one full period after start. Ticks missed while `f`
/// is still running are skipped rather than replayed.
///
/// # Panics
///
/// Panics if `period` is zero.
pub async fn do_every<F, Fut>(deadline: &Deadline, period: Duration, mut f: F) -> StopReason
where
    F: FnMut(DateTime<Utc>) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            reason = deadline.done() => return reason,
            _ = ticker.tick() => f(Utc::now()).await,
        }
    }
}
