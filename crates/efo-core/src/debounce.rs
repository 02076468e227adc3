//! Request-cancellation primitives: a monotonic [`Generation`] token and an
//! owned, single-slot [`Debouncer`] timer.
//!
//! Neither type aborts work at the transport level. A superseded request
//! still runs to completion; its reply carries a token that no longer
//! matches and the owner drops it.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Monotonically increasing token identifying the current request cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Start a new cycle and return its token. Every earlier token becomes
    /// stale.
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(self, token: u64) -> bool {
        self.0 == token
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// At most one pending timer. Scheduling replaces the previous timer;
/// dropping the debouncer cancels whatever is pending.
///
/// When the quiet period elapses the timer sends one message to the owner's
/// channel. The message is built from a ticket; the owner passes that ticket
/// back to [`Debouncer::fire`] to learn whether the timer is still the
/// current one. This rejects a message that was already queued when
/// [`Debouncer::cancel`] ran.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    tickets: Generation,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            tickets: Generation::default(),
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Cancel any pending timer and start a new one. Returns the new ticket.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<M, F>(&mut self, tx: &UnboundedSender<M>, make: F) -> u64
    where
        M: Send + 'static,
        F: FnOnce(u64) -> M,
    {
        self.abort_pending();
        let ticket = self.tickets.advance();
        let message = make(ticket);
        let tx = tx.clone();
        let quiet = self.quiet;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            // Receiver gone means the owner shut down.
            let _ = tx.send(message);
        }));
        tracing::trace!(ticket, quiet_ms = quiet.as_millis() as u64, "debounce: scheduled");
        ticket
    }

    /// Cancel the pending timer, including a message it already queued.
    pub fn cancel(&mut self) {
        if self.abort_pending() {
            tracing::trace!("debounce: cancelled");
        }
        self.tickets.advance();
    }

    /// Claim a fired ticket. Returns `true` exactly once for the current
    /// timer and `false` for anything stale.
    pub fn fire(&mut self, ticket: u64) -> bool {
        if !self.tickets.is_current(ticket) || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        true
    }

    /// Whether a timer is scheduled and not yet claimed.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn abort_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
