//! # Event bus for supervisor events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so the classifier and every retry
//! loop can publish without blocking and without knowing who listens.
//!
//! ```text
//! Publishers (many):                     Receivers:
//!   Handler::handle ──┐
//!   RetryLoop 1     ──┼──► Bus ──┬──► subscriber listener ──► SubscriberSet
//!   RetryLoop N     ──┘          └──► Handler::subscribe() receivers
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event is dropped.
//! - The ring buffer is shared by all receivers; laggards observe `RecvError::Lagged(n)`.
//! - Publishing is safe from any thread, including non-runtime worker threads.
//!
//! ## Capacity
//! A handler's bus is sized by `HandlerBuilder::with_bus_capacity` (default 1024).
//! A retry loop publishes three events per round, so a receiver that stalls for
//! `capacity / 3` rounds of one loop starts losing the oldest events:
//! - the subscriber listener skips the gap and keeps forwarding;
//! - a `Handler::subscribe()` receiver sees `Lagged(n)` once, then resumes.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for supervisor events.
///
/// ### Properties
/// - **Cheap to clone**: every retry loop carries its own clone.
/// - **Fire-and-forget**: nothing is persisted or acknowledged.
/// - **Late subscribers** only see events published after `subscribe()`.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding up to `capacity` undelivered events.
    ///
    /// ### Notes
    /// - `capacity` is clamped to at least 1.
    /// - The initial receiver is dropped; the bus starts with no listeners.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    ///
    /// A send error only means there are no receivers; the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
