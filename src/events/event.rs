//! # Events emitted by the handler and its retry loops.
//!
//! The [`EventKind`] enum classifies events across three groups:
//! - **Classification**: what the handler did with a reported error;
//! - **Retry loop**: per-round progress of one disconnect episode;
//! - **Delivery**: problems delivering to the sink or to subscribers.
//!
//! Each event has a globally unique, monotonically increasing `seq`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use reconnvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_connection("127.0.0.1:4730")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(250));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.connection.as_deref(), Some("127.0.0.1:4730"));
//! assert_eq!(ev.delay_ms, Some(250));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Classification ===
    /// Ordinary error forwarded to the sink.
    ///
    /// Sets: `reason` (error message).
    ErrorForwarded,

    /// Error dropped because no sink is configured.
    ///
    /// Sets: `reason`, and `connection` when it concerned one.
    ErrorDiscarded,

    /// Disconnect notice received.
    ///
    /// Sets: `connection`, `reason` (disconnect cause).
    DisconnectReceived,

    /// Predicate declined the notice; no retry loop spawned.
    ///
    /// Sets: `connection`.
    ReconnectDeclined,

    /// No async runtime reachable; no retry loop spawned.
    ///
    /// Sets: `connection`, `reason`.
    LoopSpawnFailed,

    // === Retry loop ===
    /// Next attempt scheduled.
    ///
    /// Sets: `connection`, `attempt` (attempts made so far), `delay_ms`,
    /// `reason` (last failure, if any).
    BackoffScheduled,

    /// Reconnect attempt starting.
    ///
    /// Sets: `connection`, `attempt` (1-based).
    ReconnectStarting,

    /// Reconnect attempt failed.
    ///
    /// Sets: `connection`, `attempt`, `reason`.
    ReconnectFailed,

    /// Connection restored; loop ends silently.
    ///
    /// Sets: `connection`, `attempt`.
    Reconnected,

    /// Predicate stopped the loop while the connection was still down.
    ///
    /// Sets: `connection`, `attempt` (attempts made), `reason` (last failure, if any).
    ReconnectAbandoned,

    /// Loop cancelled by `Handler::shutdown`.
    ///
    /// Sets: `connection`, `attempt` (attempts made).
    LoopCancelled,

    // === Delivery ===
    /// Reconnect predicate panicked; treated as "stop".
    ///
    /// Sets: `connection`, `reason` (panic message).
    PredicatePanicked,

    /// Sink panicked while receiving an error.
    ///
    /// Sets: `reason` (panic message), and `connection` when known.
    SinkPanicked,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `connection` (subscriber name), `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `connection` (subscriber name), `reason`.
    SubscriberOverflow,
}

/// Supervisor event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Connection address (or subscriber name for subscriber events).
    pub connection: Option<Arc<str>>,
    /// Attempt number or count, depending on the kind.
    pub attempt: Option<u32>,
    /// Scheduled delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, panic messages, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            connection: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a connection address.
    #[inline]
    pub fn with_connection(mut self, addr: impl Into<Arc<str>>) -> Self {
        self.connection = Some(addr.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_connection(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_connection(subscriber)
            .with_reason(info)
    }

    /// Returns `true` for events produced by a retry loop.
    ///
    /// Classification and delivery events (including `PredicatePanicked`,
    /// which may come from the classifier gate) return `false`.
    pub fn is_retry_loop(&self) -> bool {
        matches!(
            self.kind,
            EventKind::BackoffScheduled
                | EventKind::ReconnectStarting
                | EventKind::ReconnectFailed
                | EventKind::Reconnected
                | EventKind::ReconnectAbandoned
                | EventKind::LoopCancelled
        )
    }
}
