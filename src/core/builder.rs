//! # Supervisor factory.
//!
//! [`HandlerBuilder`] turns an optional [`RetryPolicy`] into a ready
//! [`Handler`]. [`make_error_handler`] is the one-line form.
//!
//! Building has no side effects on connections or the worker. It does:
//! - finalize the policy (zero delay → 250ms);
//! - capture the current tokio runtime, unless one is given explicitly;
//! - start the subscriber workers, if any subscribers were given.
//!
//! The subscriber listener runs until the handler is shut down or its last
//! clone is dropped; it then drains the subscriber queues and exits.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::core::handler::Handler;
use crate::events::Bus;
use crate::policies::RetryPolicy;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builds a [`Handler`] from an optional policy.
///
/// With `None`, the default policy is used: 250ms between attempts, retry
/// until success, errors dropped.
///
/// # Example
/// ```
/// use reconnvisor::{make_error_handler, WorkerError};
///
/// let handler = make_error_handler(None);
/// handler.handle(WorkerError::other("job failed")); // silently dropped: no sink
/// ```
pub fn make_error_handler(policy: Option<RetryPolicy>) -> Handler {
    HandlerBuilder::new().with_policy(policy).build()
}

/// Builder for a [`Handler`] with optional subscribers and runtime.
pub struct HandlerBuilder {
    policy: Option<RetryPolicy>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    bus_capacity: usize,
    runtime: Option<Handle>,
}

impl HandlerBuilder {
    /// Default capacity of the event bus.
    pub const DEFAULT_BUS_CAPACITY: usize = 1024;

    /// Creates a builder with the default policy and no subscribers.
    pub fn new() -> Self {
        Self {
            policy: None,
            subscribers: Vec::new(),
            bus_capacity: Self::DEFAULT_BUS_CAPACITY,
            runtime: None,
        }
    }

    /// Sets the retry policy (`None` = default).
    pub fn with_policy(mut self, policy: impl Into<Option<RetryPolicy>>) -> Self {
        self.policy = policy.into();
        self
    }

    /// Sets event subscribers (logging, metrics, alerts).
    ///
    /// Subscriber workers need a runtime: without one they are not started.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the event bus capacity (clamped to at least 1).
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Uses `runtime` to host retry loops and subscriber workers.
    ///
    /// Needed when the handler is built outside a runtime but invoked from
    /// worker threads that are not runtime threads either.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the handler.
    pub fn build(self) -> Handler {
        let policy = self.policy.unwrap_or_default().finalized();
        let bus = Bus::new(self.bus_capacity);
        let runtime = self.runtime.or_else(|| Handle::try_current().ok());
        let listener = CancellationToken::new();

        if let Some(rt) = &runtime {
            if !self.subscribers.is_empty() {
                let set = SubscriberSet::new(self.subscribers, bus.clone(), rt);
                subscriber_listener(rt, &bus, set, listener.clone());
            }
        }

        Handler::from_parts(policy, bus, runtime, listener)
    }
}

impl Default for HandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled.
///
/// ### Notes
/// - The set holds a bus clone for overflow/panic events, so the bus never
///   closes while the listener runs; `token` is the only way out.
/// - Events already buffered when `token` fires are still delivered.
fn subscriber_listener(runtime: &Handle, bus: &Bus, set: SubscriberSet, token: CancellationToken) {
    let mut rx = bus.subscribe();
    runtime.spawn(async move {
        loop {
            select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(ev);
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    });
}
