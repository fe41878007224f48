//! # Handler: the error callback installed into a worker.
//!
//! [`Handler::handle`] classifies every error the worker reports:
//!
//! ```text
//! handle(WorkerError)
//!   ├─ Other(e)          ──► sink(SupervisorError::Worker(e))   (synchronous, no retry)
//!   └─ Disconnect(n)     ──► publish DisconnectReceived
//!        ├─ predicate(n) == false ──► publish ReconnectDeclined (nothing spawned)
//!        ├─ predicate(n) panics   ──► publish PredicatePanicked + ReconnectDeclined
//!        ├─ no runtime            ──► sink(RuntimeUnavailable)
//!        └─ runtime.spawn(RetryLoop::run(child token))        (detached)
//! ```
//!
//! `handle` never blocks and never awaits; it is safe to call from the
//! worker's own threads, including threads outside the tokio runtime as long
//! as the handler was built with (or inside) one.
//!
//! ## Lifetime
//! - `shutdown()` cancels in-flight loops at their next sleep and stops the
//!   subscriber workers.
//! - Dropping the last clone stops the subscriber workers too; retry loops
//!   already running keep going until they finish.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::connection::DisconnectNotice;
use crate::core::builder::HandlerBuilder;
use crate::core::report::report;
use crate::core::retry_loop::RetryLoop;
use crate::error::{SupervisorError, WorkerError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::{RetryPolicy, Verdict};

/// Error callback in the shape external workers expect.
pub type ErrorCallback = Arc<dyn Fn(WorkerError) + Send + Sync>;

/// Reconnect supervisor for one worker. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<Inner>,
}

struct Inner {
    policy: RetryPolicy,
    bus: Bus,
    runtime: Option<Handle>,
    /// Parent of every retry loop's token.
    token: CancellationToken,
    /// Stops the subscriber listener.
    listener: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

impl Handler {
    /// Returns a builder for a handler with subscribers or an explicit runtime.
    pub fn builder() -> HandlerBuilder {
        HandlerBuilder::new()
    }

    /// Creates a handler from an optional policy.
    ///
    /// Equivalent to [`make_error_handler`](crate::make_error_handler).
    pub fn new(policy: Option<RetryPolicy>) -> Self {
        HandlerBuilder::new().with_policy(policy).build()
    }

    pub(crate) fn from_parts(
        policy: RetryPolicy,
        bus: Bus,
        runtime: Option<Handle>,
        listener: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                bus,
                runtime,
                token: CancellationToken::new(),
                listener,
            }),
        }
    }

    /// Handles one error reported by the worker.
    pub fn handle(&self, err: WorkerError) {
        match err {
            WorkerError::Other(err) => {
                report(
                    &self.inner.policy,
                    &self.inner.bus,
                    SupervisorError::Worker(err),
                );
            }
            WorkerError::Disconnect(notice) => self.supervise(notice),
        }
    }

    /// Finalized policy in use; `reconnect_delay` is never zero.
    pub fn policy(&self) -> &RetryPolicy {
        &self.inner.policy
    }

    /// Subscribes to the handler's event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Cancels every in-flight retry loop at its next back-off sleep and
    /// stops the subscriber workers.
    ///
    /// Loops spawned afterwards end at their first sleep. Cancelled loops
    /// report nothing to the sink.
    pub fn shutdown(&self) {
        self.inner.token.cancel();
        self.inner.listener.cancel();
    }

    /// Returns `true` once [`Handler::shutdown`] has been called.
    pub fn is_shutdown(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Returns the handler as a plain callback.
    pub fn as_callback(&self) -> ErrorCallback {
        let handler = self.clone();
        Arc::new(move |err: WorkerError| handler.handle(err))
    }

    fn supervise(&self, notice: DisconnectNotice) {
        let addr: Arc<str> = Arc::from(notice.addr());
        self.inner.bus.publish(
            Event::new(EventKind::DisconnectReceived)
                .with_connection(Arc::clone(&addr))
                .with_reason(notice.cause().to_string()),
        );

        match self.inner.policy.verdict(&notice) {
            Verdict::Retry => {}
            Verdict::Stop => {
                self.inner
                    .bus
                    .publish(Event::new(EventKind::ReconnectDeclined).with_connection(addr));
                return;
            }
            Verdict::Panicked(info) => {
                self.inner.bus.publish(
                    Event::new(EventKind::PredicatePanicked)
                        .with_connection(Arc::clone(&addr))
                        .with_reason(info),
                );
                self.inner
                    .bus
                    .publish(Event::new(EventKind::ReconnectDeclined).with_connection(addr));
                return;
            }
        }

        let Some(runtime) = self.runtime() else {
            self.inner.bus.publish(
                Event::new(EventKind::LoopSpawnFailed)
                    .with_connection(Arc::clone(&addr))
                    .with_reason("no tokio runtime"),
            );
            report(
                &self.inner.policy,
                &self.inner.bus,
                SupervisorError::RuntimeUnavailable {
                    connection: addr,
                    cause: notice.cause_boxed(),
                },
            );
            return;
        };

        let retry = RetryLoop::new(notice, self.inner.policy.clone(), self.inner.bus.clone());
        drop(runtime.spawn(retry.run(self.inner.token.child_token())));
    }

    fn runtime(&self) -> Option<Handle> {
        self.inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("policy", &self.inner.policy)
            .field("has_runtime", &self.inner.runtime.is_some())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
