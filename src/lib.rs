//! # reconnvisor
//!
//! **Reconnvisor** is a stubborn reconnect supervisor for job workers.
//!
//! It wraps a worker's error-reporting channel: when the worker loses its
//! connection to a job server, a detached retry loop keeps trying to
//! re-establish it until it succeeds or a caller-supplied predicate says
//! stop. Every other error goes straight to an optional fallback sink.
//!
//! ## Architecture
//! ```text
//!   external worker ── WorkerError ──► Handler::handle (classifier, never blocks)
//!                                          │
//!          ┌───────────────────────────────┼───────────────────────────────┐
//!          ▼                               ▼                               ▼
//!   Other(e) ─► ErrorSink          Disconnect(notice)             Disconnect(notice)
//!   (sync, verbatim)               predicate says no              predicate says yes
//!                                  ─► ReconnectDeclined           ─► spawn RetryLoop
//!                                                                      │
//!   loop {                                                             ▼
//!     ├─► predicate?          (pre-sleep)        ┌──────────────────────────────┐
//!     ├─► sleep(delay)        (cancellable)      │ Bus (broadcast) ─► Subscribers│
//!     ├─► predicate?          (post-sleep)       │   LogWriter, metrics, ...     │
//!     └─► connection.reconnect()                 └──────────────────────────────┘
//!           ├─ Ok  ─► done, silently
//!           └─ Err ─► next round
//!   }
//!   stopped by predicate after failures ─► ErrorSink(ReconnectAbandoned { last })
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Handler**       | Classify worker errors, spawn retry loops.               | [`Handler`], [`make_error_handler`]     |
//! | **Policies**      | Reconnect delay floor, back-off, jitter, stop predicate. | [`RetryPolicy`], [`BackoffPolicy`]      |
//! | **Connections**   | Abstract reconnect capability.                           | [`Reconnect`], [`ReconnectFn`]          |
//! | **Errors**        | Typed boundary errors.                                   | [`WorkerError`], [`SupervisorError`]    |
//! | **Subscriber API**| Observe retry progress (logging, metrics).               | [`Subscribe`], [`Event`]                |
//! | **Workers**       | Build a worker with the handler pre-installed.           | [`Worker`], [`new_stubborn_worker`]     |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber emitting `tracing` records.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use reconnvisor::{
//!     BoxError, DisconnectNotice, ReconnectFn, ReconnectSwitch, RetryPolicy, SupervisorError,
//!     WorkerError, make_error_handler,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let switch = ReconnectSwitch::new(true);
//!     let handler = make_error_handler(Some(
//!         RetryPolicy::new(Duration::from_millis(10))
//!             .with_should_reconnect(switch.clone())
//!             .with_error_sink(|err: SupervisorError| eprintln!("unhandled: {err}")),
//!     ));
//!
//!     // The worker reports a dead connection...
//!     let conn = ReconnectFn::arc("127.0.0.1:4730", || async { Ok::<_, BoxError>(()) });
//!     handler.handle(WorkerError::Disconnect(DisconnectNotice::new(conn, "EOF")));
//!
//!     // ...and an ordinary job error, forwarded to the sink right away.
//!     handler.handle(WorkerError::other("job failed"));
//!
//!     tokio::time::sleep(Duration::from_millis(20)).await;
//!     switch.disable();
//! }
//! ```
mod connection;
mod core;
mod error;
mod events;
mod policies;
mod sinks;
mod subscribers;
mod worker;

// ---- Public re-exports ----

pub use connection::{ConnectionRef, DisconnectNotice, Reconnect, ReconnectFn};
pub use core::{ErrorCallback, Handler, HandlerBuilder, LoopExit, RetryLoop, make_error_handler};
pub use error::{AttemptError, BoxError, SupervisorError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use policies::{
    BackoffPolicy, JitterPolicy, ReconnectSwitch, RetryPolicy, ShouldReconnect, ShouldReconnectRef,
};
pub use sinks::{Delivery, ErrorSink, ErrorSinkRef};
pub use subscribers::{Subscribe, SubscriberSet};
pub use worker::{UNLIMITED, Worker, new_stubborn_worker};

// Optional: structured logging subscriber.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
