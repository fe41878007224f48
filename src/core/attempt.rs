//! # Run a single reconnect attempt.
//!
//! Calls [`Reconnect::reconnect`] once, contains a panic, and publishes the
//! attempt's lifecycle on the [`Bus`]:
//!
//! ```text
//! publish ReconnectStarting
//!   reconnect() → Ok(())  ──► publish Reconnected
//!               → Err(e)  ──► publish ReconnectFailed
//!               → panic   ──► AttemptError::ReconnectPanicked ──► publish ReconnectFailed
//! ```
//!
//! The attempt is never interrupted: cancellation is only observed between
//! attempts, by the retry loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::connection::ConnectionRef;
use crate::error::{AttemptError, BoxError, panic_message};
use crate::events::{Bus, Event, EventKind};

/// Executes attempt number `attempt` (1-based) against `conn`.
pub(crate) async fn attempt_once(
    conn: &ConnectionRef,
    addr: &Arc<str>,
    attempt: u32,
    bus: &Bus,
) -> Result<(), BoxError> {
    bus.publish(
        Event::new(EventKind::ReconnectStarting)
            .with_connection(Arc::clone(addr))
            .with_attempt(attempt),
    );

    let res = match AssertUnwindSafe(conn.reconnect()).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(Box::new(AttemptError::ReconnectPanicked {
            connection: Arc::clone(addr),
            info: panic_message(&*payload),
        }) as BoxError),
    };

    match &res {
        Ok(()) => bus.publish(
            Event::new(EventKind::Reconnected)
                .with_connection(Arc::clone(addr))
                .with_attempt(attempt),
        ),
        Err(e) => bus.publish(
            Event::new(EventKind::ReconnectFailed)
                .with_connection(Arc::clone(addr))
                .with_attempt(attempt)
                .with_reason(e.to_string()),
        ),
    }
    res
}
