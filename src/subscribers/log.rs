//! # Structured logging subscriber.
//!
//! [`LogWriter`] turns supervisor events into `tracing` records. It does not
//! install a tracing subscriber; the application decides where records go.
//!
//! | Event                                   | Level   |
//! |-----------------------------------------|---------|
//! | `Reconnected`                           | `info`  |
//! | `ReconnectFailed`, `ReconnectAbandoned` | `warn`  |
//! | `LoopSpawnFailed`, `*Panicked`          | `error` |
//! | other retry-loop and classifier events  | `debug` |

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that logs every event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let conn = e.connection.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::Reconnected => {
                tracing::info!(seq = e.seq, connection = conn, attempt = e.attempt, "reconnected");
            }
            EventKind::ReconnectFailed => {
                tracing::warn!(
                    seq = e.seq,
                    connection = conn,
                    attempt = e.attempt,
                    error = reason,
                    "reconnect attempt failed"
                );
            }
            EventKind::ReconnectAbandoned => {
                tracing::warn!(
                    seq = e.seq,
                    connection = conn,
                    attempts = e.attempt,
                    error = reason,
                    "reconnect abandoned by policy"
                );
            }
            EventKind::LoopSpawnFailed
            | EventKind::PredicatePanicked
            | EventKind::SinkPanicked
            | EventKind::SubscriberPanicked => {
                tracing::error!(seq = e.seq, kind = ?e.kind, connection = conn, reason, "supervisor fault");
            }
            EventKind::BackoffScheduled => {
                tracing::debug!(
                    seq = e.seq,
                    connection = conn,
                    after_attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    "reconnect scheduled"
                );
            }
            _ if e.is_retry_loop() => {
                tracing::debug!(seq = e.seq, kind = ?e.kind, connection = conn, attempt = e.attempt, reason, "retry loop");
            }
            _ => {
                tracing::debug!(seq = e.seq, kind = ?e.kind, connection = conn, reason, "supervisor event");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
