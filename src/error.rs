//! Error types crossing the handler boundary.
//!
//! This module defines:
//!
//! - [`WorkerError`]: what the external worker reports into the [`Handler`](crate::Handler).
//!   It is a sum type: a [`DisconnectNotice`] that drives a retry loop, or any other error.
//! - [`SupervisorError`]: what the fallback [`ErrorSink`](crate::ErrorSink) receives.
//!
//! Both provide `as_label` for logs/metrics.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use crate::connection::DisconnectNotice;

/// Opaque error type used by external collaborators (connections, workers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors reported by the external worker.
///
/// The classifier is a plain `match` over this enum:
/// - [`WorkerError::Disconnect`] is recoverable and handed to a retry loop;
/// - [`WorkerError::Other`] is forwarded verbatim to the sink, never retried.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// A live connection to the job server was lost.
    #[error("worker disconnected: {0}")]
    Disconnect(DisconnectNotice),

    /// Any other error; opaque to the supervisor.
    #[error(transparent)]
    Other(BoxError),
}

impl WorkerError {
    /// Wraps an arbitrary error as [`WorkerError::Other`].
    pub fn other(err: impl Into<BoxError>) -> Self {
        WorkerError::Other(err.into())
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Disconnect(_) => "worker_disconnect",
            WorkerError::Other(_) => "worker_other",
        }
    }
}

impl From<DisconnectNotice> for WorkerError {
    fn from(notice: DisconnectNotice) -> Self {
        WorkerError::Disconnect(notice)
    }
}

/// # Errors delivered to the fallback sink.
///
/// Only errors the supervisor could not absorb end up here:
/// ordinary worker errors, and the single final error of a disconnect
/// episode that the policy stopped while still disconnected.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// Ordinary worker error, forwarded verbatim.
    #[error(transparent)]
    Worker(BoxError),

    /// The policy stopped retrying while the connection was still broken.
    #[error("reconnect to {connection} abandoned after {attempts} attempt(s): {last}")]
    ReconnectAbandoned {
        /// Address of the connection that stayed down.
        connection: Arc<str>,
        /// Number of reconnect attempts made (always `>= 1`).
        attempts: u32,
        /// Error returned by the last attempt.
        #[source]
        last: BoxError,
    },

    /// A disconnect arrived but no async runtime was reachable to host the retry loop.
    #[error("no async runtime available to supervise reconnect of {connection}: {cause}")]
    RuntimeUnavailable {
        /// Address of the connection that was not supervised.
        connection: Arc<str>,
        /// The original disconnect cause.
        #[source]
        cause: BoxError,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use reconnvisor::SupervisorError;
    ///
    /// let err = SupervisorError::Worker("boom".into());
    /// assert_eq!(err.as_label(), "worker_error");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::Worker(_) => "worker_error",
            SupervisorError::ReconnectAbandoned { .. } => "reconnect_abandoned",
            SupervisorError::RuntimeUnavailable { .. } => "runtime_unavailable",
        }
    }

    /// Returns the connection address this error concerns, if any.
    pub fn connection(&self) -> Option<&str> {
        match self {
            SupervisorError::Worker(_) => None,
            SupervisorError::ReconnectAbandoned { connection, .. }
            | SupervisorError::RuntimeUnavailable { connection, .. } => Some(connection),
        }
    }
}

/// # Errors produced by a single reconnect attempt.
///
/// Wraps failures that did not come from the connection's own error path.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AttemptError {
    /// The reconnect future panicked; the panic was contained.
    #[error("reconnect to {connection} panicked: {info}")]
    ReconnectPanicked {
        /// Address of the connection.
        connection: Arc<str>,
        /// Panic payload rendered as text.
        info: String,
    },
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ReconnectFn;
    use std::error::Error as _;

    #[test]
    fn test_other_is_transparent() {
        let err = WorkerError::other("job blew up");
        assert_eq!(err.to_string(), "job blew up");
        assert_eq!(err.as_label(), "worker_other");
    }

    #[test]
    fn test_disconnect_display_includes_cause() {
        let conn = ReconnectFn::arc("127.0.0.1:4730", || async { Ok::<_, BoxError>(()) });
        let err = WorkerError::from(DisconnectNotice::new(conn, "connection reset"));
        assert_eq!(err.as_label(), "worker_disconnect");
        assert!(err.to_string().contains("connection reset"));
        assert!(err.to_string().contains("127.0.0.1:4730"));
    }

    #[test]
    fn test_abandoned_exposes_last_error_as_source() {
        let err = SupervisorError::ReconnectAbandoned {
            connection: "10.0.0.1:4730".into(),
            attempts: 3,
            last: "refused".into(),
        };
        assert_eq!(err.as_label(), "reconnect_abandoned");
        assert_eq!(err.connection(), Some("10.0.0.1:4730"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("refused"));
    }
}
