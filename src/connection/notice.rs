//! # Disconnect notification.
//!
//! A [`DisconnectNotice`] is created by the worker at the moment it detects a
//! dead connection. The classifier consumes it once; the retry loop then keeps
//! it (and therefore the [`ConnectionRef`]) for its whole lifetime so the
//! predicate can inspect it on every round.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::connection::ConnectionRef;
use crate::error::BoxError;

/// Disconnect notification carrying the connection to repair.
pub struct DisconnectNotice {
    connection: ConnectionRef,
    cause: Arc<dyn Error + Send + Sync + 'static>,
}

impl DisconnectNotice {
    /// Creates a notice for `connection` with the underlying `cause`.
    pub fn new(connection: ConnectionRef, cause: impl Into<BoxError>) -> Self {
        Self {
            connection,
            cause: Arc::from(cause.into()),
        }
    }

    /// Connection that failed.
    pub fn connection(&self) -> &ConnectionRef {
        &self.connection
    }

    /// Address of the connection that failed.
    pub fn addr(&self) -> &str {
        self.connection.addr()
    }

    /// Underlying error that caused the disconnect.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Shares the cause as an owned [`BoxError`] with the same message and source chain.
    pub(crate) fn cause_boxed(&self) -> BoxError {
        Box::new(SharedCause(Arc::clone(&self.cause)))
    }
}

/// Owned view of a shared cause; delegates `Display` and `source`.
#[derive(Debug)]
struct SharedCause(Arc<dyn Error + Send + Sync + 'static>);

impl fmt::Display for SharedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for SharedCause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl Clone for DisconnectNotice {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            cause: Arc::clone(&self.cause),
        }
    }
}

impl fmt::Debug for DisconnectNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisconnectNotice")
            .field("addr", &self.addr())
            .field("cause", &self.cause.to_string())
            .finish()
    }
}

impl fmt::Display for DisconnectNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lost connection to {}: {}", self.addr(), self.cause)
    }
}
