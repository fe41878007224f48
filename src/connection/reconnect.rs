//! # Reconnectable connection capability.
//!
//! [`Reconnect`] is the only thing the supervisor asks of a worker's
//! connection. The worker keeps ownership in its own connection table and
//! hands out a [`ConnectionRef`] inside every [`DisconnectNotice`](crate::DisconnectNotice).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;

/// # Connection that can be re-established.
///
/// Implementations must be safe to call from several retry loops at once:
/// duplicate disconnect notices for one connection are not de-duplicated.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use reconnvisor::{BoxError, Reconnect};
///
/// struct Server { addr: String }
///
/// #[async_trait]
/// impl Reconnect for Server {
///     fn addr(&self) -> &str { &self.addr }
///
///     async fn reconnect(&self) -> Result<(), BoxError> {
///         // dial, handshake, re-register functions...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Reconnect: Send + Sync + 'static {
    /// Returns a stable, human-readable address of the remote end.
    fn addr(&self) -> &str;

    /// Attempts to restore the connection once.
    async fn reconnect(&self) -> Result<(), BoxError>;
}

/// Shared handle to a reconnectable connection.
pub type ConnectionRef = Arc<dyn Reconnect>;
