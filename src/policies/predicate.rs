//! # Reconnect predicate.
//!
//! [`ShouldReconnect`] is the only cooperative way to stop an in-flight retry
//! loop. It is shared by every loop spawned from one handler and called
//! concurrently and repeatedly, so any state it closes over must carry its own
//! synchronization. The supervisor never holds a lock while calling it.
//!
//! A predicate that panics is treated as a "stop": the panic is caught, never
//! reaches the worker, and ends the retry loop like a `false` answer would.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::connection::DisconnectNotice;
use crate::error::panic_message;

/// Decides whether a disconnected connection should (still) be retried.
///
/// Implemented for every `Fn(&DisconnectNotice) -> bool + Send + Sync`.
///
/// # Example
/// ```
/// use reconnvisor::{DisconnectNotice, RetryPolicy};
///
/// let policy = RetryPolicy::default()
///     .with_should_reconnect(|n: &DisconnectNotice| !n.addr().starts_with("10.9."));
/// assert!(policy.should_reconnect.is_some());
/// ```
pub trait ShouldReconnect: Send + Sync + 'static {
    /// Returns `true` while the connection in `notice` should be retried.
    fn should_reconnect(&self, notice: &DisconnectNotice) -> bool;
}

impl<F> ShouldReconnect for F
where
    F: Fn(&DisconnectNotice) -> bool + Send + Sync + 'static,
{
    fn should_reconnect(&self, notice: &DisconnectNotice) -> bool {
        self(notice)
    }
}

/// Shared handle to a predicate.
pub type ShouldReconnectRef = Arc<dyn ShouldReconnect>;

/// Outcome of one predicate call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Keep retrying.
    Retry,
    /// Stop retrying.
    Stop,
    /// The predicate panicked; treated as [`Verdict::Stop`].
    Panicked(String),
}

impl Verdict {
    /// Returns `true` only for [`Verdict::Retry`].
    #[inline]
    pub(crate) fn allows(&self) -> bool {
        matches!(self, Verdict::Retry)
    }
}

/// Calls `predicate`, containing any panic.
pub(crate) fn consult(predicate: &dyn ShouldReconnect, notice: &DisconnectNotice) -> Verdict {
    match catch_unwind(AssertUnwindSafe(|| predicate.should_reconnect(notice))) {
        Ok(true) => Verdict::Retry,
        Ok(false) => Verdict::Stop,
        Err(payload) => Verdict::Panicked(panic_message(&*payload)),
    }
}

/// Process-wide on/off switch usable as a predicate.
///
/// Clones share the same flag: keep one clone to flip, install another.
///
/// # Example
/// ```
/// use reconnvisor::{ReconnectSwitch, RetryPolicy};
///
/// let switch = ReconnectSwitch::new(true);
/// let policy = RetryPolicy::default().with_should_reconnect(switch.clone());
///
/// // Later, e.g. during shutdown: every loop stops at its next check.
/// switch.disable();
/// assert!(!switch.is_enabled());
/// # drop(policy);
/// ```
#[derive(Clone, Debug)]
pub struct ReconnectSwitch {
    enabled: Arc<AtomicBool>,
}

impl ReconnectSwitch {
    /// Creates a switch in the given state.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Allows retry loops to continue.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Makes every loop stop at its next check.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Returns the current state.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl Default for ReconnectSwitch {
    /// Returns an enabled switch.
    fn default() -> Self {
        Self::new(true)
    }
}

impl ShouldReconnect for ReconnectSwitch {
    fn should_reconnect(&self, _notice: &DisconnectNotice) -> bool {
        self.is_enabled()
    }
}
