//! # Retry policy.
//!
//! [`RetryPolicy`] is the configuration bundle of one handler: the reconnect
//! delay, how it grows, the predicate that may stop retrying, and the fallback
//! sink. It is built once, finalized by the factory, and then shared read-only
//! by every retry loop the handler spawns.
//!
//! ## Sentinel values
//! - `reconnect_delay = 0` → [`RetryPolicy::DEFAULT_RECONNECT_DELAY`] (a zero
//!   delay would hammer a server that just dropped the connection)
//! - `should_reconnect = None` → retry until success
//! - `error_sink = None` → errors are silently dropped
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use reconnvisor::{DisconnectNotice, RetryPolicy, SupervisorError};
//!
//! let policy = RetryPolicy::new(Duration::ZERO)
//!     .with_should_reconnect(|_: &DisconnectNotice| true)
//!     .with_error_sink(|err: SupervisorError| eprintln!("worker error: {err}"));
//!
//! assert_eq!(policy.effective_delay(), Duration::from_millis(250));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::connection::DisconnectNotice;
use crate::error::SupervisorError;
use crate::policies::backoff::BackoffPolicy;
use crate::policies::predicate::{ShouldReconnect, ShouldReconnectRef, Verdict, consult};
use crate::sinks::{Delivery, ErrorSink, ErrorSinkRef, deliver};

/// Reconnect configuration shared by all retry loops of one handler.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Minimum wait before every reconnect attempt, including the first.
    ///
    /// Zero is replaced by [`RetryPolicy::DEFAULT_RECONNECT_DELAY`].
    pub reconnect_delay: Duration,

    /// Growth of the wait across rounds; `reconnect_delay` is its floor.
    pub backoff: BackoffPolicy,

    /// Optional predicate; `None` retries until success.
    pub should_reconnect: Option<ShouldReconnectRef>,

    /// Optional fallback sink; `None` drops errors.
    pub error_sink: Option<ErrorSinkRef>,
}

impl RetryPolicy {
    /// Delay used when none (or zero) is configured.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(250);

    /// Creates a policy with the given reconnect delay and defaults elsewhere.
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            reconnect_delay,
            ..Self::default()
        }
    }

    /// Replaces the back-off policy.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Installs the reconnect predicate.
    pub fn with_should_reconnect(mut self, predicate: impl ShouldReconnect) -> Self {
        self.should_reconnect = Some(Arc::new(predicate));
        self
    }

    /// Installs the fallback error sink.
    pub fn with_error_sink(mut self, sink: impl ErrorSink) -> Self {
        self.error_sink = Some(Arc::new(sink));
        self
    }

    /// Returns the reconnect delay actually used; never zero.
    #[inline]
    pub fn effective_delay(&self) -> Duration {
        if self.reconnect_delay.is_zero() {
            Self::DEFAULT_RECONNECT_DELAY
        } else {
            self.reconnect_delay
        }
    }

    /// Returns the wait before round `round` (0-indexed).
    #[inline]
    pub fn delay_for(&self, round: u32) -> Duration {
        self.backoff.next(self.effective_delay(), round)
    }

    /// Asks the predicate whether `notice` should (still) be retried.
    ///
    /// A panicking predicate answers `false`; the panic does not propagate.
    #[inline]
    pub fn allows_reconnect(&self, notice: &DisconnectNotice) -> bool {
        self.verdict(notice).allows()
    }

    /// Like [`RetryPolicy::allows_reconnect`], but tells a panic apart from `false`.
    pub(crate) fn verdict(&self, notice: &DisconnectNotice) -> Verdict {
        match &self.should_reconnect {
            Some(predicate) => consult(predicate.as_ref(), notice),
            None => Verdict::Retry,
        }
    }

    /// Hands `err` to the sink, if one is configured.
    pub(crate) fn report(&self, err: SupervisorError) -> Delivery {
        match &self.error_sink {
            Some(sink) => deliver(sink.as_ref(), err),
            None => Delivery::Discarded,
        }
    }

    /// Returns the policy with sentinel values replaced.
    pub(crate) fn finalized(mut self) -> Self {
        self.reconnect_delay = self.effective_delay();
        self
    }
}

impl Default for RetryPolicy {
    /// Default policy:
    ///
    /// - `reconnect_delay = 250ms`
    /// - `backoff = BackoffPolicy::default()` (constant)
    /// - no predicate, no sink
    fn default() -> Self {
        Self {
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
            backoff: BackoffPolicy::default(),
            should_reconnect: None,
            error_sink: None,
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("reconnect_delay", &self.reconnect_delay)
            .field("backoff", &self.backoff)
            .field("should_reconnect", &self.should_reconnect.is_some())
            .field("error_sink", &self.error_sink.is_some())
            .finish()
    }
}
