//! # Stubborn worker constructor.
//!
//! The job-processing worker is an external collaborator. [`Worker`] is the
//! slice of its construction API the supervisor needs: create one with a
//! concurrency limit, and install an error handler. [`new_stubborn_worker`]
//! composes that with [`make_error_handler`].

use crate::core::{Handler, make_error_handler};
use crate::policies::RetryPolicy;

/// Concurrency limit meaning "no limit".
pub const UNLIMITED: usize = 0;

/// Construction API of an external job worker.
pub trait Worker: Sized {
    /// Creates a worker running at most `limit` jobs at once ([`UNLIMITED`] = no cap).
    fn with_limit(limit: usize) -> Self;

    /// Installs the callback receiving every error the worker reports.
    fn set_error_handler(&mut self, handler: Handler);
}

/// Creates a worker with a stubborn reconnect handler already installed.
///
/// # Example
/// ```
/// use reconnvisor::{Handler, UNLIMITED, Worker, new_stubborn_worker};
///
/// #[derive(Default)]
/// struct JobWorker { limit: usize, on_error: Option<Handler> }
///
/// impl Worker for JobWorker {
///     fn with_limit(limit: usize) -> Self { Self { limit, on_error: None } }
///     fn set_error_handler(&mut self, handler: Handler) { self.on_error = Some(handler); }
/// }
///
/// let worker: JobWorker = new_stubborn_worker(UNLIMITED, None);
/// assert!(worker.on_error.is_some());
/// ```
pub fn new_stubborn_worker<W: Worker>(limit: usize, policy: Option<RetryPolicy>) -> W {
    let mut worker = W::with_limit(limit);
    worker.set_error_handler(make_error_handler(policy));
    worker
}
