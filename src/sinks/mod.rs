//! # Fallback error sink.
//!
//! The sink receives every error the supervisor does not absorb: ordinary
//! worker errors (immediately, on the caller's thread) and the final error of
//! an abandoned reconnect episode (from the retry loop's task).
//!
//! A panicking sink is contained: [`deliver`] catches the unwind so the
//! handler never panics across the worker's error-callback boundary.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::{SupervisorError, panic_message};

/// Consumer of errors the supervisor could not absorb.
///
/// Implemented for every `Fn(SupervisorError) + Send + Sync`. May be called
/// concurrently from several retry loops.
pub trait ErrorSink: Send + Sync + 'static {
    /// Receives one error.
    fn report(&self, err: SupervisorError);
}

impl<F> ErrorSink for F
where
    F: Fn(SupervisorError) + Send + Sync + 'static,
{
    fn report(&self, err: SupervisorError) {
        self(err)
    }
}

/// Shared handle to a sink.
pub type ErrorSinkRef = Arc<dyn ErrorSink>;

/// Outcome of handing an error to the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The sink received the error.
    Delivered,
    /// No sink configured; the error was dropped.
    Discarded,
    /// The sink panicked; payload rendered as text.
    Panicked(String),
}

/// Calls `sink` with `err`, containing any panic.
pub(crate) fn deliver(sink: &dyn ErrorSink, err: SupervisorError) -> Delivery {
    match catch_unwind(AssertUnwindSafe(|| sink.report(err))) {
        Ok(()) => Delivery::Delivered,
        Err(payload) => Delivery::Panicked(panic_message(payload.as_ref())),
    }
}
