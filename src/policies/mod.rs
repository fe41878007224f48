//! Reconnect policies.
//!
//! This module groups the knobs that control **whether** a broken connection
//! is retried and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`]     reconnect delay (floor), back-off, predicate, fallback sink
//! - [`ShouldReconnect`] predicate consulted before every round and again after waking
//! - [`ReconnectSwitch`] ready-made, thread-safe on/off predicate
//! - [`BackoffPolicy`]   how delays grow from the reconnect delay (factor / max + jitter)
//! - [`JitterPolicy`]    randomization that never dips below the reconnect delay
//!
//! ## Quick wiring
//! ```text
//! RetryPolicy { reconnect_delay, backoff, should_reconnect, error_sink }
//!      └─► core::handler::Handler uses:
//!           - should_reconnect to gate spawning a loop
//!           - error_sink to forward ordinary errors
//!      └─► core::retry_loop::RetryLoop uses:
//!           - backoff.next(effective_delay, round) to schedule the next attempt
//!           - should_reconnect before sleeping and after waking
//!           - error_sink for the final error of an abandoned episode
//! ```
//!
//! ## Defaults
//! - `reconnect_delay = 250ms`; zero is never honored.
//! - `BackoffPolicy::default()` → factor=1.0 (constant), max=30s, jitter=None.
//! - No predicate (retry until success), no sink (errors silently dropped).

mod backoff;
mod jitter;
mod predicate;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub(crate) use predicate::Verdict;
pub use predicate::{ReconnectSwitch, ShouldReconnect, ShouldReconnectRef};
pub use retry::RetryPolicy;
