//! # Event subscribers.
//!
//! Subscribers observe the [`Event`](crate::Event)s published by the handler
//! and its retry loops: logging, metrics, alerting on abandoned reconnects.
//!
//! ```text
//! Handler / RetryLoop ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                      ┌────────────┼────────────┐
//!                                                      ▼            ▼            ▼
//!                                                  LogWriter     Metrics      Custom
//! ```
//!
//! ## Implementing a subscriber
//! ```no_run
//! use async_trait::async_trait;
//! use reconnvisor::{Event, EventKind, Subscribe};
//!
//! struct AbandonAlert;
//!
//! #[async_trait]
//! impl Subscribe for AbandonAlert {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ReconnectAbandoned {
//!             // page someone
//!         }
//!     }
//!     fn name(&self) -> &'static str { "abandon-alert" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
