//! # Connection abstractions.
//!
//! The supervisor never owns or constructs connections. It only needs:
//! - [`Reconnect`] - the capability to re-establish one specific connection;
//! - [`ConnectionRef`] - a shared handle to it (`Arc<dyn Reconnect>`);
//! - [`ReconnectFn`] - a closure-backed implementation for adapters and tests;
//! - [`DisconnectNotice`] - the payload of [`WorkerError::Disconnect`](crate::WorkerError::Disconnect).

mod notice;
mod reconnect;
mod reconnect_fn;

pub use notice::DisconnectNotice;
pub use reconnect::{ConnectionRef, Reconnect};
pub use reconnect_fn::ReconnectFn;
