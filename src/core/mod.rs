//! Supervisor core: classification, retry loops, and the factory.
//!
//! Internal modules:
//! - [`handler`]: classifies worker errors and spawns retry loops;
//! - [`retry_loop`]: restores one broken connection per disconnect notice;
//! - [`attempt`]: runs one reconnect attempt with panic containment;
//! - [`builder`]: the supervisor factory;
//! - [`report`]: sink delivery with event publishing.

mod attempt;
mod builder;
mod handler;
mod report;
mod retry_loop;

#[cfg(test)]
mod test_support;

pub use builder::{HandlerBuilder, make_error_handler};
pub use handler::{ErrorCallback, Handler};
pub use retry_loop::{LoopExit, RetryLoop};
