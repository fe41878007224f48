//! # Function-backed connection (`ReconnectFn`)
//!
//! [`ReconnectFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh
//! future per attempt. Shared state between attempts belongs in an explicit
//! `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use reconnvisor::{BoxError, ConnectionRef, ReconnectFn};
//!
//! let conn: ConnectionRef = ReconnectFn::arc("127.0.0.1:4730", || async {
//!     Ok::<_, BoxError>(())
//! });
//!
//! assert_eq!(conn.addr(), "127.0.0.1:4730");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::connection::Reconnect;
use crate::error::BoxError;

/// Function-backed [`Reconnect`] implementation.
#[derive(Debug)]
pub struct ReconnectFn<F> {
    addr: Cow<'static, str>,
    f: F,
}

impl<F> ReconnectFn<F> {
    /// Creates a new function-backed connection.
    pub fn new(addr: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            addr: addr.into(),
            f,
        }
    }

    /// Creates the connection and returns it as a shared handle.
    pub fn arc(addr: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(addr, f))
    }
}

#[async_trait]
impl<F, Fut> Reconnect for ReconnectFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn reconnect(&self) -> Result<(), BoxError> {
        (self.f)().await
    }
}
