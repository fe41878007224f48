//! Test doubles shared by the core tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::connection::{DisconnectNotice, Reconnect};
use crate::error::{BoxError, SupervisorError};
use crate::policies::ShouldReconnect;
use crate::sinks::ErrorSink;

/// Connection that fails its first `failures` attempts, then succeeds.
pub(crate) struct ScriptedConnection {
    addr: &'static str,
    failures: u32,
    attempts: Mutex<Vec<Instant>>,
}

impl ScriptedConnection {
    pub(crate) fn failing(addr: &'static str, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            addr,
            failures,
            attempts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn never_recovers(addr: &'static str) -> Arc<Self> {
        Self::failing(addr, u32::MAX)
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub(crate) fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reconnect for ScriptedConnection {
    fn addr(&self) -> &str {
        self.addr
    }

    async fn reconnect(&self) -> Result<(), BoxError> {
        let n = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(Instant::now());
            attempts.len() as u32
        };
        if n <= self.failures {
            Err(format!("connection refused #{n}").into())
        } else {
            Ok(())
        }
    }
}

/// What a [`RecordingSink`] saw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Recorded {
    pub(crate) label: &'static str,
    pub(crate) message: String,
}

/// Sink that records every error it receives.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingSink {
    pub(crate) fn seen(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, err: SupervisorError) {
        self.seen.lock().unwrap().push(Recorded {
            label: err.as_label(),
            message: err.to_string(),
        });
    }
}

/// Predicate backed by a lock-guarded set of addresses that must stop retrying.
#[derive(Clone, Default)]
pub(crate) struct StopList {
    stopped: Arc<Mutex<HashSet<String>>>,
}

impl StopList {
    pub(crate) fn stop(&self, addr: &str) {
        self.stopped.lock().unwrap().insert(addr.to_string());
    }
}

impl ShouldReconnect for StopList {
    fn should_reconnect(&self, notice: &DisconnectNotice) -> bool {
        !self.stopped.lock().unwrap().contains(notice.addr())
    }
}
