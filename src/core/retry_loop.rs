//! # RetryLoop: one disconnect episode.
//!
//! Restores one specific broken connection. Spawned detached by the
//! [`Handler`](crate::Handler), one loop per [`DisconnectNotice`]; it shares
//! nothing with other loops except the read-only [`RetryPolicy`].
//!
//! ## Architecture
//! ```text
//! while policy.allows_reconnect(notice) {          ◄── pre-sleep check
//!   ├─► publish BackoffScheduled{ delay, attempt }
//!   ├─► sleep(delay)          (cancellable by the handler's token)
//!   ├─► policy.allows_reconnect(notice)? else break ◄── post-sleep check
//!   ├─► attempt += 1
//!   └─► attempt_once(connection)
//!         ├─ Ok  ──► LoopExit::Reconnected (silent)
//!         └─ Err ──► remember as last error, next round
//! }
//! publish ReconnectAbandoned
//! last error? ──► sink(SupervisorError::ReconnectAbandoned)
//! ```
//!
//! ## Rules
//! - Always sleeps before the first attempt.
//! - The post-sleep answer of the predicate wins for that round.
//! - A panicking predicate counts as "stop" and is published as `PredicatePanicked`.
//! - Exactly one error reaches the sink per abandoned episode, and only if an
//!   attempt actually failed; success and cancellation report nothing.
//! - Attempts run **sequentially** within one loop.

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::connection::DisconnectNotice;
use crate::core::attempt::attempt_once;
use crate::core::report::report;
use crate::error::{BoxError, SupervisorError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::{RetryPolicy, Verdict};

/// Why a retry loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The connection was restored.
    Reconnected {
        /// Attempts made, including the successful one.
        attempts: u32,
    },
    /// The predicate stopped the loop while the connection was down.
    Abandoned {
        /// Failed attempts made before stopping.
        attempts: u32,
    },
    /// The handler was shut down.
    Cancelled {
        /// Failed attempts made before cancellation.
        attempts: u32,
    },
}

/// Retry loop for one disconnect notice.
pub struct RetryLoop {
    notice: DisconnectNotice,
    policy: RetryPolicy,
    bus: Bus,
}

impl RetryLoop {
    /// Creates a loop for `notice`.
    pub fn new(notice: DisconnectNotice, policy: RetryPolicy, bus: Bus) -> Self {
        Self {
            notice,
            policy,
            bus,
        }
    }

    /// Runs until the connection is restored, the predicate says stop, or
    /// `token` is cancelled.
    ///
    /// `token` is only observed during the back-off sleep; an attempt in
    /// flight always completes.
    pub async fn run(self, token: CancellationToken) -> LoopExit {
        let addr: Arc<str> = Arc::from(self.notice.addr());
        let mut last_error: Option<BoxError> = None;
        let mut attempts: u32 = 0;

        while self.keep_going(&addr) {
            let delay = self.policy.delay_for(attempts);
            let mut ev = Event::new(EventKind::BackoffScheduled)
                .with_connection(Arc::clone(&addr))
                .with_attempt(attempts)
                .with_delay(delay);
            if let Some(err) = &last_error {
                ev = ev.with_reason(err.to_string());
            }
            self.bus.publish(ev);

            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => {
                    self.bus.publish(
                        Event::new(EventKind::LoopCancelled)
                            .with_connection(Arc::clone(&addr))
                            .with_attempt(attempts),
                    );
                    return LoopExit::Cancelled { attempts };
                }
            }

            if !self.keep_going(&addr) {
                break;
            }

            attempts = attempts.saturating_add(1);
            match attempt_once(self.notice.connection(), &addr, attempts, &self.bus).await {
                Ok(()) => return LoopExit::Reconnected { attempts },
                Err(err) => last_error = Some(err),
            }
        }

        self.abandon(addr, attempts, last_error)
    }

    /// Consults the predicate; a panic is published and answers `false`.
    fn keep_going(&self, addr: &Arc<str>) -> bool {
        match self.policy.verdict(&self.notice) {
            Verdict::Retry => true,
            Verdict::Stop => false,
            Verdict::Panicked(info) => {
                self.bus.publish(
                    Event::new(EventKind::PredicatePanicked)
                        .with_connection(Arc::clone(addr))
                        .with_reason(info),
                );
                false
            }
        }
    }

    fn abandon(&self, addr: Arc<str>, attempts: u32, last_error: Option<BoxError>) -> LoopExit {
        let mut ev = Event::new(EventKind::ReconnectAbandoned)
            .with_connection(Arc::clone(&addr))
            .with_attempt(attempts);
        if let Some(err) = &last_error {
            ev = ev.with_reason(err.to_string());
        }
        self.bus.publish(ev);

        if let Some(last) = last_error {
            report(
                &self.policy,
                &self.bus,
                SupervisorError::ReconnectAbandoned {
                    connection: addr,
                    attempts,
                    last,
                },
            );
        }
        LoopExit::Abandoned { attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionRef, ReconnectFn};
    use crate::core::test_support::{RecordingSink, ScriptedConnection};
    use crate::policies::{BackoffPolicy, JitterPolicy, ReconnectSwitch};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    const DELAY: Duration = Duration::from_millis(10);

    fn retry_loop(conn: ConnectionRef, policy: RetryPolicy) -> (RetryLoop, Bus) {
        let bus = Bus::new(1024);
        let notice = DisconnectNotice::new(conn, "connection reset by peer");
        (RetryLoop::new(notice, policy, bus.clone()), bus)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_reports_nothing() {
        let conn = ScriptedConnection::failing("gearman:4730", 0);
        let sink = RecordingSink::default();
        let policy = RetryPolicy::new(DELAY).with_error_sink(sink.clone());
        let (retry, _bus) = retry_loop(conn.clone(), policy);

        let started = Instant::now();
        let exit = retry.run(CancellationToken::new()).await;

        assert_eq!(exit, LoopExit::Reconnected { attempts: 1 });
        assert_eq!(conn.attempts(), 1);
        assert!(conn.attempt_times()[0] - started >= DELAY, "no immediate retry");
        assert!(sink.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let conn = ScriptedConnection::failing("gearman:4730", 2);
        let sink = RecordingSink::default();
        let policy = RetryPolicy::new(DELAY).with_error_sink(sink.clone());
        let (retry, _bus) = retry_loop(conn.clone(), policy);

        let exit = retry.run(CancellationToken::new()).await;

        assert_eq!(exit, LoopExit::Reconnected { attempts: 3 });
        let times = conn.attempt_times();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= DELAY);
        }
        assert!(sink.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_falls_back_to_default() {
        let conn = ScriptedConnection::failing("gearman:4730", 1);
        let (retry, _bus) = retry_loop(conn.clone(), RetryPolicy::new(Duration::ZERO));

        let exit = retry.run(CancellationToken::new()).await;

        assert_eq!(exit, LoopExit::Reconnected { attempts: 2 });
        let times = conn.attempt_times();
        assert!(times[1] - times[0] >= RetryPolicy::DEFAULT_RECONNECT_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_predicate_retries_indefinitely() {
        let conn = ScriptedConnection::never_recovers("gearman:4730");
        let sink = RecordingSink::default();
        let policy = RetryPolicy::new(DELAY).with_error_sink(sink.clone());
        let (retry, _bus) = retry_loop(conn.clone(), policy);
        let token = CancellationToken::new();
        let join = tokio::spawn(retry.run(token.clone()));

        sleep(Duration::from_millis(5_005)).await;
        assert!(conn.attempts() >= 400, "only {} attempts", conn.attempts());
        assert!(!join.is_finished());
        assert!(sink.seen().is_empty());

        token.cancel();
        let exit = join.await.unwrap();
        assert!(matches!(exit, LoopExit::Cancelled { attempts } if attempts >= 400));
        assert!(sink.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_false_before_any_attempt() {
        let conn = ScriptedConnection::never_recovers("gearman:4730");
        let sink = RecordingSink::default();
        let policy = RetryPolicy::new(DELAY)
            .with_should_reconnect(ReconnectSwitch::new(false))
            .with_error_sink(sink.clone());
        let (retry, _bus) = retry_loop(conn.clone(), policy);

        let exit = retry.run(CancellationToken::new()).await;

        assert_eq!(exit, LoopExit::Abandoned { attempts: 0 });
        assert_eq!(conn.attempts(), 0);
        assert!(sink.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_turned_off_during_first_sleep_is_silent() {
        let conn = ScriptedConnection::never_recovers("gearman:4730");
        let sink = RecordingSink::default();
        let switch = ReconnectSwitch::new(true);
        let policy = RetryPolicy::new(DELAY)
            .with_should_reconnect(switch.clone())
            .with_error_sink(sink.clone());
        let (retry, _bus) = retry_loop(conn.clone(), policy);
        let join = tokio::spawn(retry.run(CancellationToken::new()));

        sleep(Duration::from_millis(5)).await;
        switch.disable();

        assert_eq!(join.await.unwrap(), LoopExit::Abandoned { attempts: 0 });
        assert_eq!(conn.attempts(), 0);
        assert!(sink.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_turned_off_after_failures_reports_once() {
        let conn = ScriptedConnection::never_recovers("gearman:4730");
        let sink = RecordingSink::default();
        let switch = ReconnectSwitch::new(true);
        let policy = RetryPolicy::new(DELAY)
            .with_should_reconnect(switch.clone())
            .with_error_sink(sink.clone());
        let (retry, _bus) = retry_loop(conn.clone(), policy);
        let join = tokio::spawn(retry.run(CancellationToken::new()));

        sleep(Duration::from_millis(35)).await;
        assert_eq!(conn.attempts(), 3);
        switch.disable();

        assert_eq!(join.await.unwrap(), LoopExit::Abandoned { attempts: 3 });
        sleep(Duration::from_millis(100)).await;
        assert_eq!(conn.attempts(), 3);

        let seen = sink.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].label, "reconnect_abandoned");
        assert!(seen[0].message.contains("connection refused #3"), "{}", seen[0].message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_sleep_answer_wins() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let conn = ScriptedConnection::never_recovers("gearman:4730");
        let policy = RetryPolicy::new(DELAY).with_should_reconnect(move |_: &DisconnectNotice| {
            counter.fetch_add(1, Ordering::SeqCst) == 0
        });
        let (retry, _bus) = retry_loop(conn.clone(), policy);

        let exit = retry.run(CancellationToken::new()).await;

        assert_eq!(exit, LoopExit::Abandoned { attempts: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(conn.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_predicate_abandons_and_reports_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let conn = ScriptedConnection::never_recovers("gearman:4730");
        let sink = RecordingSink::default();
        // Calls 1 and 2 bracket the first sleep; call 3 is the next pre-sleep check.
        let policy = RetryPolicy::new(DELAY)
            .with_should_reconnect(move |_: &DisconnectNotice| {
                if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                    panic!("predicate exploded");
                }
                true
            })
            .with_error_sink(sink.clone());
        let (retry, bus) = retry_loop(conn.clone(), policy);
        let mut rx = bus.subscribe();

        let exit = retry.run(CancellationToken::new()).await;

        assert_eq!(exit, LoopExit::Abandoned { attempts: 1 });
        assert_eq!(conn.attempts(), 1);
        let seen = sink.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].label, "reconnect_abandoned");
        assert!(seen[0].message.contains("connection refused #1"), "{}", seen[0].message);

        let panicked = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::PredicatePanicked)
            .unwrap();
        assert_eq!(panicked.connection.as_deref(), Some("gearman:4730"));
        assert_eq!(panicked.reason.as_deref(), Some("predicate exploded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_from_reconnect_delay() {
        let conn = ScriptedConnection::failing("gearman:4730", 3);
        let policy = RetryPolicy::new(DELAY).with_backoff(BackoffPolicy {
            factor: 2.0,
            max: Duration::from_millis(30),
            jitter: JitterPolicy::None,
        });
        let (retry, _bus) = retry_loop(conn.clone(), policy);

        let started = Instant::now();
        assert_eq!(
            retry.run(CancellationToken::new()).await,
            LoopExit::Reconnected { attempts: 4 }
        );

        let offsets: Vec<Duration> = conn.attempt_times().iter().map(|t| *t - started).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::from_millis(10),
                Duration::from_millis(30),
                Duration::from_millis(60),
                Duration::from_millis(90),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_reconnect_counts_as_failed_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let conn: ConnectionRef = ReconnectFn::arc("gearman:4730", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    panic!("socket table corrupted");
                }
                Ok::<_, BoxError>(())
            }
        });
        let (retry, bus) = retry_loop(conn, RetryPolicy::new(DELAY));
        let mut rx = bus.subscribe();

        let exit = retry.run(CancellationToken::new()).await;

        assert_eq!(exit, LoopExit::Reconnected { attempts: 2 });
        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::ReconnectFailed)
            .unwrap();
        assert!(failed.reason.as_deref().unwrap().contains("socket table corrupted"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_sequence_for_one_failure() {
        let conn = ScriptedConnection::failing("gearman:4730", 1);
        let (retry, bus) = retry_loop(conn, RetryPolicy::new(DELAY));
        let mut rx = bus.subscribe();

        retry.run(CancellationToken::new()).await;

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::BackoffScheduled,
                EventKind::ReconnectStarting,
                EventKind::ReconnectFailed,
                EventKind::BackoffScheduled,
                EventKind::ReconnectStarting,
                EventKind::Reconnected,
            ]
        );
    }
}
