//! # Back-off between reconnect attempts.
//!
//! [`BackoffPolicy`] decides how the wait before each round grows. The
//! reconnect delay of the owning [`RetryPolicy`](crate::RetryPolicy) is the
//! floor: round `n` waits `floor × factor^n`, clamped to `max`, jittered, and
//! never less than `floor`. With the default `factor = 1.0` every round waits
//! exactly the reconnect delay.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use reconnvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     factor: 2.0,
//!     max: Duration::from_secs(2),
//!     jitter: JitterPolicy::None,
//! };
//! let floor = Duration::from_millis(250);
//!
//! assert_eq!(backoff.next(floor, 0), Duration::from_millis(250));
//! assert_eq!(backoff.next(floor, 1), Duration::from_millis(500));
//! assert_eq!(backoff.next(floor, 10), Duration::from_secs(2));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Growth of reconnect delays.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Multiplicative growth factor per round (`1.0` = constant).
    pub factor: f64,
    /// Delay cap; a floor above it wins.
    pub max: Duration,
    /// Jitter applied within `[floor, base]`.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a constant back-off:
    /// - `factor = 1.0`;
    /// - `max = 30s`;
    /// - `jitter = None`.
    fn default() -> Self {
        Self {
            factor: 1.0,
            max: Duration::from_secs(30),
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the wait before round `round` (0-indexed) for the given `floor`.
    ///
    /// Non-finite or negative intermediate values clamp to the cap.
    pub fn next(&self, floor: Duration, round: u32) -> Duration {
        let cap = self.max.max(floor);
        let exp = round.min(i32::MAX as u32) as i32;
        let unclamped_secs = floor.as_secs_f64() * self.factor.powi(exp);

        let base = if !unclamped_secs.is_finite()
            || unclamped_secs < 0.0
            || unclamped_secs > cap.as_secs_f64()
        {
            cap
        } else {
            Duration::from_secs_f64(unclamped_secs)
        };

        self.jitter.apply(base.max(floor), floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: Duration = Duration::from_millis(100);

    fn policy(factor: f64, max: Duration) -> BackoffPolicy {
        BackoffPolicy {
            factor,
            max,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn test_default_is_constant_floor() {
        let backoff = BackoffPolicy::default();
        for round in 0..20 {
            assert_eq!(backoff.next(FLOOR, round), FLOOR, "round {round}");
        }
    }

    #[test]
    fn test_exponential_growth() {
        let backoff = policy(2.0, Duration::from_secs(30));
        assert_eq!(backoff.next(FLOOR, 0), Duration::from_millis(100));
        assert_eq!(backoff.next(FLOOR, 1), Duration::from_millis(200));
        assert_eq!(backoff.next(FLOOR, 2), Duration::from_millis(400));
        assert_eq!(backoff.next(FLOOR, 3), Duration::from_millis(800));
    }

    #[test]
    fn test_clamped_to_max() {
        let backoff = policy(2.0, Duration::from_secs(1));
        assert_eq!(backoff.next(FLOOR, 10), Duration::from_secs(1));
        assert_eq!(backoff.next(FLOOR, u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn test_floor_above_max_wins() {
        let backoff = policy(2.0, Duration::from_millis(50));
        assert_eq!(backoff.next(FLOOR, 0), FLOOR);
        assert_eq!(backoff.next(FLOOR, 5), FLOOR);
    }

    #[test]
    fn test_shrinking_factor_never_goes_below_floor() {
        let backoff = policy(0.5, Duration::from_secs(30));
        for round in 0..10 {
            assert_eq!(backoff.next(FLOOR, round), FLOOR);
        }
    }

    #[test]
    fn test_jitter_respects_floor() {
        let backoff = BackoffPolicy {
            factor: 3.0,
            max: Duration::from_secs(5),
            jitter: JitterPolicy::Full,
        };
        for round in 0..12 {
            assert!(backoff.next(FLOOR, round) >= FLOOR);
        }
    }
}
