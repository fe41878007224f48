//! # Jitter for reconnect delays.
//!
//! [`JitterPolicy`] spreads reconnects from many workers that lost the same
//! job server at the same moment. Unlike classic jitter it never shortens a
//! delay below the configured reconnect delay: the result always lies in
//! `[floor, base]`.

use rand::Rng;
use std::time::Duration;

/// Randomization of reconnect delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Exact delays (default).
    #[default]
    None,

    /// Uniformly random in `[floor, base]`.
    Full,

    /// Upper half of the range: `mid + random[0, (base - floor) / 2]`.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to `base`, never returning less than `floor`.
    pub fn apply(&self, base: Duration, floor: Duration) -> Duration {
        if base <= floor {
            return floor;
        }
        let jittered = match self {
            JitterPolicy::None => base,
            JitterPolicy::Full => Self::between(floor, base),
            JitterPolicy::Equal => {
                let mid = floor + (base - floor) / 2;
                Self::between(mid, base)
            }
        };
        jittered.max(floor)
    }

    fn between(lo: Duration, hi: Duration) -> Duration {
        let lo_ms = lo.as_millis() as u64;
        let hi_ms = hi.as_millis() as u64;
        if lo_ms >= hi_ms {
            return lo;
        }
        Duration::from_millis(rand::rng().random_range(lo_ms..=hi_ms))
    }
}
