//! Monotonic timestamps.
//!
//! The engine never reads a clock itself. Callers pass the current time into
//! every `tick`, so stage timing depends on elapsed milliseconds and not on
//! how often the engine is ticked.

use std::ops::Add;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Milliseconds on a monotonic clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Millis(pub u64);

impl Millis {
    /// Timestamp zero.
    pub const ZERO: Millis = Millis(0);

    /// Create a timestamp.
    #[must_use]
    pub const fn new(ms: u64) -> Self {
        Self(ms)
    }

    /// Raw millisecond value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`. Zero if `earlier` is in the future.
    #[must_use]
    pub const fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Millis {
    type Output = Millis;

    fn add(self, rhs: u64) -> Millis {
        Millis(self.0.saturating_add(rhs))
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Wall-clock source for drivers that tick the engine in real time.
///
/// Reports milliseconds since the clock was created, from [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start a clock at zero.
    #[must_use]
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    /// Current timestamp.
    #[must_use]
    pub fn now(&self) -> Millis {
        let elapsed: Duration = self.origin.elapsed();
        Millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}
