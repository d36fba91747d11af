//! Simulation time: second-scale instants on the host's own clock.
//!
//! The engine never reads wall time. Every `SimTime` comes from the host's
//! `Clock::now()` and every duration the engine computes (ETA, rejection
//! expiry) is relative to that value, so time-warped or paused simulations
//! behave the way the host expects.

use std::fmt;
use std::ops::{Add, Sub};

/// A simulation instant, in whole seconds since the host's own epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(pub i64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn plus_seconds(self, secs: i64) -> SimTime {
        SimTime(self.0 + secs)
    }

    pub fn plus_minutes(self, minutes: i64) -> SimTime {
        self.plus_seconds(minutes * 60)
    }

    /// Seconds elapsed from `self` to `other`; negative if `other` precedes `self`.
    pub fn seconds_until(self, other: SimTime) -> i64 {
        other.0 - self.0
    }
}

impl Add<i64> for SimTime {
    type Output = SimTime;
    fn add(self, secs: i64) -> SimTime {
        self.plus_seconds(secs)
    }
}

impl Sub for SimTime {
    type Output = i64;
    fn sub(self, other: SimTime) -> i64 {
        self.0 - other.0
    }
}

/// Renders as `HH:MM:SS`, wrapping at 24h (the host's clock may run past a
/// single day; only the time-of-day is meaningful in suggestion reasons).
impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.rem_euclid(86_400);
        write!(f, "{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
    }
}
