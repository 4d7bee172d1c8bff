//! Wall-clock timestamps shared by the decision engine and the runtime loop.

use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    /// Time elapsed from `earlier` to `self`, clamped to zero if the clock stepped back.
    pub fn saturating_since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn abs_diff(self, other: Millis) -> u64 {
        self.0.abs_diff(other.0)
    }

    pub fn plus(self, ms: u64) -> Millis {
        Millis(self.0.saturating_add(ms))
    }

    pub fn minus(self, ms: u64) -> Millis {
        Millis(self.0.saturating_sub(ms))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

pub trait Clock {
    fn now(&self) -> Millis;
}

/// Reads the system wall clock. Not monotonic; the engine tolerates steps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Clock that only moves when told to. Drives offline replay and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start.0),
        }
    }

    pub fn set(&self, at: Millis) {
        self.now.set(at.0);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis(self.now.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_since_clamps_backward_steps() {
        assert_eq!(Millis(1_000).saturating_since(Millis(400)), 600);
        assert_eq!(Millis(400).saturating_since(Millis(1_000)), 0);
    }

    #[test]
    fn manual_clock_moves_only_on_request() {
        let clock = ManualClock::new(Millis(10));
        assert_eq!(clock.now(), Millis(10));
        clock.advance(16);
        assert_eq!(clock.now(), Millis(26));
        clock.set(Millis(5));
        assert_eq!(clock.now(), Millis(5));
    }

    #[test]
    fn system_clock_is_past_the_epoch() {
        assert!(SystemClock.now() > Millis::ZERO);
    }
}
