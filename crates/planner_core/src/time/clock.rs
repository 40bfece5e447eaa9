use chrono::Utc;
use std::cell::Cell;

/// Source of the current instant.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<K: Clock + ?Sized> Clock for Box<K> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic callers and tests.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: Cell<i64>,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, SystemClock};

    #[test]
    fn fixed_clock_can_be_advanced() {
        let clock = FixedClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!((&clock).now_ms(), 42);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
