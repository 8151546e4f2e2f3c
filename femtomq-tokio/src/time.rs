//! Std time implementation

use std::time::Instant;

use femtomq_core::Clock;

/// Monotonic clock anchored at construction
///
/// Backed by `std::time::Instant`; wall-clock adjustments never move it.
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_millis(&self) -> Option<u64> {
        Some(self.epoch.elapsed().as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_clock_is_monotonic() {
        let clock = StdClock::new();
        let first = clock.now_millis().unwrap();
        let second = clock.now_millis().unwrap();
        assert!(second >= first);
    }
}
