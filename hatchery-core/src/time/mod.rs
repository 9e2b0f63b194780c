//! ## hatchery-core::time
//! **Simulated wall clock in milliseconds**
//!
//! Written only by the simulation loop; read by the ingestion path to stamp
//! inbound commands with the current simulated time.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct VirtualClock {
    now_ms: Arc<AtomicI64>,
}

impl VirtualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    #[inline]
    pub fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::Acquire)
    }

    /// Advances the clock and returns the new time, pinned at `i64::MAX`.
    #[inline]
    pub fn advance(&self, ms: i64) -> i64 {
        let advance = |now: i64| now.saturating_add(ms);
        match self
            .now_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |now| Some(advance(now)))
        {
            Ok(previous) | Err(previous) => advance(previous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_initial_value() {
        let clock = VirtualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
    }

    #[test]
    fn test_clock_advance_is_shared() {
        let clock = VirtualClock::new(0);
        let reader = clock.clone();
        assert_eq!(clock.advance(500), 500);
        assert_eq!(clock.advance(250), 750);
        assert_eq!(reader.now_ms(), 750);
    }

    #[test]
    fn test_clock_saturates_instead_of_wrapping() {
        let clock = VirtualClock::new(i64::MAX - 50);
        assert_eq!(clock.advance(100), i64::MAX);
        assert_eq!(clock.advance(100), i64::MAX);
        assert_eq!(clock.now_ms(), i64::MAX);
    }
}
