//! Time Abstractions
//!
//! Provides an injectable monotonic time source.

use std::time::{Duration, Instant};

/// Monotonic time source trait
///
/// Used for measuring how long simulated work and waits took. Wall-clock time
/// never enters the toolkit's decisions.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::time::Clock;
///
/// fn report(clock: &dyn Clock, started: std::time::Instant) {
///     println!("took {:?}", clock.elapsed_since(started));
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;

    /// Time elapsed since `earlier`, saturating at zero
    fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

/// System clock implementation backed by `std::time::Instant`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();

        assert!(second >= first);
    }

    #[test]
    fn test_elapsed_since_future_saturates() {
        let clock = SystemClock;
        let later = clock.now() + Duration::from_secs(60);

        assert_eq!(clock.elapsed_since(later), Duration::ZERO);
    }
}
