//! Time-related operations.
//!
//! Besides the usual sleep and timeout helpers this module provides
//! [`after`], a channel that delivers a single instant once a duration has
//! elapsed. It is what the select timer case waits on.
//!
//! # Examples
//!
//! ```rust,ignore
//! use core_async::time::{after, Duration};
//!
//! let fired_at = after(Duration::from_millis(10)).recv().await;
//! assert!(fired_at.is_some());
//! ```

pub use std::time::{Duration, Instant};
pub use tokio::time::error::Elapsed;
pub use tokio::time::{interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

use crate::sync::{Channel, Receiver};

/// Returns a receiver that yields `Instant::now()` once `duration` has
/// elapsed.
///
/// The timer runs as its own task, so this must be called from within a
/// scheduler.
pub fn after(duration: Duration) -> Receiver<Instant> {
    let channel = Channel::buffered(1);
    let sender = channel.sender();

    crate::task::spawn(async move {
        sleep(duration).await;
        if !sender.offer(Instant::now()) {
            tracing::trace!(?duration, "timer fired into a closed channel");
        }
    });

    channel.receiver()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultPolicy;
    use crate::runtime::{Scheduler, SchedulerConfig};

    #[test]
    fn test_after_fires_once() {
        let scheduler = Scheduler::new(
            SchedulerConfig::default()
                .with_worker_threads(1)
                .with_fault_policy(FaultPolicy::Isolate),
        )
        .unwrap();

        scheduler.block_on(async {
            let start = Instant::now();
            let timer = after(Duration::from_millis(20));
            assert!(timer.try_recv().is_empty());

            let fired = timer.recv().await.unwrap();
            assert!(fired.duration_since(start) >= Duration::from_millis(20));
            assert!(timer.try_recv().is_empty());
        });
    }
}
