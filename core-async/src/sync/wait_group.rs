//! Waiting for a group of tasks to finish.
//!
//! The counter is raised with [`WaitGroup::add`] before the tasks start and
//! lowered by each task with [`WaitGroup::done`]. [`WaitGroup::wait`]
//! returns once it is back at zero. `add` calls that set the expected total
//! must happen before `wait` is called; that ordering is up to the caller.

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use futures::pin_mut;
use tokio::sync::Notify;

use crate::fault::{self, MisuseFault};
use crate::task::JoinHandle;

#[derive(Debug, Default)]
struct Inner {
    counter: AtomicI64,
    released: Notify,
}

/// Shared counter of outstanding tasks. Clones refer to the same counter.
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` (which may be negative) to the counter.
    ///
    /// # Panics
    ///
    /// Raises [`MisuseFault::NegativeWaitGroupCounter`] if the counter would
    /// drop below zero.
    pub fn add(&self, delta: i64) {
        let previous = self.inner.counter.fetch_add(delta, Ordering::AcqRel);
        let counter = previous + delta;

        if counter < 0 {
            fault::raise(MisuseFault::NegativeWaitGroupCounter { counter });
        }
        if counter == 0 && previous != 0 {
            tracing::trace!("wait group released");
            self.inner.released.notify_waiters();
        } else if previous == 0 && delta > 0 {
            tracing::debug!(counter, "wait group armed");
        }
    }

    pub fn done(&self) {
        self.add(-1);
    }

    /// Current counter value.
    pub fn count(&self) -> i64 {
        self.inner.counter.load(Ordering::Acquire)
    }

    /// Wait until the counter reaches zero. Returns at once if it already is.
    pub async fn wait(&self) {
        loop {
            let released = self.inner.released.notified();
            pin_mut!(released);
            released.as_mut().enable();

            if self.count() <= 0 {
                return;
            }
            released.await;
        }
    }

    /// A guard that calls [`done`](Self::done) when dropped, on every exit
    /// path of the task holding it.
    pub fn done_guard(&self) -> DoneGuard {
        DoneGuard {
            group: self.clone(),
        }
    }

    /// `add(1)`, then spawn `future` with a done guard attached.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.add(1);
        let guard = self.done_guard();
        crate::task::spawn(async move {
            let _guard = guard;
            future.await
        })
    }
}

/// Calls [`WaitGroup::done`] on drop.
#[derive(Debug)]
pub struct DoneGuard {
    group: WaitGroup,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_wait_on_zero_returns_immediately() {
        let group = WaitGroup::new();
        futures::executor::block_on(group.wait());
        assert_eq!(group.count(), 0);
    }

    #[test]
    fn test_clones_share_counter() {
        let group = WaitGroup::new();
        let other = group.clone();
        group.add(2);
        other.done();
        assert_eq!(group.count(), 1);
        drop(group.done_guard());
        assert_eq!(other.count(), 0);
    }

    #[test]
    fn test_negative_counter_faults() {
        let group = WaitGroup::new();
        let payload = catch_unwind(AssertUnwindSafe(|| group.done())).unwrap_err();

        assert_eq!(
            fault::downcast(payload.as_ref()),
            Some(&MisuseFault::NegativeWaitGroupCounter { counter: -1 })
        );
    }
}
