//! Task spawning.
//!
//! `spawn` schedules a future on the current scheduler and returns at once.
//! The spawner does not wait for the task unless it synchronizes explicitly
//! through the returned `JoinHandle`, a channel, or a wait group.
//!
//! # Examples
//!
//! ```rust,ignore
//! use core_async::task;
//!
//! let handle = task::spawn(async { 42 });
//! assert_eq!(handle.await.unwrap(), 42);
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::runtime::Handle;

use crate::fault::{self, FaultPolicy};

pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a new task on the current scheduler.
///
/// Under [`FaultPolicy::Abort`] (the default) a panic inside the task ends
/// the process. Under [`FaultPolicy::Isolate`] it is reported through the
/// returned handle.
///
/// # Panics
///
/// Panics when called outside a scheduler.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    spawn_on(&Handle::current(), fault::current_policy(), future)
}

pub(crate) fn spawn_on<F>(handle: &Handle, policy: FaultPolicy, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match policy {
        FaultPolicy::Isolate => handle.spawn(future),
        FaultPolicy::Abort => handle.spawn(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(output) => output,
                Err(payload) => fault::abort_on_panic(payload),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Scheduler, SchedulerConfig};

    fn scheduler() -> Scheduler {
        Scheduler::new(
            SchedulerConfig::default()
                .with_worker_threads(2)
                .with_fault_policy(FaultPolicy::Isolate),
        )
        .unwrap()
    }

    #[test]
    fn test_spawn_nested() {
        let value = scheduler().block_on(async {
            let outer = spawn(async {
                let inner = spawn(async { 10 });
                inner.await.unwrap() * 2
            });
            outer.await.unwrap()
        });
        assert_eq!(value, 20);
    }

    #[test]
    fn test_plain_panic_is_isolated() {
        let err = scheduler().block_on(async {
            spawn(async {
                panic!("worker failed");
            })
            .await
            .unwrap_err()
        });
        assert!(err.is_panic());
        assert!(fault::from_join_error(err).is_none());
    }
}
