//! The scheduler that runs tasks.
//!
//! Tasks are multiplexed onto a bounded pool of worker threads (a Tokio
//! multi-thread runtime). A task blocked on a channel, mutex, wait group or
//! select gives its worker back to the pool until it is woken.

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

pub use tokio::runtime::Handle;

use crate::fault::{self, FaultPolicy, PolicyScope};
use crate::task::JoinHandle;

const DEFAULT_THREAD_NAME: &str = "task-worker";

/// Errors raised while building a scheduler.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("worker_threads must be greater than 0")]
    NoWorkerThreads,

    #[error("failed to start worker threads: {0}")]
    Io(#[from] std::io::Error),
}

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub worker_threads: usize,
    pub thread_name: String,
    pub fault_policy: FaultPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_threads: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            fault_policy: FaultPolicy::Abort,
        }
    }
}

impl SchedulerConfig {
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }
}

/// A pool of worker threads plus the policy applied to panicking tasks.
pub struct Scheduler {
    runtime: Runtime,
    fault_policy: FaultPolicy,
    worker_threads: usize,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self, RuntimeError> {
        if config.worker_threads == 0 {
            return Err(RuntimeError::NoWorkerThreads);
        }

        let policy = config.fault_policy;
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name(config.thread_name.clone())
            .on_thread_start(move || fault::install_policy(policy))
            .enable_all()
            .build()?;

        tracing::debug!(
            worker_threads = config.worker_threads,
            thread_name = %config.thread_name,
            fault_policy = ?policy,
            "scheduler started"
        );

        Ok(Self {
            runtime,
            fault_policy: policy,
            worker_threads: config.worker_threads,
        })
    }

    /// Run `future` as the root task on the calling thread. Spawned tasks run
    /// on the worker pool meanwhile.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        let _scope = PolicyScope::enter(self.fault_policy);
        self.runtime.block_on(future)
    }

    /// Spawn a task from outside the scheduler.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        crate::task::spawn_on(self.runtime.handle(), self.fault_policy, future)
    }

    pub fn handle(&self) -> &Handle {
        self.runtime.handle()
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Stop the pool. Tasks still blocked after `timeout` are abandoned.
    pub fn shutdown(self, timeout: Duration) {
        tracing::debug!(?timeout, "scheduler shutting down");
        self.runtime.shutdown_timeout(timeout);
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("worker_threads", &self.worker_threads)
            .field("fault_policy", &self.fault_policy)
            .finish_non_exhaustive()
    }
}

/// Runs the provided future to completion on a default scheduler.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    Scheduler::new(SchedulerConfig::default())
        .expect("core_async::runtime::block_on: failed to build scheduler")
        .block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workers_rejected() {
        let err = Scheduler::new(SchedulerConfig::default().with_worker_threads(0)).unwrap_err();
        assert!(matches!(err, RuntimeError::NoWorkerThreads));
    }

    #[test]
    fn test_block_on_runs_spawned_tasks() {
        let scheduler = Scheduler::new(
            SchedulerConfig::default()
                .with_worker_threads(2)
                .with_fault_policy(FaultPolicy::Isolate),
        )
        .unwrap();

        let value = scheduler.block_on(async {
            let handle = crate::task::spawn(async { 21 * 2 });
            handle.await.unwrap()
        });
        assert_eq!(value, 42);
        assert_eq!(scheduler.worker_threads(), 2);
    }

    #[test]
    fn test_workers_inherit_fault_policy() {
        let scheduler = Scheduler::new(
            SchedulerConfig::default()
                .with_worker_threads(1)
                .with_fault_policy(FaultPolicy::Isolate),
        )
        .unwrap();

        let seen = scheduler
            .block_on(scheduler.spawn(async { fault::current_policy() }))
            .unwrap();
        assert_eq!(seen, FaultPolicy::Isolate);
    }

    #[test]
    fn test_isolated_panic_reaches_join_handle() {
        let scheduler = Scheduler::new(
            SchedulerConfig::default()
                .with_worker_threads(1)
                .with_fault_policy(FaultPolicy::Isolate),
        )
        .unwrap();

        let result = scheduler.block_on(scheduler.spawn(async {
            fault::raise(fault::MisuseFault::CloseOfClosedChannel);
        }));
        let err = result.unwrap_err();
        assert_eq!(
            fault::from_join_error(err),
            Some(fault::MisuseFault::CloseOfClosedChannel)
        );
    }
}
