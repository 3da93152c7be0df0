//! Misuse faults and the task fault policy.
//!
//! A misuse fault is a programming error in how a primitive is used: closing a
//! channel twice, sending on a closed channel, driving a wait group below
//! zero, or releasing a mutex that is not held. Faults are not recoverable
//! `Result`s. They are raised as a panic whose payload is the typed
//! [`MisuseFault`], so a harness can still tell them apart from other panics:
//!
//! ```rust,ignore
//! let err = core_async::spawn(async move { channel.close() }).await.unwrap_err();
//! assert_eq!(
//!     core_async::fault::from_join_error(err),
//!     Some(MisuseFault::CloseOfClosedChannel)
//! );
//! ```
//!
//! What happens to the process afterwards depends on the [`FaultPolicy`] of
//! the scheduler the task runs on.

use std::any::Any;
use std::cell::Cell;
use std::panic::Location;

use thiserror::Error;
use tokio::task::JoinError;

/// Programming errors detected by the toolkit's primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MisuseFault {
    #[error("sync: unlock of unlocked mutex")]
    UnlockOfUnlockedMutex,

    #[error("sync: negative WaitGroup counter ({counter})")]
    NegativeWaitGroupCounter { counter: i64 },

    #[error("send on closed channel")]
    SendOnClosedChannel,

    #[error("close of closed channel")]
    CloseOfClosedChannel,
}

/// What a scheduler does when one of its tasks panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Log the panic and terminate the process.
    #[default]
    Abort,
    /// Let the panic surface through the task's `JoinHandle`.
    Isolate,
}

thread_local! {
    static POLICY: Cell<FaultPolicy> = const { Cell::new(FaultPolicy::Abort) };
}

/// Policy in effect on the current thread.
pub fn current_policy() -> FaultPolicy {
    POLICY.with(Cell::get)
}

pub(crate) fn install_policy(policy: FaultPolicy) {
    POLICY.with(|cell| cell.set(policy));
}

/// Restores the previous thread policy when dropped.
pub(crate) struct PolicyScope {
    previous: FaultPolicy,
}

impl PolicyScope {
    pub(crate) fn enter(policy: FaultPolicy) -> Self {
        let previous = current_policy();
        install_policy(policy);
        Self { previous }
    }
}

impl Drop for PolicyScope {
    fn drop(&mut self) {
        install_policy(self.previous);
    }
}

/// Raise a misuse fault. Never returns.
#[track_caller]
pub fn raise(fault: MisuseFault) -> ! {
    let location = Location::caller();
    tracing::error!(
        fault = %fault,
        file = location.file(),
        line = location.line(),
        "misuse fault"
    );
    std::panic::panic_any(fault)
}

/// Recover a misuse fault from a caught panic payload.
pub fn downcast(payload: &(dyn Any + Send)) -> Option<&MisuseFault> {
    payload.downcast_ref::<MisuseFault>()
}

/// Recover a misuse fault from a failed task.
pub fn from_join_error(err: JoinError) -> Option<MisuseFault> {
    if !err.is_panic() {
        return None;
    }
    err.into_panic().downcast::<MisuseFault>().ok().map(|fault| *fault)
}

/// Human readable description of any panic payload.
pub fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(fault) = downcast(payload) {
        fault.to_string()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub(crate) fn abort_on_panic(payload: Box<dyn Any + Send>) -> ! {
    let description = describe(payload.as_ref());
    tracing::error!(panic = %description, "task panicked, terminating process");
    eprintln!("fatal error: {description}");
    std::process::abort()
}
