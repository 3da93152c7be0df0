//! Completion word for a blocked channel operation.
//!
//! A task blocked in a plain send/recv, or in a select over several cases,
//! parks one entry per case on the channels involved. All of those entries
//! point at a single `Signal`. Whoever completes the operation first claims
//! the signal with a compare-and-swap, which makes every other entry stale.
//!
//! Claiming is two-sided in a handoff: the completer first claims the
//! counterpart, then itself. If the second claim fails the first is undone
//! with [`Signal::revoke`], which marks the signal so its owner re-runs the
//! operation on the next poll.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::Waker;

use futures::task::AtomicWaker;

const WAITING: usize = 0;
const RETIRED: usize = 1;
const CLAIMED: usize = 2;

#[derive(Debug)]
pub(crate) struct Signal {
    state: AtomicUsize,
    revoked: AtomicBool,
    waker: AtomicWaker,
}

impl Signal {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: AtomicUsize::new(WAITING),
            revoked: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        })
    }

    /// Claim the signal on behalf of `case`. Fails if it was already claimed
    /// or retired.
    pub(crate) fn claim(&self, case: usize) -> bool {
        self.state
            .compare_exchange(WAITING, CLAIMED + case, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Undo a claim whose counterpart could not be claimed. Only the claimer
    /// may call this, and it must wake the owner afterwards.
    pub(crate) fn revoke(&self) {
        self.revoked.store(true, Ordering::Release);
        self.state.store(WAITING, Ordering::Release);
    }

    /// Withdraw the signal so it can never be claimed. Fails if someone
    /// claimed it first.
    pub(crate) fn retire(&self) -> bool {
        self.state
            .compare_exchange(WAITING, RETIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn is_waiting(&self) -> bool {
        self.state.load(Ordering::Acquire) == WAITING
    }

    pub(crate) fn was_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    pub(crate) fn claimed_case(&self) -> Option<usize> {
        let state = self.state.load(Ordering::Acquire);
        (state >= CLAIMED).then(|| state - CLAIMED)
    }

    pub(crate) fn register(&self, waker: &Waker) {
        self.waker.register(waker);
    }

    pub(crate) fn wake(&self) {
        self.waker.wake();
    }
}

/// Signals to wake once the channel lock has been released.
#[derive(Default)]
pub(crate) struct Wakeups(Vec<Arc<Signal>>);

impl Wakeups {
    pub(crate) fn push(&mut self, signal: Arc<Signal>) {
        self.0.push(signal);
    }

    pub(crate) fn wake_all(self) {
        for signal in self.0 {
            signal.wake();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let signal = Signal::new();
        assert!(signal.claim(3));
        assert!(!signal.claim(1));
        assert!(!signal.retire());
        assert_eq!(signal.claimed_case(), Some(3));
    }

    #[test]
    fn test_retire_blocks_claims() {
        let signal = Signal::new();
        assert!(signal.retire());
        assert!(!signal.claim(0));
        assert_eq!(signal.claimed_case(), None);
        assert!(!signal.is_waiting());
    }

    #[test]
    fn test_revoke_reopens() {
        let signal = Signal::new();
        assert!(signal.claim(0));
        signal.revoke();

        assert!(signal.is_waiting());
        assert!(signal.was_revoked());
        assert!(signal.claim(1));
        assert_eq!(signal.claimed_case(), Some(1));
    }
}
