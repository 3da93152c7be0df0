//! Mutual exclusion for shared state.
//!
//! The lock is released when the guard goes out of scope, so every exit
//! path out of a critical section (early return, `?`, unwinding) gives it
//! back.
//!
//! # Examples
//!
//! ```rust,ignore
//! use core_async::sync::Mutex;
//!
//! let counter = Mutex::new(0);
//! *counter.lock().await += 1;
//! counter.with_lock(|n| *n -= 1).await;
//! assert_eq!(counter.into_inner(), 0);
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::fault::{self, MisuseFault};

pub struct Mutex<T> {
    held: AtomicBool,
    inner: tokio::sync::Mutex<T>,
}

impl<T> Mutex<T> {
    pub fn new(value: T) -> Self {
        Self {
            held: AtomicBool::new(false),
            inner: tokio::sync::Mutex::new(value),
        }
    }

    /// Wait until the lock is free, then take it.
    pub async fn lock(&self) -> MutexGuard<'_, T> {
        let guard = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::trace!("mutex contended, waiting");
                self.inner.lock().await
            }
        };
        self.acquired(guard)
    }

    /// Take the lock only if it is free right now.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock().ok().map(|guard| self.acquired(guard))
    }

    /// Run `f` inside the critical section.
    pub async fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock().await;
        f(&mut guard)
    }

    pub fn is_locked(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }

    fn acquired<'a>(&'a self, guard: tokio::sync::MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        let was_held = self.held.swap(true, Ordering::AcqRel);
        debug_assert!(!was_held, "mutex acquired while marked held");
        MutexGuard {
            held: &self.held,
            guard,
        }
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Mutex");
        match self.inner.try_lock() {
            Ok(value) => d.field("data", &&*value),
            Err(_) => d.field("data", &format_args!("<locked>")),
        };
        d.finish()
    }
}

/// Scoped ownership of a [`Mutex`].
pub struct MutexGuard<'a, T> {
    held: &'a AtomicBool,
    guard: tokio::sync::MutexGuard<'a, T>,
}

impl<T> MutexGuard<'_, T> {
    /// Release the lock now instead of at end of scope.
    pub fn unlock(guard: Self) {
        drop(guard);
    }
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        // The inner guard drops after this, so the flag flips before anyone
        // else can acquire.
        if !self.held.swap(false, Ordering::AcqRel) && !std::thread::panicking() {
            fault::raise(MisuseFault::UnlockOfUnlockedMutex);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for MutexGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_lock_excludes() {
        let mutex = Mutex::new(1);
        let guard = mutex.try_lock().unwrap();
        assert!(mutex.is_locked());
        assert!(mutex.try_lock().is_none());

        MutexGuard::unlock(guard);
        assert!(!mutex.is_locked());
        assert!(mutex.try_lock().is_some());
    }

    #[test]
    fn test_guard_mutates() {
        let mut mutex = Mutex::new(vec![1]);
        {
            let mut guard = mutex.try_lock().unwrap();
            guard.push(2);
        }
        mutex.get_mut().push(3);
        assert_eq!(mutex.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn test_with_lock_returns_value() {
        let mutex = Mutex::new(10);
        let doubled = futures::executor::block_on(mutex.with_lock(|n| {
            *n *= 2;
            *n
        }));
        assert_eq!(doubled, 20);
        assert!(!mutex.is_locked());
    }

    #[test]
    fn test_released_while_unwinding() {
        let mutex = Mutex::new(0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = mutex.try_lock().unwrap();
            panic!("critical section failed");
        }));

        assert!(result.is_err());
        assert!(!mutex.is_locked());
    }

    #[test]
    fn test_debug_shows_locked() {
        let mutex = Mutex::new(5);
        assert_eq!(format!("{mutex:?}"), "Mutex { data: 5 }");
        let _guard = mutex.try_lock().unwrap();
        assert_eq!(format!("{mutex:?}"), "Mutex { data: <locked> }");
    }
}
