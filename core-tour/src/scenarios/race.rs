//! Two hundred tasks nudging one counter up and down, first unguarded, then
//! behind a mutex, then behind a token channel.

use crate::error::{Result, TourError};
use crate::narrator::Narrator;
use crate::Tour;

use core_async::sync::{Channel, Mutex, WaitGroup};
use core_async::task;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A counter whose update is a separate read and write with a yield in
/// between, so concurrent updates can overwrite each other.
#[derive(Debug, Default)]
pub struct SharedCounter {
    value: AtomicI64,
}

impl SharedCounter {
    pub fn new(value: i64) -> Self {
        Self {
            value: AtomicI64::new(value),
        }
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    pub async fn add(&self, delta: i64) {
        let current = self.value.load(Ordering::SeqCst);
        task::yield_now().await;
        self.value.store(current + delta, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceStrategy {
    Unsynchronized,
    Mutex,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceReport {
    pub strategy: RaceStrategy,
    pub original: i64,
    pub final_value: i64,
}

impl RaceReport {
    /// Whether every increment was matched by a decrement.
    pub fn is_balanced(&self) -> bool {
        self.original == self.final_value
    }

    async fn narrate(&self, narrator: &Narrator) -> Result<()> {
        narrator
            .say(format!("n value is: {}", self.final_value))
            .await?;
        narrator
            .say(format!("Is n value what we expected? {}", self.is_balanced()))
            .await
    }
}

/// Both halves of each pair touch the counter with no coordination.
pub async fn race_unsynchronized(tour: &Tour) -> Result<RaceReport> {
    const ORIGINAL: i64 = 42;

    let narrator = tour.narrator("race_unsynchronized");
    let counter = Arc::new(SharedCounter::new(ORIGINAL));
    let group = WaitGroup::new();

    for _ in 0..tour.settings().race_pairs {
        for delta in [1, -1] {
            let counter = counter.clone();
            group.spawn(async move { counter.add(delta).await });
        }
    }
    group.wait().await;

    let report = RaceReport {
        strategy: RaceStrategy::Unsynchronized,
        original: ORIGINAL,
        final_value: counter.get(),
    };
    tracing::debug!(?report, "unsynchronized race finished");
    report.narrate(&narrator).await?;
    Ok(report)
}

/// Each update happens while holding a mutex.
pub async fn race_with_mutex(tour: &Tour) -> Result<RaceReport> {
    let narrator = tour.narrator("race_with_mutex");
    let counter = Arc::new(Mutex::new(0i64));
    let group = WaitGroup::new();

    for _ in 0..tour.settings().race_pairs {
        for delta in [1, -1] {
            let counter = counter.clone();
            group.spawn(async move {
                let mut value = counter.lock().await;
                let current = *value;
                task::yield_now().await;
                *value = current + delta;
            });
        }
    }
    group.wait().await;

    let report = RaceReport {
        strategy: RaceStrategy::Mutex,
        original: 0,
        final_value: *counter.lock().await,
    };
    report.narrate(&narrator).await?;
    Ok(report)
}

/// A capacity-1 channel holds a single token. A task takes the token, updates
/// the counter, and puts the token back.
pub async fn race_with_channel(tour: &Tour) -> Result<RaceReport> {
    let narrator = tour.narrator("race_with_channel");
    let counter = Arc::new(SharedCounter::new(0));
    let token = Channel::buffered(1);
    let group = WaitGroup::new();

    let handles: Vec<_> = (0..tour.settings().race_pairs)
        .flat_map(|_| [1, -1])
        .map(|delta| {
            let counter = counter.clone();
            let token = token.clone();
            group.spawn(async move {
                token
                    .recv()
                    .await
                    .ok_or(TourError::ChannelClosed("token"))?;
                counter.add(delta).await;
                token.send(()).await;
                Ok::<_, TourError>(())
            })
        })
        .collect();

    token.send(()).await;
    group.wait().await;
    for handle in handles {
        handle.await??;
    }

    let report = RaceReport {
        strategy: RaceStrategy::Channel,
        original: 0,
        final_value: counter.get(),
    };
    report.narrate(&narrator).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[core_async::test]
    async fn test_shared_counter_sequential_updates() {
        let counter = SharedCounter::new(5);
        counter.add(3).await;
        counter.add(-1).await;
        assert_eq!(counter.get(), 7);
    }

    #[core_async::test(worker_threads = 1)]
    async fn test_shared_counter_loses_interleaved_updates() {
        let counter = Arc::new(SharedCounter::new(0));
        let group = WaitGroup::new();
        for _ in 0..10 {
            let counter = counter.clone();
            group.spawn(async move { counter.add(1).await });
        }
        group.wait().await;

        // Every task reads before any of them writes back.
        assert!(counter.get() < 10);
    }
}
