//! Integration tests for tasks, time, mutexes and wait groups.

use core_async::fault::{self, MisuseFault};
use core_async::sync::{Mutex, WaitGroup};
use core_async::{task, time};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[core_async::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[core_async::test]
async fn test_spawn_returns_before_task_runs_to_completion() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();

    let handle = task::spawn(async move {
        time::sleep(time::Duration::from_millis(30)).await;
        flag.store(true, Ordering::SeqCst);
    });

    assert!(!finished.load(Ordering::SeqCst));
    handle.await.unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[core_async::test]
async fn test_sleep() {
    let start = time::Instant::now();
    time::sleep(time::Duration::from_millis(50)).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= time::Duration::from_millis(50));
}

#[core_async::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[core_async::test]
async fn test_yield_now() {
    task::yield_now().await;
}

#[core_async::test(worker_threads = 4)]
async fn test_mutex_keeps_counter_balanced() {
    let counter = Arc::new(Mutex::new(0i64));
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for i in 0..200 {
        let counter = counter.clone();
        let inside = inside.clone();
        let max_inside = max_inside.clone();
        handles.push(task::spawn(async move {
            let mut guard = counter.lock().await;
            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
            max_inside.fetch_max(now, Ordering::SeqCst);

            let value = *guard;
            task::yield_now().await;
            *guard = if i % 2 == 0 { value + 1 } else { value - 1 };

            inside.fetch_sub(1, Ordering::SeqCst);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(*counter.lock().await, 0);
    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
}

#[core_async::test]
async fn test_mutex_waits_for_release() {
    let mutex = Arc::new(Mutex::new(Vec::new()));
    let guard = mutex.lock().await;

    let waiter = {
        let mutex = mutex.clone();
        task::spawn(async move {
            mutex.lock().await.push("second");
        })
    };

    time::sleep(time::Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    let mut guard = guard;
    guard.push("first");
    drop(guard);

    waiter.await.unwrap();
    assert_eq!(*mutex.lock().await, vec!["first", "second"]);
}

#[core_async::test]
async fn test_mutex_released_on_early_return() {
    async fn bump_unless_odd(mutex: &Mutex<u32>) -> Result<(), String> {
        let mut guard = mutex.lock().await;
        if *guard % 2 == 1 {
            return Err(format!("odd value {}", *guard));
        }
        *guard += 1;
        Ok(())
    }

    let mutex = Mutex::new(0);
    assert!(bump_unless_odd(&mutex).await.is_ok());
    assert!(bump_unless_odd(&mutex).await.is_err());
    assert!(!mutex.is_locked());
}

#[core_async::test]
async fn test_wait_group_waits_for_all() {
    let group = WaitGroup::new();
    let finished = Arc::new(AtomicUsize::new(0));

    group.add(3);
    for id in 0..3u64 {
        let group = group.clone();
        let finished = finished.clone();
        task::spawn(async move {
            time::sleep(time::Duration::from_millis(10 * (id + 1))).await;
            finished.fetch_add(1, Ordering::SeqCst);
            group.done();
        });
    }

    group.wait().await;
    assert_eq!(finished.load(Ordering::SeqCst), 3);
    assert_eq!(group.count(), 0);
}

#[core_async::test]
async fn test_wait_group_releases_every_waiter() {
    let group = WaitGroup::new();
    group.add(1);

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let group = group.clone();
            task::spawn(async move { group.wait().await })
        })
        .collect();

    time::sleep(time::Duration::from_millis(20)).await;
    assert!(waiters.iter().all(|w| !w.is_finished()));

    group.done();
    for waiter in waiters {
        time::timeout(time::Duration::from_secs(5), waiter)
            .await
            .expect("waiter was not released")
            .unwrap();
    }
}

#[core_async::test]
async fn test_wait_group_spawn_counts_panicking_tasks() {
    let group = WaitGroup::new();
    let ok = group.spawn(async { 1 });
    let failed = group.spawn(async {
        panic!("worker failed");
    });

    group.wait().await;
    assert_eq!(ok.await.unwrap(), 1);
    assert!(failed.await.unwrap_err().is_panic());
}

#[core_async::test]
async fn test_negative_wait_group_is_a_fault() {
    let group = WaitGroup::new();
    group.add(1);

    let err = task::spawn(async move {
        group.done();
        group.done();
    })
    .await
    .unwrap_err();

    assert_eq!(
        fault::from_join_error(err),
        Some(MisuseFault::NegativeWaitGroupCounter { counter: -1 })
    );
}
