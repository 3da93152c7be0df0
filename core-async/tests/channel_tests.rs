//! Integration tests for channels.

use core_async::fault::{self, MisuseFault};
use core_async::sync::{Channel, TryRecv, WaitGroup};
use core_async::{task, time};
use futures::{FutureExt, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

const WATCHDOG: time::Duration = time::Duration::from_secs(10);

#[core_async::test]
async fn test_buffered_sends_up_to_capacity_do_not_block() {
    let channel = Channel::buffered(3);
    for value in 0..3 {
        assert!(channel.send(value).now_or_never().is_some());
    }

    let sent = Arc::new(AtomicBool::new(false));
    let blocked = {
        let channel = channel.clone();
        let sent = sent.clone();
        task::spawn(async move {
            channel.send(3).await;
            sent.store(true, Ordering::SeqCst);
        })
    };

    time::sleep(time::Duration::from_millis(30)).await;
    assert!(!sent.load(Ordering::SeqCst));
    assert_eq!(channel.len(), 3);

    assert_eq!(channel.recv().await, Some(0));
    time::timeout(WATCHDOG, blocked).await.unwrap().unwrap();
    assert!(sent.load(Ordering::SeqCst));

    let mut rest = Vec::new();
    while let TryRecv::Value(value) = channel.try_recv() {
        rest.push(value);
    }
    assert_eq!(rest, vec![1, 2, 3]);
}

#[core_async::test]
async fn test_close_drains_then_reports_zero_value() {
    let channel = Channel::buffered(3);
    for value in 1..=3 {
        channel.send(value).await;
    }
    channel.close();

    assert_eq!(channel.recv_ok().await, (1, true));
    assert_eq!(channel.recv_ok().await, (2, true));
    assert_eq!(channel.recv_ok().await, (3, true));
    for _ in 0..3 {
        assert_eq!(channel.recv_ok().await, (0, false));
    }
}

#[core_async::test]
async fn test_rendezvous_orders_sender_after_receiver() {
    let channel = Channel::unbuffered();
    let payload = Arc::new(AtomicU64::new(0));
    let send_returned = Arc::new(AtomicBool::new(false));

    let sender = {
        let channel = channel.clone();
        let payload = payload.clone();
        let send_returned = send_returned.clone();
        task::spawn(async move {
            payload.store(7, Ordering::Relaxed);
            channel.send("go").await;
            send_returned.store(true, Ordering::SeqCst);
        })
    };

    time::sleep(time::Duration::from_millis(30)).await;
    assert!(!send_returned.load(Ordering::SeqCst));

    assert_eq!(channel.recv().await, Some("go"));
    assert_eq!(payload.load(Ordering::Relaxed), 7);

    time::timeout(WATCHDOG, sender).await.unwrap().unwrap();
    assert!(send_returned.load(Ordering::SeqCst));
}

#[core_async::test]
async fn test_receiver_blocks_until_sender_arrives() {
    let channel = Channel::unbuffered();
    let receiver = {
        let channel = channel.clone();
        task::spawn(async move { channel.recv().await })
    };

    time::sleep(time::Duration::from_millis(20)).await;
    assert!(!receiver.is_finished());

    channel.send(5u8).await;
    assert_eq!(receiver.await.unwrap(), Some(5));
}

#[core_async::test]
async fn test_close_releases_blocked_receivers() {
    let channel = Channel::<u32>::unbuffered();
    let receivers: Vec<_> = (0..3)
        .map(|_| {
            let channel = channel.clone();
            task::spawn(async move { channel.recv().await })
        })
        .collect();

    time::sleep(time::Duration::from_millis(20)).await;
    channel.close();

    for receiver in receivers {
        let got = time::timeout(WATCHDOG, receiver).await.unwrap().unwrap();
        assert_eq!(got, None);
    }
}

#[core_async::test]
async fn test_close_while_send_blocked_is_a_fault() {
    let channel = Channel::buffered(1);
    channel.send(1).await;

    let sender = {
        let channel = channel.clone();
        task::spawn(async move { channel.send(2).await })
    };
    time::sleep(time::Duration::from_millis(20)).await;
    channel.close();

    let err = time::timeout(WATCHDOG, sender).await.unwrap().unwrap_err();
    assert_eq!(
        fault::from_join_error(err),
        Some(MisuseFault::SendOnClosedChannel)
    );
    assert_eq!(channel.recv().await, Some(1));
    assert_eq!(channel.recv().await, None);
}

#[core_async::test]
async fn test_send_on_closed_is_a_fault() {
    let channel = Channel::unbuffered();
    channel.close();

    let err = task::spawn(async move { channel.send(1).await })
        .await
        .unwrap_err();
    assert_eq!(
        fault::from_join_error(err),
        Some(MisuseFault::SendOnClosedChannel)
    );
}

#[core_async::test]
async fn test_close_of_closed_is_a_fault() {
    let channel = Channel::<()>::buffered(2);
    let err = task::spawn(async move {
        channel.close();
        channel.close();
    })
    .await
    .unwrap_err();

    assert_eq!(
        fault::from_join_error(err),
        Some(MisuseFault::CloseOfClosedChannel)
    );
}

#[core_async::test]
async fn test_cancelled_receive_does_not_swallow_values() {
    let channel = Channel::unbuffered();

    let timed_out = time::timeout(time::Duration::from_millis(10), channel.recv()).await;
    assert!(timed_out.is_err());

    // The abandoned receive must not still be waiting for a handoff.
    assert_eq!(channel.try_send(1).unwrap_err().into_inner(), 1);
}

#[core_async::test]
async fn test_buffered_channel_preserves_fifo_across_blocked_senders() {
    let channel = Channel::buffered(2);
    let producer = {
        let sender = channel.sender();
        task::spawn(async move {
            for value in 0..20 {
                sender.send(value).await;
            }
            sender.close();
        })
    };

    let received: Vec<i32> = channel.receiver().into_stream().collect().await;
    producer.await.unwrap();
    assert_eq!(received, (0..20).collect::<Vec<_>>());
}

#[core_async::test(worker_threads = 4)]
async fn test_many_producers_and_consumers_on_rendezvous() {
    const PRODUCERS: u64 = 8;
    const PER_PRODUCER: u64 = 250;

    let channel = Channel::unbuffered();
    let producers = WaitGroup::new();
    for p in 0..PRODUCERS {
        let sender = channel.sender();
        producers.spawn(async move {
            for i in 0..PER_PRODUCER {
                sender.send(p * PER_PRODUCER + i).await;
            }
        });
    }

    let total = Arc::new(AtomicU64::new(0));
    let consumers = WaitGroup::new();
    for _ in 0..4 {
        let receiver = channel.receiver();
        let total = total.clone();
        consumers.spawn(async move {
            while let Some(value) = receiver.recv().await {
                total.fetch_add(value, Ordering::SeqCst);
            }
        });
    }

    time::timeout(WATCHDOG, producers.wait()).await.unwrap();
    channel.close();
    time::timeout(WATCHDOG, consumers.wait()).await.unwrap();

    let n = PRODUCERS * PER_PRODUCER;
    assert_eq!(total.load(Ordering::SeqCst), n * (n - 1) / 2);
}
