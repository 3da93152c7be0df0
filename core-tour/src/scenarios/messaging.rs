//! Message passing: results over unbuffered channels, the blocking behavior
//! of rendezvous and buffered channels, and select with a timer.

use crate::error::{Result, TourError};
use crate::scenarios::TASK_NAMES;
use crate::Tour;

use core_async::sync::{Channel, Mutex, Select};
use core_async::{task, time};
use futures::StreamExt;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorialsReport {
    /// `(n, n!)` pairs in the order they were received.
    pub values: Vec<(u32, u64)>,
}

/// For each `n` in `1..10`, a task computes `n!` and sends it back; the
/// spawner receives it straight away.
pub async fn factorials(tour: &Tour) -> Result<FactorialsReport> {
    let narrator = tour.narrator("factorials");
    let results = Channel::unbuffered();
    let mut values = Vec::new();

    for n in 1..10u32 {
        let results_tx = results.sender();
        task::spawn(async move {
            let factorial: u64 = (2..=u64::from(n)).product();
            results_tx.send(factorial).await;
        });

        let factorial = results
            .recv()
            .await
            .ok_or(TourError::ChannelClosed("factorials"))?;
        narrator
            .say(format!("Factorial of {} is {}", n, factorial))
            .await?;
        values.push((n, factorial));
    }

    Ok(FactorialsReport { values })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResultsReport {
    /// Completion messages in arrival order.
    pub messages: Vec<String>,
}

/// The parallel tasks again, reporting completion over a channel instead of
/// a wait group.
pub async fn task_results(tour: &Tour) -> Result<TaskResultsReport> {
    let narrator = tour.narrator("task_results");
    let results = Channel::unbuffered();

    for name in TASK_NAMES {
        let results_tx = results.sender();
        let duration = tour.units(tour.jitter() as u32);
        task::spawn(async move {
            time::sleep(duration).await;
            results_tx.send(format!("done with task {}", name)).await;
        });
    }

    let mut messages = Vec::with_capacity(TASK_NAMES.len());
    for _ in TASK_NAMES {
        let message = results
            .recv()
            .await
            .ok_or(TourError::ChannelClosed("task_results"))?;
        narrator.say(message.clone()).await?;
        messages.push(message);
    }

    Ok(TaskResultsReport { messages })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendezvousReport {
    pub received: i32,
    /// Events from both sides, in the order they happened.
    pub timeline: Vec<&'static str>,
}

impl RendezvousReport {
    /// Whether the sender only got past its send once the receiver took the
    /// value.
    pub fn send_completed_after_receive(&self) -> bool {
        let position = |event| self.timeline.iter().position(|e| *e == event);
        matches!(
            (position("receive"), position("after send")),
            (Some(receive), Some(after_send)) if receive < after_send
        )
    }
}

/// A sender blocks on an unbuffered channel until the main task finally
/// receives.
pub async fn rendezvous(tour: &Tour) -> Result<RendezvousReport> {
    let narrator = tour.narrator("rendezvous");
    let channel = Channel::unbuffered();
    let timeline = Arc::new(Mutex::new(Vec::new()));

    let sender = {
        let narrator = narrator.clone();
        let channel = channel.clone();
        let timeline = timeline.clone();
        task::spawn(async move {
            narrator.say("sender: before sending data").await?;
            timeline.lock().await.push("before send");
            channel.send(10).await;
            timeline.lock().await.push("after send");
            narrator.say("sender: after sending data").await
        })
    };

    narrator.say("main task, sleeping for 2 units").await?;
    time::sleep(tour.units(2)).await;

    narrator.say("main task receive data").await?;
    timeline.lock().await.push("receive");
    let received = channel
        .recv()
        .await
        .ok_or(TourError::ChannelClosed("rendezvous"))?;
    narrator
        .say(format!("main task received data: {}", received))
        .await?;

    sender.await??;

    let timeline = timeline.lock().await.clone();
    Ok(RendezvousReport { received, timeline })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedProducerReport {
    pub capacity: usize,
    /// Sends that had completed when the consumer started draining.
    pub sent_before_drain: usize,
    pub received: Vec<i32>,
}

/// A producer fills a capacity-3 channel ahead of a slow consumer, then
/// closes it. The consumer drains what is left as a stream.
pub async fn buffered_producer(tour: &Tour) -> Result<BufferedProducerReport> {
    const CAPACITY: usize = 3;

    let narrator = tour.narrator("buffered_producer");
    let channel = Channel::buffered(CAPACITY);
    let sent = Arc::new(AtomicUsize::new(0));

    let producer = {
        let narrator = narrator.clone();
        let sender = channel.sender();
        let sent = sent.clone();
        task::spawn(async move {
            for value in 0..5 {
                narrator
                    .say(format!("producer: before sending data {}", value))
                    .await?;
                sender.send(value).await;
                sent.fetch_add(1, Ordering::SeqCst);
                narrator
                    .say(format!("producer: after sending data {}", value))
                    .await?;
            }
            sender.close();
            Ok::<_, TourError>(())
        })
    };

    narrator.say("main task, sleeping for 2 units").await?;
    time::sleep(tour.units(2)).await;
    let sent_before_drain = sent.load(Ordering::SeqCst);

    let mut received = Vec::new();
    let mut values = Box::pin(channel.receiver().into_stream());
    while let Some(value) = values.next().await {
        narrator
            .say(format!("main task received data: {}", value))
            .await?;
        received.push(value);
    }

    producer.await??;

    Ok(BufferedProducerReport {
        capacity: CAPACITY,
        sent_before_drain,
        received,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectWinner {
    Timer,
    First(String),
    Second(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectWithTimerReport {
    /// The case chosen in each round.
    pub rounds: Vec<SelectWinner>,
    /// Messages that lost every round and were collected afterwards.
    pub late: Vec<String>,
}

impl SelectWithTimerReport {
    /// Every message, whether it won a round or arrived late.
    pub fn delivered(&self) -> Vec<String> {
        self.rounds
            .iter()
            .filter_map(|winner| match winner {
                SelectWinner::First(msg) | SelectWinner::Second(msg) => Some(msg.clone()),
                SelectWinner::Timer => None,
            })
            .chain(self.late.iter().cloned())
            .collect()
    }
}

/// Two channels fed after a delay, selected three times against a timer of
/// the same length.
pub async fn select_with_timer(tour: &Tour) -> Result<SelectWithTimerReport> {
    const ROUNDS: usize = 3;

    let narrator = tour.narrator("select_with_timer");
    let first = Channel::unbuffered();
    let second = Channel::unbuffered();
    let delay = tour.units(2);

    for (channel, message) in [(first.sender(), "Hello!"), (second.sender(), "Hey!")] {
        task::spawn(async move {
            time::sleep(delay).await;
            channel.send(message.to_string()).await;
        });
    }

    let mut rounds = Vec::with_capacity(ROUNDS);
    for _ in 0..ROUNDS {
        let winner = Select::with_entropy(tour.entropy().clone())
            .after(delay, || SelectWinner::Timer)
            .recv(&first, |msg| msg.map_or(SelectWinner::Timer, SelectWinner::First))
            .recv(&second, |msg| {
                msg.map_or(SelectWinner::Timer, SelectWinner::Second)
            })
            .await;

        let line = match &winner {
            SelectWinner::Timer => "Done with 2 units".to_string(),
            SelectWinner::First(msg) => format!("first: {}", msg),
            SelectWinner::Second(msg) => format!("second: {}", msg),
        };
        narrator.say(line).await?;
        rounds.push(winner);
    }

    // Collect whatever lost every round so no sender is left blocked.
    let mut late = Vec::new();
    let first_won = rounds.iter().any(|w| matches!(w, SelectWinner::First(_)));
    let second_won = rounds.iter().any(|w| matches!(w, SelectWinner::Second(_)));
    for (won, channel, name) in [(first_won, &first, "first"), (second_won, &second, "second")] {
        if won {
            continue;
        }
        let msg = channel
            .recv()
            .await
            .ok_or(TourError::ChannelClosed(name))?;
        tracing::debug!(channel = name, %msg, "collected late message");
        late.push(msg);
    }

    Ok(SelectWithTimerReport { rounds, late })
}
