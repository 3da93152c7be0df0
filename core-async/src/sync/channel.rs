//! Bounded FIFO channels with blocking send and receive.
//!
//! A channel with capacity 0 is a rendezvous: a send completes only when a
//! receiver takes the value directly out of the sender's hands. A channel
//! with capacity `C > 0` accepts up to `C` values without blocking.
//!
//! Closing is explicit and happens once. After close, receivers drain what
//! is left in the buffer and then observe `None` forever, while any send
//! (blocked or new) is a [`MisuseFault::SendOnClosedChannel`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use core_async::sync::Channel;
//!
//! let channel = Channel::buffered(3);
//! channel.send(1).await;
//! channel.send(2).await;
//! channel.close();
//!
//! assert_eq!(channel.recv().await, Some(1));
//! assert_eq!(channel.recv_ok().await, (2, true));
//! assert_eq!(channel.recv_ok().await, (0, false));
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;

use super::signal::{Signal, Wakeups};
use crate::fault::{self, MisuseFault};

pub(crate) struct Shared<T> {
    state: Mutex<State<T>>,
}

struct State<T> {
    capacity: usize,
    buffer: VecDeque<T>,
    closed: bool,
    senders: VecDeque<Arc<SendEntry<T>>>,
    receivers: VecDeque<Arc<RecvEntry<T>>>,
}

struct SendEntry<T> {
    signal: Arc<Signal>,
    case: usize,
    slot: Mutex<SendSlot<T>>,
}

enum SendSlot<T> {
    Offered(T),
    Taken,
    Closed,
}

struct RecvEntry<T> {
    signal: Arc<Signal>,
    case: usize,
    slot: Mutex<RecvSlot<T>>,
}

enum RecvSlot<T> {
    Pending,
    Value(T),
    Closed,
}

impl<T> SendEntry<T> {
    fn take(&self) -> T {
        match std::mem::replace(&mut *self.slot.lock(), SendSlot::Taken) {
            SendSlot::Offered(value) => value,
            _ => unreachable!("claimed a sender with nothing on offer"),
        }
    }
}

impl<T> RecvEntry<T> {
    fn fill(&self, slot: RecvSlot<T>) {
        *self.slot.lock() = slot;
    }
}

/// The parked operation attempting to complete, if any.
struct Claimant<'a> {
    signal: &'a Arc<Signal>,
    case: usize,
}

fn claim_own(own: Option<&Claimant<'_>>) -> bool {
    own.map_or(true, |c| c.signal.claim(c.case))
}

fn is_own(own: Option<&Claimant<'_>>, signal: &Arc<Signal>) -> bool {
    own.is_some_and(|c| Arc::ptr_eq(c.signal, signal))
}

enum RecvAttempt<T> {
    Done(Option<T>),
    WouldBlock,
    Lost,
}

enum SendAttempt<T> {
    Sent,
    Closed,
    WouldBlock(T),
    Lost(T),
}

impl<T> State<T> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            closed: false,
            senders: VecDeque::new(),
            receivers: VecDeque::new(),
        }
    }

    fn recv_ready(&self) -> bool {
        !self.buffer.is_empty()
            || self.closed
            || self.senders.iter().any(|e| e.signal.is_waiting())
    }

    fn send_ready(&self) -> bool {
        self.closed
            || self.buffer.len() < self.capacity
            || self.receivers.iter().any(|e| e.signal.is_waiting())
    }

    /// Pops and claims the oldest blocked sender that does not belong to
    /// `own`. Entries that can no longer be claimed are discarded.
    fn claim_sender(&mut self, own: Option<&Claimant<'_>>) -> Option<Arc<SendEntry<T>>> {
        let mut skipped = Vec::new();
        let mut found = None;
        while let Some(entry) = self.senders.pop_front() {
            if is_own(own, &entry.signal) {
                skipped.push(entry);
            } else if entry.signal.claim(entry.case) {
                found = Some(entry);
                break;
            }
        }
        while let Some(entry) = skipped.pop() {
            self.senders.push_front(entry);
        }
        found
    }

    fn claim_receiver(&mut self, own: Option<&Claimant<'_>>) -> Option<Arc<RecvEntry<T>>> {
        let mut skipped = Vec::new();
        let mut found = None;
        while let Some(entry) = self.receivers.pop_front() {
            if is_own(own, &entry.signal) {
                skipped.push(entry);
            } else if entry.signal.claim(entry.case) {
                found = Some(entry);
                break;
            }
        }
        while let Some(entry) = skipped.pop() {
            self.receivers.push_front(entry);
        }
        found
    }

    fn recv(&mut self, own: Option<&Claimant<'_>>, wakeups: &mut Wakeups) -> RecvAttempt<T> {
        if !self.buffer.is_empty() {
            if !claim_own(own) {
                return RecvAttempt::Lost;
            }
            let value = self.buffer.pop_front();
            // A slot just opened up: move the oldest blocked sender's value in.
            if let Some(sender) = self.claim_sender(own) {
                self.buffer.push_back(sender.take());
                wakeups.push(sender.signal.clone());
            }
            return RecvAttempt::Done(value);
        }

        if let Some(sender) = self.claim_sender(own) {
            if !claim_own(own) {
                sender.signal.revoke();
                wakeups.push(sender.signal.clone());
                self.senders.push_front(sender);
                return RecvAttempt::Lost;
            }
            let value = sender.take();
            wakeups.push(sender.signal.clone());
            return RecvAttempt::Done(Some(value));
        }

        if self.closed {
            if !claim_own(own) {
                return RecvAttempt::Lost;
            }
            return RecvAttempt::Done(None);
        }

        RecvAttempt::WouldBlock
    }

    fn send(&mut self, value: T, own: Option<&Claimant<'_>>, wakeups: &mut Wakeups) -> SendAttempt<T> {
        if self.closed {
            return SendAttempt::Closed;
        }

        if let Some(receiver) = self.claim_receiver(own) {
            if !claim_own(own) {
                receiver.signal.revoke();
                wakeups.push(receiver.signal.clone());
                self.receivers.push_front(receiver);
                return SendAttempt::Lost(value);
            }
            receiver.fill(RecvSlot::Value(value));
            wakeups.push(receiver.signal.clone());
            return SendAttempt::Sent;
        }

        if self.buffer.len() < self.capacity {
            if !claim_own(own) {
                return SendAttempt::Lost(value);
            }
            self.buffer.push_back(value);
            return SendAttempt::Sent;
        }

        SendAttempt::WouldBlock(value)
    }

    /// Returns the number of blocked receivers and senders released.
    fn close(&mut self, wakeups: &mut Wakeups) -> (usize, usize) {
        self.closed = true;

        let mut receivers = 0;
        for entry in self.receivers.drain(..) {
            if entry.signal.claim(entry.case) {
                entry.fill(RecvSlot::Closed);
                wakeups.push(entry.signal.clone());
                receivers += 1;
            }
        }

        let mut senders = 0;
        for entry in self.senders.drain(..) {
            if entry.signal.claim(entry.case) {
                *entry.slot.lock() = SendSlot::Closed;
                wakeups.push(entry.signal.clone());
                senders += 1;
            }
        }

        (receivers, senders)
    }
}

/// Result of offering a parked operation to a channel.
pub(crate) enum Enroll<O> {
    /// Completed on the spot.
    Fired(O),
    /// Queued; completion will be signalled.
    Parked,
    /// The owner's signal was claimed by one of its other entries.
    Lost,
}

/// One channel operation that may have to wait.
pub(crate) trait Operation {
    type Output;

    fn is_ready(&self) -> bool;

    /// Complete without waiting, if possible.
    fn poll_now(&mut self) -> Option<Self::Output>;

    fn enroll(&mut self, signal: &Arc<Signal>, case: usize) -> Enroll<Self::Output>;

    /// Output of a claimed entry, once the claimer has filled it in.
    fn collect(&mut self) -> Option<Self::Output>;

    /// Remove any parked entry from the channel. Must only be called once
    /// the signal is retired or claimed.
    fn withdraw(&mut self);
}

pub(crate) struct RecvOp<T> {
    shared: Arc<Shared<T>>,
    entry: Option<Arc<RecvEntry<T>>>,
}

impl<T> RecvOp<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared, entry: None }
    }
}

impl<T> Operation for RecvOp<T> {
    type Output = Option<T>;

    fn is_ready(&self) -> bool {
        self.shared.state.lock().recv_ready()
    }

    fn poll_now(&mut self) -> Option<Option<T>> {
        let mut wakeups = Wakeups::default();
        let attempt = self.shared.state.lock().recv(None, &mut wakeups);
        wakeups.wake_all();
        match attempt {
            RecvAttempt::Done(value) => Some(value),
            RecvAttempt::WouldBlock | RecvAttempt::Lost => None,
        }
    }

    fn enroll(&mut self, signal: &Arc<Signal>, case: usize) -> Enroll<Option<T>> {
        let claimant = Claimant { signal, case };
        let mut wakeups = Wakeups::default();
        let outcome = {
            let mut state = self.shared.state.lock();
            match state.recv(Some(&claimant), &mut wakeups) {
                RecvAttempt::Done(value) => Enroll::Fired(value),
                RecvAttempt::Lost => Enroll::Lost,
                RecvAttempt::WouldBlock => {
                    let entry = Arc::new(RecvEntry {
                        signal: signal.clone(),
                        case,
                        slot: Mutex::new(RecvSlot::Pending),
                    });
                    state.receivers.push_back(entry.clone());
                    self.entry = Some(entry);
                    Enroll::Parked
                }
            }
        };
        wakeups.wake_all();
        outcome
    }

    fn collect(&mut self) -> Option<Option<T>> {
        let entry = self.entry.as_ref()?;
        let value = match std::mem::replace(&mut *entry.slot.lock(), RecvSlot::Pending) {
            RecvSlot::Pending => return None,
            RecvSlot::Value(value) => Some(value),
            RecvSlot::Closed => None,
        };
        self.entry = None;
        Some(value)
    }

    fn withdraw(&mut self) {
        if let Some(entry) = self.entry.take() {
            self.shared
                .state
                .lock()
                .receivers
                .retain(|queued| !Arc::ptr_eq(queued, &entry));
        }
    }
}

pub(crate) struct SendOp<T> {
    shared: Arc<Shared<T>>,
    value: Option<T>,
    entry: Option<Arc<SendEntry<T>>>,
}

impl<T> SendOp<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>, value: T) -> Self {
        Self {
            shared,
            value: Some(value),
            entry: None,
        }
    }
}

impl<T> Operation for SendOp<T> {
    type Output = ();

    fn is_ready(&self) -> bool {
        self.shared.state.lock().send_ready()
    }

    fn poll_now(&mut self) -> Option<()> {
        let value = self.value.take()?;
        let mut wakeups = Wakeups::default();
        let attempt = self.shared.state.lock().send(value, None, &mut wakeups);
        wakeups.wake_all();
        match attempt {
            SendAttempt::Sent => Some(()),
            SendAttempt::Closed => fault::raise(MisuseFault::SendOnClosedChannel),
            SendAttempt::WouldBlock(value) | SendAttempt::Lost(value) => {
                self.value = Some(value);
                None
            }
        }
    }

    fn enroll(&mut self, signal: &Arc<Signal>, case: usize) -> Enroll<()> {
        let Some(value) = self.value.take() else {
            return Enroll::Lost;
        };
        let claimant = Claimant { signal, case };
        let mut wakeups = Wakeups::default();
        let attempt = {
            let mut state = self.shared.state.lock();
            match state.send(value, Some(&claimant), &mut wakeups) {
                SendAttempt::WouldBlock(value) => {
                    let entry = Arc::new(SendEntry {
                        signal: signal.clone(),
                        case,
                        slot: Mutex::new(SendSlot::Offered(value)),
                    });
                    state.senders.push_back(entry.clone());
                    self.entry = Some(entry);
                    None
                }
                other => Some(other),
            }
        };
        wakeups.wake_all();
        match attempt {
            None => Enroll::Parked,
            Some(SendAttempt::Sent) => Enroll::Fired(()),
            Some(SendAttempt::Closed) => fault::raise(MisuseFault::SendOnClosedChannel),
            Some(SendAttempt::Lost(value)) | Some(SendAttempt::WouldBlock(value)) => {
                self.value = Some(value);
                Enroll::Lost
            }
        }
    }

    fn collect(&mut self) -> Option<()> {
        let closed = {
            let entry = self.entry.as_ref()?;
            let slot = entry.slot.lock();
            match *slot {
                SendSlot::Offered(_) => return None,
                SendSlot::Taken => false,
                SendSlot::Closed => true,
            }
        };
        self.entry = None;
        if closed {
            fault::raise(MisuseFault::SendOnClosedChannel);
        }
        Some(())
    }

    fn withdraw(&mut self) {
        if let Some(entry) = self.entry.take() {
            self.shared
                .state
                .lock()
                .senders
                .retain(|queued| !Arc::ptr_eq(queued, &entry));
            if let SendSlot::Offered(value) =
                std::mem::replace(&mut *entry.slot.lock(), SendSlot::Taken)
            {
                self.value = Some(value);
            }
        }
    }
}

/// Drives a single operation through enroll, park and collect.
pub(crate) struct Parked<O: Operation> {
    op: O,
    signal: Option<Arc<Signal>>,
}

impl<O: Operation> Parked<O> {
    fn new(op: O) -> Self {
        Self { op, signal: None }
    }

    fn poll_op(&mut self, cx: &mut Context<'_>) -> Poll<O::Output> {
        loop {
            let signal = if let Some(signal) = self.signal.clone() {
                signal
            } else {
                if let Some(output) = self.op.poll_now() {
                    return Poll::Ready(output);
                }
                let signal = Signal::new();
                signal.register(cx.waker());
                match self.op.enroll(&signal, 0) {
                    Enroll::Fired(output) => return Poll::Ready(output),
                    Enroll::Lost => continue,
                    Enroll::Parked => {
                        self.signal = Some(signal.clone());
                        signal
                    }
                }
            };

            signal.register(cx.waker());
            if signal.claimed_case().is_some() {
                return match self.op.collect() {
                    Some(output) => {
                        self.signal = None;
                        Poll::Ready(output)
                    }
                    None => Poll::Pending,
                };
            }

            if !signal.was_revoked() {
                return Poll::Pending;
            }

            // A handoff was attempted and rolled back; start over.
            if signal.retire() {
                self.op.withdraw();
                self.signal = None;
            }
        }
    }
}

impl<O: Operation> Drop for Parked<O> {
    fn drop(&mut self) {
        let Some(signal) = self.signal.take() else {
            return;
        };
        if signal.retire() {
            self.op.withdraw();
            return;
        }
        // Taking the channel lock waits out a handoff that is still in flight.
        self.op.withdraw();
        if !signal.retire() {
            tracing::trace!("channel operation completed while being cancelled");
        }
    }
}

/// Future returned by [`Channel::send`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct SendFuture<T> {
    inner: Parked<SendOp<T>>,
}

impl<T> Unpin for SendFuture<T> {}

impl<T> Future for SendFuture<T> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.get_mut().inner.poll_op(cx)
    }
}

/// Future returned by [`Channel::recv`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct RecvFuture<T> {
    inner: Parked<RecvOp<T>>,
}

impl<T> Future for RecvFuture<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().inner.poll_op(cx)
    }
}

/// Error returned by [`Channel::try_send`].
#[derive(PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The send would block. The value is handed back.
    Full(T),
}

impl<T> TrySendError<T> {
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(value) => value,
        }
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("Full(..)"),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("channel is full"),
        }
    }
}

impl<T> std::error::Error for TrySendError<T> {}

/// Outcome of [`Channel::try_recv`].
#[derive(Debug, PartialEq, Eq)]
pub enum TryRecv<T> {
    Value(T),
    /// Nothing available right now.
    Empty,
    /// Closed and drained.
    Closed,
}

impl<T> TryRecv<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, TryRecv::Empty)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TryRecv::Closed)
    }

    pub fn value(self) -> Option<T> {
        match self {
            TryRecv::Value(value) => Some(value),
            TryRecv::Empty | TryRecv::Closed => None,
        }
    }
}

/// A multi-producer, multi-consumer channel.
///
/// Cloning a `Channel` yields another handle to the same queue.
pub struct Channel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Channel<T> {
    /// Create a channel holding up to `capacity` values. Zero makes it a
    /// rendezvous channel.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::new(capacity)),
            }),
        }
    }

    pub fn unbuffered() -> Self {
        Self::new(0)
    }

    pub fn buffered(capacity: usize) -> Self {
        Self::new(capacity)
    }

    /// Send `value`, waiting for buffer space or a receiver.
    ///
    /// # Panics
    ///
    /// Raises [`MisuseFault::SendOnClosedChannel`] if the channel is closed,
    /// including when it is closed while this send is waiting.
    pub fn send(&self, value: T) -> SendFuture<T> {
        SendFuture {
            inner: Parked::new(SendOp::new(self.shared.clone(), value)),
        }
    }

    /// Receive the oldest value. Resolves to `None` once the channel is
    /// closed and drained.
    pub fn recv(&self) -> RecvFuture<T> {
        RecvFuture {
            inner: Parked::new(RecvOp::new(self.shared.clone())),
        }
    }

    /// Receive with an explicit "ok" flag; a closed, drained channel yields
    /// `(T::default(), false)`.
    pub async fn recv_ok(&self) -> (T, bool)
    where
        T: Default,
    {
        match self.recv().await {
            Some(value) => (value, true),
            None => (T::default(), false),
        }
    }

    /// Send without waiting.
    ///
    /// # Panics
    ///
    /// Raises [`MisuseFault::SendOnClosedChannel`] if the channel is closed.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut wakeups = Wakeups::default();
        let attempt = self.shared.state.lock().send(value, None, &mut wakeups);
        wakeups.wake_all();
        match attempt {
            SendAttempt::Sent => Ok(()),
            SendAttempt::Closed => fault::raise(MisuseFault::SendOnClosedChannel),
            SendAttempt::WouldBlock(value) | SendAttempt::Lost(value) => {
                Err(TrySendError::Full(value))
            }
        }
    }

    /// Like `try_send`, but a closed channel simply refuses the value.
    pub(crate) fn offer(&self, value: T) -> bool {
        let mut wakeups = Wakeups::default();
        let attempt = self.shared.state.lock().send(value, None, &mut wakeups);
        wakeups.wake_all();
        matches!(attempt, SendAttempt::Sent)
    }

    pub fn try_recv(&self) -> TryRecv<T> {
        let mut wakeups = Wakeups::default();
        let attempt = self.shared.state.lock().recv(None, &mut wakeups);
        wakeups.wake_all();
        match attempt {
            RecvAttempt::Done(Some(value)) => TryRecv::Value(value),
            RecvAttempt::Done(None) => TryRecv::Closed,
            RecvAttempt::WouldBlock | RecvAttempt::Lost => TryRecv::Empty,
        }
    }

    /// Close the channel, releasing every blocked receiver and sender.
    ///
    /// # Panics
    ///
    /// Raises [`MisuseFault::CloseOfClosedChannel`] if already closed.
    pub fn close(&self) {
        let mut wakeups = Wakeups::default();
        let (capacity, released) = {
            let mut state = self.shared.state.lock();
            if state.closed {
                drop(state);
                fault::raise(MisuseFault::CloseOfClosedChannel);
            }
            (state.capacity, state.close(&mut wakeups))
        };
        wakeups.wake_all();
        tracing::debug!(
            capacity,
            released_receivers = released.0,
            released_senders = released.1,
            "channel closed"
        );
    }

    /// Number of buffered values.
    pub fn len(&self) -> usize {
        self.shared.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.state.lock().capacity
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// A send-only handle to this channel.
    pub fn sender(&self) -> Sender<T> {
        Sender {
            channel: self.clone(),
        }
    }

    /// A receive-only handle to this channel.
    pub fn receiver(&self) -> Receiver<T> {
        Receiver {
            channel: self.clone(),
        }
    }

    pub(crate) fn shared(&self) -> Arc<Shared<T>> {
        self.shared.clone()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Channel")
            .field("capacity", &state.capacity)
            .field("len", &state.buffer.len())
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}

/// Send-only handle to a [`Channel`].
pub struct Sender<T> {
    channel: Channel<T>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<T> Sender<T> {
    pub fn send(&self, value: T) -> SendFuture<T> {
        self.channel.send(value)
    }

    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.channel.try_send(value)
    }

    pub(crate) fn offer(&self, value: T) -> bool {
        self.channel.offer(value)
    }

    pub fn close(&self) {
        self.channel.close()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.channel.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub(crate) fn shared(&self) -> Arc<Shared<T>> {
        self.channel.shared()
    }
}

impl<T> From<&Channel<T>> for Sender<T> {
    fn from(channel: &Channel<T>) -> Self {
        channel.sender()
    }
}

impl<T> From<&Sender<T>> for Sender<T> {
    fn from(sender: &Sender<T>) -> Self {
        sender.clone()
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sender").field(&self.channel).finish()
    }
}

/// Receive-only handle to a [`Channel`].
pub struct Receiver<T> {
    channel: Channel<T>,
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<T> Receiver<T> {
    pub fn recv(&self) -> RecvFuture<T> {
        self.channel.recv()
    }

    pub async fn recv_ok(&self) -> (T, bool)
    where
        T: Default,
    {
        self.channel.recv_ok().await
    }

    pub fn try_recv(&self) -> TryRecv<T> {
        self.channel.try_recv()
    }

    pub fn close(&self) {
        self.channel.close()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.channel.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Yield values until the channel is closed and drained.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static
    where
        T: Send + 'static,
    {
        futures::stream::unfold(self, |receiver| async move {
            let value = receiver.recv().await?;
            Some((value, receiver))
        })
    }

    pub(crate) fn shared(&self) -> Arc<Shared<T>> {
        self.channel.shared()
    }
}

impl<T> From<&Channel<T>> for Receiver<T> {
    fn from(channel: &Channel<T>) -> Self {
        channel.receiver()
    }
}

impl<T> From<&Receiver<T>> for Receiver<T> {
    fn from(receiver: &Receiver<T>) -> Self {
        receiver.clone()
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Receiver").field(&self.channel).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn fault_of(f: impl FnOnce()) -> Option<MisuseFault> {
        let payload = catch_unwind(AssertUnwindSafe(f)).err()?;
        fault::downcast(payload.as_ref()).cloned()
    }

    #[test]
    fn test_buffered_fills_then_reports_full() {
        let channel = Channel::buffered(2);
        assert!(channel.try_send(1).is_ok());
        assert!(channel.try_send(2).is_ok());

        let err = channel.try_send(3).unwrap_err();
        assert_eq!(err.into_inner(), 3);
        assert_eq!(channel.len(), 2);
        assert_eq!(channel.capacity(), 2);
    }

    #[test]
    fn test_unbuffered_try_send_without_receiver_is_full() {
        let channel = Channel::unbuffered();
        assert_eq!(channel.try_send("hi"), Err(TrySendError::Full("hi")));
        assert!(channel.try_recv().is_empty());
    }

    #[test]
    fn test_close_drains_in_order_then_reports_closed() {
        let channel = Channel::buffered(3);
        for value in 1..=3 {
            channel.try_send(value).unwrap();
        }
        channel.close();

        assert_eq!(channel.try_recv(), TryRecv::Value(1));
        assert_eq!(channel.try_recv(), TryRecv::Value(2));
        assert_eq!(channel.try_recv(), TryRecv::Value(3));
        for _ in 0..5 {
            assert!(channel.try_recv().is_closed());
        }
    }

    #[test]
    fn test_close_twice_faults() {
        let channel = Channel::<u8>::unbuffered();
        channel.close();

        assert_eq!(
            fault_of(|| channel.close()),
            Some(MisuseFault::CloseOfClosedChannel)
        );
    }

    #[test]
    fn test_try_send_on_closed_faults() {
        let channel = Channel::buffered(1);
        channel.close();

        assert_eq!(
            fault_of(|| {
                let _ = channel.try_send(7);
            }),
            Some(MisuseFault::SendOnClosedChannel)
        );
    }

    #[test]
    fn test_offer_refuses_closed_channel() {
        let channel = Channel::buffered(1);
        channel.close();
        assert!(!channel.offer(1));
    }

    #[test]
    fn test_directional_handles_share_queue() {
        let channel = Channel::buffered(4);
        let tx = Sender::from(&channel);
        let rx = Receiver::from(&channel);

        tx.try_send("a").unwrap();
        assert_eq!(rx.len(), 1);
        assert_eq!(rx.try_recv().value(), Some("a"));

        rx.close();
        assert!(tx.is_closed());
    }

    #[test]
    fn test_debug_output() {
        let channel = Channel::<u32>::buffered(2);
        channel.try_send(5).unwrap();
        let rendered = format!("{channel:?}");
        assert!(rendered.contains("capacity: 2"));
        assert!(rendered.contains("len: 1"));
    }
}
