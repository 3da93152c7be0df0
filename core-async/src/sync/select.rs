//! Waiting on several channel operations at once.
//!
//! A [`Select`] is built from cases, each a receive, a send, or a timer,
//! plus an optional default. Waiting on it completes exactly one case:
//!
//! 1. Every case that is ready right now is collected and one is drawn
//!    uniformly at random. If it loses a race before it runs, it is dropped
//!    from the ready set and another is drawn.
//! 2. If nothing was ready and there is a default, the default runs.
//! 3. Otherwise the select parks on all cases and the first one to become
//!    ready wins.
//!
//! All handlers produce the same result type, so a select is an expression:
//!
//! ```rust,ignore
//! use core_async::sync::Select;
//! use core_async::time::Duration;
//!
//! let message = Select::new()
//!     .recv(&c1, |msg| format!("received {msg:?}"))
//!     .recv(&c2, |msg| format!("received {msg:?}"))
//!     .after(Duration::from_secs(1), || "timeout".to_string())
//!     .wait()
//!     .await;
//! ```

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bridge_traits::entropy::{EntropySource, ThreadRngEntropy};

use super::channel::{Enroll, Operation, Receiver, RecvOp, SendOp, Sender};
use super::signal::Signal;

trait Arm<R> {
    fn is_ready(&self) -> bool;
    fn poll_now(&mut self) -> Option<R>;
    fn enroll(&mut self, signal: &Arc<Signal>, case: usize) -> Enroll<R>;
    fn collect(&mut self) -> Option<R>;
    fn withdraw(&mut self);
}

struct Case<O, F> {
    op: O,
    handler: Option<F>,
}

impl<O, F> Case<O, F>
where
    O: Operation,
{
    fn fire<R>(&mut self, output: O::Output) -> R
    where
        F: FnOnce(O::Output) -> R,
    {
        let handler = self.handler.take().expect("select case resolved twice");
        handler(output)
    }
}

impl<O, F, R> Arm<R> for Case<O, F>
where
    O: Operation,
    F: FnOnce(O::Output) -> R,
{
    fn is_ready(&self) -> bool {
        self.op.is_ready()
    }

    fn poll_now(&mut self) -> Option<R> {
        let output = self.op.poll_now()?;
        Some(self.fire(output))
    }

    fn enroll(&mut self, signal: &Arc<Signal>, case: usize) -> Enroll<R> {
        match self.op.enroll(signal, case) {
            Enroll::Fired(output) => Enroll::Fired(self.fire(output)),
            Enroll::Parked => Enroll::Parked,
            Enroll::Lost => Enroll::Lost,
        }
    }

    fn collect(&mut self) -> Option<R> {
        let output = self.op.collect()?;
        Some(self.fire(output))
    }

    fn withdraw(&mut self) {
        self.op.withdraw();
    }
}

type BoxedArm<'a, R> = Box<dyn Arm<R> + Send + 'a>;
type DefaultHandler<'a, R> = Box<dyn FnOnce() -> R + Send + 'a>;

/// Builder for a multi-way wait. See the module docs.
#[must_use = "a select does nothing until it is awaited"]
pub struct Select<'a, R> {
    cases: Vec<BoxedArm<'a, R>>,
    default: Option<DefaultHandler<'a, R>>,
    entropy: Arc<dyn EntropySource>,
}

impl<'a, R: 'a> Select<'a, R> {
    /// A select that breaks ties with the thread RNG.
    pub fn new() -> Self {
        Self::with_entropy(Arc::new(ThreadRngEntropy))
    }

    pub fn with_entropy(entropy: Arc<dyn EntropySource>) -> Self {
        Self {
            cases: Vec::new(),
            default: None,
            entropy,
        }
    }

    /// Receive case. The handler gets `None` if the channel is closed and
    /// drained.
    pub fn recv<T, F>(mut self, receiver: impl Into<Receiver<T>>, handler: F) -> Self
    where
        T: Send + 'a,
        F: FnOnce(Option<T>) -> R + Send + 'a,
    {
        let op = RecvOp::new(receiver.into().shared());
        self.cases.push(Box::new(Case {
            op,
            handler: Some(handler),
        }));
        self
    }

    /// Send case. Choosing it on a closed channel is a send-on-closed fault.
    pub fn send<T, F>(mut self, sender: impl Into<Sender<T>>, value: T, handler: F) -> Self
    where
        T: Send + 'a,
        F: FnOnce() -> R + Send + 'a,
    {
        let op = SendOp::new(sender.into().shared(), value);
        self.cases.push(Box::new(Case {
            op,
            handler: Some(move |()| handler()),
        }));
        self
    }

    /// Timer case, ready once `duration` has elapsed. The timer starts now.
    pub fn after<F>(self, duration: Duration, handler: F) -> Self
    where
        F: FnOnce() -> R + Send + 'a,
    {
        let timer = crate::time::after(duration);
        self.recv(timer, move |_| handler())
    }

    /// Run `handler` instead of blocking when no case is ready. Replaces any
    /// earlier default.
    pub fn default<F>(mut self, handler: F) -> Self
    where
        F: FnOnce() -> R + Send + 'a,
    {
        self.default = Some(Box::new(handler));
        self
    }

    /// Number of non-default cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Wait for one case to complete and return its handler's result.
    ///
    /// A select with no cases and no default never completes.
    pub fn wait(self) -> SelectFuture<'a, R> {
        SelectFuture {
            cases: self.cases,
            default: self.default,
            entropy: self.entropy,
            signal: None,
            enrolled: Vec::new(),
        }
    }
}

impl<'a, R: 'a> IntoFuture for Select<'a, R> {
    type Output = R;
    type IntoFuture = SelectFuture<'a, R>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait()
    }
}

/// Future returned by [`Select::wait`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct SelectFuture<'a, R> {
    cases: Vec<BoxedArm<'a, R>>,
    default: Option<DefaultHandler<'a, R>>,
    entropy: Arc<dyn EntropySource>,
    signal: Option<Arc<Signal>>,
    enrolled: Vec<usize>,
}

impl<R> Unpin for SelectFuture<'_, R> {}

impl<R> SelectFuture<'_, R> {
    fn fire_ready(&mut self) -> Option<R> {
        let mut ready: Vec<usize> = (0..self.cases.len())
            .filter(|&case| self.cases[case].is_ready())
            .collect();

        while !ready.is_empty() {
            let case = ready.swap_remove(self.entropy.next_int(ready.len()));
            if let Some(output) = self.cases[case].poll_now() {
                tracing::trace!(case, "select resolved without waiting");
                return Some(output);
            }
        }
        None
    }

    fn shuffled(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.cases.len()).collect();
        for i in (1..order.len()).rev() {
            let j = self.entropy.next_int(i + 1);
            order.swap(i, j);
        }
        order
    }

    fn enroll_all(&mut self, signal: &Arc<Signal>) -> Option<R> {
        for case in self.shuffled() {
            match self.cases[case].enroll(signal, case) {
                Enroll::Fired(output) => {
                    self.withdraw_all();
                    tracing::trace!(case, "select resolved while enrolling");
                    return Some(output);
                }
                Enroll::Parked => self.enrolled.push(case),
                Enroll::Lost => break,
            }
        }
        None
    }

    fn withdraw_all(&mut self) {
        for case in self.enrolled.drain(..) {
            self.cases[case].withdraw();
        }
    }
}

impl<R> Future for SelectFuture<'_, R> {
    type Output = R;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<R> {
        let this = self.get_mut();

        loop {
            let signal = if let Some(signal) = this.signal.clone() {
                signal
            } else {
                if let Some(output) = this.fire_ready() {
                    return Poll::Ready(output);
                }
                if let Some(default) = this.default.take() {
                    tracing::trace!("select took default");
                    return Poll::Ready(default());
                }
                if this.cases.is_empty() {
                    return Poll::Pending;
                }

                let signal = Signal::new();
                signal.register(cx.waker());
                if let Some(output) = this.enroll_all(&signal) {
                    return Poll::Ready(output);
                }
                this.signal = Some(signal.clone());
                signal
            };

            signal.register(cx.waker());
            if let Some(case) = signal.claimed_case() {
                return match this.cases[case].collect() {
                    Some(output) => {
                        this.withdraw_all();
                        this.signal = None;
                        tracing::trace!(case, "select resolved after waiting");
                        Poll::Ready(output)
                    }
                    None => Poll::Pending,
                };
            }

            if !signal.was_revoked() {
                return Poll::Pending;
            }

            if signal.retire() {
                this.withdraw_all();
                this.signal = None;
            }
        }
    }
}

impl<R> Drop for SelectFuture<'_, R> {
    fn drop(&mut self) {
        let Some(signal) = self.signal.take() else {
            return;
        };
        if signal.retire() {
            self.withdraw_all();
            return;
        }
        self.withdraw_all();
        if !signal.retire() {
            tracing::trace!("select completed while being cancelled");
        }
    }
}
