//! Synchronization primitives.
//!
//! - [`Channel`]: bounded FIFO message passing, rendezvous or buffered, with
//!   explicit close and send-only / receive-only handles
//! - [`Select`]: wait on several channel operations, with optional default
//!   and timer cases
//! - [`Mutex`]: scoped exclusive access to shared state
//! - [`WaitGroup`]: wait for a number of tasks to signal completion
//!
//! Every blocking operation here is an `.await` point; a task waiting on one
//! gives its worker thread back to the scheduler.
//!
//! # Examples
//!
//! ```rust,ignore
//! use core_async::sync::{Channel, WaitGroup};
//!
//! let results = Channel::buffered(3);
//! let group = WaitGroup::new();
//! for id in 0..3 {
//!     let results = results.sender();
//!     group.spawn(async move { results.send(id).await });
//! }
//! group.wait().await;
//! results.close();
//! ```

mod channel;
mod mutex;
mod select;
mod signal;
mod wait_group;

pub use channel::{Channel, RecvFuture, Receiver, SendFuture, Sender, TryRecv, TrySendError};
pub use mutex::{Mutex, MutexGuard};
pub use select::{Select, SelectFuture};
pub use wait_group::{DoneGuard, WaitGroup};
