//! Concurrency toolkit: tasks, wait groups, mutexes, channels and select.
//!
//! Tasks run M:N on a pool of worker threads. They coordinate completion via
//! [`WaitGroup`](sync::WaitGroup), protect shared memory via
//! [`Mutex`](sync::Mutex), and exchange data via [`Channel`](sync::Channel);
//! [`Select`](sync::Select) composes several channel operations into a single
//! wait point.
//!
//! # Modules
//!
//! - `runtime`: the scheduler and its configuration
//! - `task`: spawning tasks
//! - `time`: sleep, timeouts, and timer channels
//! - `sync`: the synchronization primitives
//! - `fault`: misuse faults raised by the primitives
//!
//! # Examples
//!
//! ```rust,ignore
//! use core_async::sync::Channel;
//!
//! #[core_async::main]
//! async fn main() {
//!     let messages = Channel::unbuffered();
//!     let tx = messages.sender();
//!     core_async::spawn(async move { tx.send("ping").await });
//!     assert_eq!(messages.recv().await, Some("ping"));
//! }
//! ```

pub use core_async_macros::{main, test};

pub mod fault;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use fault::{FaultPolicy, MisuseFault};
pub use task::spawn;
pub use time::{sleep, Duration, Instant};
