//! # Host Bridge Traits
//!
//! Harness-facing abstractions the concurrency toolkit talks to but does not own.
//!
//! ## Overview
//!
//! The toolkit core has no network, file or wire surface. Its only boundaries
//! are the three capabilities below, each supplied by whoever hosts the core
//! (the `tour` binary, a test harness, an embedding application):
//!
//! - [`DiagnosticSink`](diagnostics::DiagnosticSink) - write-only sink of ordered
//!   text lines, used purely for observability
//! - [`EntropySource`](entropy::EntropySource) - `next_int(bound)` used for select
//!   tie-breaking and for jittering simulated task durations
//! - [`Clock`](time::Clock) - monotonic time source
//!
//! Default implementations live next to each trait so a host can start without
//! writing adapters:
//!
//! | Capability | Default | Test-friendly |
//! |------------|---------|---------------|
//! | Diagnostics | [`ConsoleSink`](diagnostics::ConsoleSink) | [`MemorySink`](diagnostics::MemorySink) |
//! | Entropy | [`ThreadRngEntropy`](entropy::ThreadRngEntropy) | [`SeededEntropy`](entropy::SeededEntropy) |
//! | Clock | [`SystemClock`](time::SystemClock) | - |
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across tasks running on different worker threads.

pub mod diagnostics;
pub mod entropy;
pub mod error;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use diagnostics::{ConsoleSink, DiagnosticLine, DiagnosticSink, LogLevel, MemorySink};
pub use entropy::{EntropySource, SeededEntropy, ThreadRngEntropy};
pub use time::{Clock, SystemClock};
