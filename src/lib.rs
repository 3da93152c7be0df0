//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-async`, `core-runtime`, `core-tour`).
//! Host applications can depend on `toolkit-workspace` and enable the
//! documented features without needing to wire each crate individually.

pub use core_async::{sync, task, time};

#[cfg(feature = "tour")]
pub use core_tour::Tour;
