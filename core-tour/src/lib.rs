//! Guided walkthrough of the toolkit.
//!
//! Each scenario in [`scenarios`] exercises one primitive the way a
//! newcomer would meet it: spawning, joining with a wait group, racing on
//! shared memory and fixing the race, then passing messages over channels
//! and multiplexing them with select. Scenarios narrate through a
//! [`DiagnosticSink`](bridge_traits::DiagnosticSink) and return a report so
//! their outcome can be checked.
//!
//! ```ignore
//! use bridge_traits::ConsoleSink;
//! use core_runtime::ToolkitConfig;
//! use core_tour::Tour;
//! use std::sync::Arc;
//!
//! let config = ToolkitConfig::builder().build()?;
//! let tour = Tour::from_config(&config, Arc::new(ConsoleSink::default()));
//! let report = config.scheduler()?.block_on(tour.run_all())?;
//! ```

pub mod error;
pub mod narrator;
pub mod scenarios;
mod tour;

pub use error::{Result, TourError};
pub use narrator::Narrator;
pub use tour::{Tour, TourReport};
