//! # Core Runtime Module
//!
//! Ambient infrastructure shared by everything built on the toolkit:
//! - Logging and tracing setup, with optional mirroring into a
//!   [`DiagnosticSink`](bridge_traits::DiagnosticSink)
//! - Configuration (`ToolkitConfig`) with fail-fast validation
//! - The crate error type

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ToolkitConfig, TourSettings};
pub use error::{Error, Result};
