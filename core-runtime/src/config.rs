//! # Toolkit Configuration
//!
//! A builder for everything a program built on the toolkit needs at startup:
//! scheduler sizing, fault policy, logging, the entropy seed, and the pacing
//! of the tutorial scenarios.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{ToolkitConfig, TourSettings};
//! use core_async::time::Duration;
//!
//! let config = ToolkitConfig::builder()
//!     .worker_threads(4)
//!     .entropy_seed(42)
//!     .tour(TourSettings::default().with_time_unit(Duration::from_millis(10)))
//!     .build()?;
//!
//! let scheduler = config.scheduler()?;
//! # Ok::<(), core_runtime::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! `build()` validates the settings and returns [`Error::Config`] with an
//! actionable message for the first problem found.

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;

use bridge_traits::{EntropySource, SeededEntropy, ThreadRngEntropy};
use core_async::runtime::{Scheduler, SchedulerConfig};
use core_async::time::Duration;
use core_async::FaultPolicy;

use std::sync::Arc;

const MAX_TIME_UNIT: Duration = Duration::from_secs(60);

/// Pacing of the tutorial scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourSettings {
    /// Length of one simulated "second" of work.
    pub time_unit: Duration,

    /// Simulated task durations are drawn from `[0, jitter_bound)` units.
    pub jitter_bound: usize,

    /// Incrementer/decrementer pairs in the race scenarios.
    pub race_pairs: usize,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_secs(1),
            jitter_bound: 5,
            race_pairs: 100,
        }
    }
}

impl TourSettings {
    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    pub fn with_jitter_bound(mut self, jitter_bound: usize) -> Self {
        self.jitter_bound = jitter_bound;
        self
    }

    pub fn with_race_pairs(mut self, race_pairs: usize) -> Self {
        self.race_pairs = race_pairs;
        self
    }

    /// `units` time units as a duration.
    pub fn units(&self, units: u32) -> Duration {
        self.time_unit * units
    }

    pub fn validate(&self) -> Result<()> {
        if self.jitter_bound == 0 {
            return Err(Error::Config(
                "Jitter bound must be greater than 0".to_string(),
            ));
        }

        if self.race_pairs == 0 {
            return Err(Error::Config(
                "Race pairs must be greater than 0".to_string(),
            ));
        }

        if self.time_unit > MAX_TIME_UNIT {
            return Err(Error::Config(
                "Time unit exceeds maximum of 60 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Startup configuration. Use [`ToolkitConfig::builder`] to construct one.
#[derive(Debug, Clone)]
pub struct ToolkitConfig {
    /// Worker threads in the scheduler pool
    pub worker_threads: usize,

    /// What happens when a task panics
    pub fault_policy: FaultPolicy,

    /// Logging setup
    pub logging: LoggingConfig,

    /// Fixed seed for reproducible select tie-breaks and jitter
    pub entropy_seed: Option<u64>,

    /// Scenario pacing
    pub tour: TourSettings,
}

impl ToolkitConfig {
    pub fn builder() -> ToolkitConfigBuilder {
        ToolkitConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::Config(
                "Worker threads must be greater than 0".to_string(),
            ));
        }

        self.tour.validate()
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_worker_threads(self.worker_threads)
            .with_fault_policy(self.fault_policy)
    }

    /// Build the scheduler described by this configuration.
    pub fn scheduler(&self) -> Result<Scheduler> {
        Ok(Scheduler::new(self.scheduler_config())?)
    }

    /// Seeded entropy when a seed is configured, the thread RNG otherwise.
    pub fn entropy(&self) -> Arc<dyn EntropySource> {
        match self.entropy_seed {
            Some(seed) => Arc::new(SeededEntropy::new(seed)),
            None => Arc::new(ThreadRngEntropy),
        }
    }
}

/// Builder for [`ToolkitConfig`].
#[derive(Debug, Default)]
pub struct ToolkitConfigBuilder {
    worker_threads: Option<usize>,
    fault_policy: FaultPolicy,
    logging: Option<LoggingConfig>,
    entropy_seed: Option<u64>,
    tour: Option<TourSettings>,
}

impl ToolkitConfigBuilder {
    /// Defaults to the machine's available parallelism.
    pub fn worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    pub fn fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn entropy_seed(mut self, seed: u64) -> Self {
        self.entropy_seed = Some(seed);
        self
    }

    pub fn tour(mut self, tour: TourSettings) -> Self {
        self.tour = Some(tour);
        self
    }

    pub fn build(self) -> Result<ToolkitConfig> {
        let config = ToolkitConfig {
            worker_threads: self
                .worker_threads
                .unwrap_or_else(|| SchedulerConfig::default().worker_threads),
            fault_policy: self.fault_policy,
            logging: self.logging.unwrap_or_default(),
            entropy_seed: self.entropy_seed,
            tour: self.tour.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}
