//! Runs every tutorial scenario and prints the narrative to stdout.
//!
//! ```bash
//! cargo run --bin tour
//!
//! # Shorter time unit and a fixed seed
//! cargo run --bin tour -- --unit-ms 100 --seed 7
//! ```

use anyhow::{bail, Context};
use bridge_traits::{ConsoleSink, LogLevel};
use core_async::time::Duration;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_runtime::{ToolkitConfig, TourSettings};
use core_tour::Tour;
use std::env;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let mut tour_settings = TourSettings::default();
    let mut builder = ToolkitConfig::builder();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--unit-ms" => {
                let millis: u64 = args
                    .next()
                    .context("--unit-ms needs a value")?
                    .parse()
                    .context("--unit-ms expects milliseconds")?;
                tour_settings = tour_settings.with_time_unit(Duration::from_millis(millis));
            }
            "--seed" => {
                let seed: u64 = args
                    .next()
                    .context("--seed needs a value")?
                    .parse()
                    .context("--seed expects an integer")?;
                builder = builder.entropy_seed(seed);
            }
            "--workers" => {
                let workers: usize = args
                    .next()
                    .context("--workers needs a value")?
                    .parse()
                    .context("--workers expects an integer")?;
                builder = builder.worker_threads(workers);
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    let config = builder
        .tour(tour_settings)
        .logging(LoggingConfig::default().with_level(LogLevel::Warn).with_target(false))
        .build()
        .context("invalid configuration")?;

    init_logging(config.logging.clone()).context("failed to initialize logging")?;

    let scheduler = config.scheduler()?;
    let tour = Tour::from_config(&config, Arc::new(ConsoleSink::default()));
    let report = scheduler.block_on(tour.run_all())?;

    if !report.race_unsynchronized.is_balanced() {
        tracing::warn!(
            original = report.race_unsynchronized.original,
            final_value = report.race_unsynchronized.final_value,
            "unsynchronized counter drifted"
        );
    }
    if !report.race_with_mutex.is_balanced() || !report.race_with_channel.is_balanced() {
        bail!("a synchronized counter did not return to its original value");
    }

    Ok(())
}
