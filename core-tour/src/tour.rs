use crate::error::Result;
use crate::narrator::Narrator;
use crate::scenarios::{
    self, BufferedProducerReport, FactorialsReport, ParallelTasksReport, RaceReport,
    RendezvousReport, SelectWithTimerReport, SpawnAndSleepReport, TaskResultsReport,
    WaitForWorkersReport,
};

use bridge_traits::{Clock, DiagnosticSink, EntropySource, SystemClock};
use core_async::time::Duration;
use core_runtime::{ToolkitConfig, TourSettings};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Everything a scenario needs: where to narrate, how fast to go, and where
/// to draw jitter from.
#[derive(Clone)]
pub struct Tour {
    narrator: Narrator,
    settings: TourSettings,
    entropy: Arc<dyn EntropySource>,
    clock: Arc<dyn Clock>,
}

impl Tour {
    pub fn new(
        sink: Arc<dyn DiagnosticSink>,
        settings: TourSettings,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        Self {
            narrator: Narrator::new(sink),
            settings,
            entropy,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used to time scenarios.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn from_config(config: &ToolkitConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::new(sink, config.tour, config.entropy())
    }

    pub fn narrator(&self, scenario: &'static str) -> Narrator {
        self.narrator.scenario(scenario)
    }

    pub fn settings(&self) -> &TourSettings {
        &self.settings
    }

    pub fn entropy(&self) -> &Arc<dyn EntropySource> {
        &self.entropy
    }

    pub(crate) fn units(&self, units: u32) -> Duration {
        self.settings.units(units)
    }

    /// A simulated task duration in `[0, jitter_bound)` time units.
    pub(crate) fn jitter(&self) -> usize {
        self.entropy.next_int(self.settings.jitter_bound)
    }

    /// Run every scenario in order, separated by a blank line.
    pub async fn run_all(&self) -> Result<TourReport> {
        tracing::info!(settings = ?self.settings, "tour starting");
        let mut elapsed = Vec::with_capacity(11);

        let spawn_and_sleep = self
            .timed("spawn_and_sleep", &mut elapsed, scenarios::spawn_and_sleep(self))
            .await?;
        let wait_for_workers = self
            .timed("wait_for_workers", &mut elapsed, scenarios::wait_for_workers(self))
            .await?;
        let parallel_tasks = self
            .timed("parallel_tasks", &mut elapsed, scenarios::parallel_tasks(self))
            .await?;
        let race_unsynchronized = self
            .timed("race_unsynchronized", &mut elapsed, scenarios::race_unsynchronized(self))
            .await?;
        let race_with_mutex = self
            .timed("race_with_mutex", &mut elapsed, scenarios::race_with_mutex(self))
            .await?;
        let race_with_channel = self
            .timed("race_with_channel", &mut elapsed, scenarios::race_with_channel(self))
            .await?;
        let factorials = self
            .timed("factorials", &mut elapsed, scenarios::factorials(self))
            .await?;
        let task_results = self
            .timed("task_results", &mut elapsed, scenarios::task_results(self))
            .await?;
        let rendezvous = self
            .timed("rendezvous", &mut elapsed, scenarios::rendezvous(self))
            .await?;
        let buffered_producer = self
            .timed("buffered_producer", &mut elapsed, scenarios::buffered_producer(self))
            .await?;
        let select_with_timer = self
            .timed("select_with_timer", &mut elapsed, scenarios::select_with_timer(self))
            .await?;

        self.narrator.flush().await?;
        tracing::info!("tour finished");

        Ok(TourReport {
            spawn_and_sleep,
            wait_for_workers,
            parallel_tasks,
            race_unsynchronized,
            race_with_mutex,
            race_with_channel,
            factorials,
            task_results,
            rendezvous,
            buffered_producer,
            select_with_timer,
            elapsed,
        })
    }

    async fn timed<T>(
        &self,
        scenario: &'static str,
        elapsed: &mut Vec<(&'static str, Duration)>,
        run: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let started = self.clock.now();
        let report = run.await?;
        let took = self.clock.elapsed_since(started);

        tracing::debug!(scenario, ?took, "scenario finished");
        elapsed.push((scenario, took));

        self.pause().await?;
        Ok(report)
    }

    async fn pause(&self) -> Result<()> {
        self.narrator.say("").await
    }
}

impl fmt::Debug for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tour")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`Tour::run_all`].
#[derive(Debug, Clone)]
pub struct TourReport {
    pub spawn_and_sleep: SpawnAndSleepReport,
    pub wait_for_workers: WaitForWorkersReport,
    pub parallel_tasks: ParallelTasksReport,
    pub race_unsynchronized: RaceReport,
    pub race_with_mutex: RaceReport,
    pub race_with_channel: RaceReport,
    pub factorials: FactorialsReport,
    pub task_results: TaskResultsReport,
    pub rendezvous: RendezvousReport,
    pub buffered_producer: BufferedProducerReport,
    pub select_with_timer: SelectWithTimerReport,
    /// Wall time spent in each scenario, in run order.
    pub elapsed: Vec<(&'static str, Duration)>,
}
