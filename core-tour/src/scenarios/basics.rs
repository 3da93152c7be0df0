use crate::error::Result;
use crate::scenarios::TASK_NAMES;
use crate::Tour;

use core_async::sync::{Mutex, WaitGroup};
use core_async::{task, time};

use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnAndSleepReport {
    /// Whether `f1` had finished by the time the sleep ended.
    pub f1_finished: bool,
}

/// Spawn `f1`, run `f2` inline, and sleep in the hope that `f1` is done.
pub async fn spawn_and_sleep(tour: &Tour) -> Result<SpawnAndSleepReport> {
    let narrator = tour.narrator("spawn_and_sleep");
    narrator.say("Starting main program execution").await?;

    let f1 = {
        let narrator = narrator.clone();
        task::spawn(async move {
            narrator.say("f1 starts").await?;
            narrator.say("f1 exits").await
        })
    };

    narrator.say("f2 starts").await?;
    narrator.say("f2 exits").await?;
    narrator.say("Finished calling f1 & f2").await?;

    time::sleep(tour.units(2)).await;

    let f1_finished = f1.is_finished();
    f1.await??;

    Ok(SpawnAndSleepReport { f1_finished })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitForWorkersReport {
    pub completed: usize,
}

/// Three workers joined with a wait group instead of a sleep.
pub async fn wait_for_workers(tour: &Tour) -> Result<WaitForWorkersReport> {
    const WORKERS: usize = 3;

    let narrator = tour.narrator("wait_for_workers");
    let group = WaitGroup::new();

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let narrator = narrator.clone();
            group.spawn(async move {
                narrator.say("f1 starts").await?;
                narrator.say("f1 exits").await
            })
        })
        .collect();

    group.wait().await;
    narrator.say("Finished executing all tasks").await?;

    let mut completed = 0;
    for handle in handles {
        handle.await??;
        completed += 1;
    }

    Ok(WaitForWorkersReport { completed })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelTasksReport {
    /// Simulated duration of each task, in time units.
    pub delays: Vec<(String, usize)>,
    /// Task names in the order they finished.
    pub completion_order: Vec<String>,
}

impl ParallelTasksReport {
    pub fn delay_of(&self, name: &str) -> Option<usize> {
        self.delays
            .iter()
            .find(|(task, _)| task == name)
            .map(|(_, delay)| *delay)
    }
}

/// Named tasks with jittered durations, run side by side.
pub async fn parallel_tasks(tour: &Tour) -> Result<ParallelTasksReport> {
    let narrator = tour.narrator("parallel_tasks");
    let group = WaitGroup::new();
    let finished = Arc::new(Mutex::new(Vec::with_capacity(TASK_NAMES.len())));

    let mut delays = Vec::with_capacity(TASK_NAMES.len());
    let mut handles = Vec::with_capacity(TASK_NAMES.len());

    for name in TASK_NAMES {
        let delay = tour.jitter();
        delays.push((name.to_string(), delay));

        let narrator = narrator.clone();
        let finished = finished.clone();
        let duration = tour.units(delay as u32);
        handles.push(group.spawn(async move {
            narrator.say(format!("starting task {}", name)).await?;
            time::sleep(duration).await;
            narrator.say(format!("done with task {}", name)).await?;
            finished.lock().await.push(name.to_string());
            Ok::<_, crate::TourError>(())
        }));
    }

    group.wait().await;
    for handle in handles {
        handle.await??;
    }

    let completion_order = finished.lock().await.clone();
    tracing::debug!(?delays, ?completion_order, "parallel tasks finished");

    Ok(ParallelTasksReport {
        delays,
        completion_order,
    })
}
