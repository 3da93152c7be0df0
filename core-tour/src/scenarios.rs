//! The tutorial scenarios, in the order [`Tour::run_all`](crate::Tour::run_all)
//! runs them.

mod basics;
mod messaging;
mod race;

pub use basics::{
    parallel_tasks, spawn_and_sleep, wait_for_workers, ParallelTasksReport, SpawnAndSleepReport,
    WaitForWorkersReport,
};
pub use messaging::{
    buffered_producer, factorials, rendezvous, select_with_timer, task_results,
    BufferedProducerReport, FactorialsReport, RendezvousReport, SelectWinner,
    SelectWithTimerReport, TaskResultsReport,
};
pub use race::{
    race_unsynchronized, race_with_channel, race_with_mutex, RaceReport, RaceStrategy,
    SharedCounter,
};

/// Names used by the parallel task scenarios.
pub const TASK_NAMES: [&str; 3] = ["task1", "task2", "task3"];
