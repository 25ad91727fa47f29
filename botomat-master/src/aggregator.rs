use std::{collections::HashSet, sync::Arc, time::Duration};

use botomat_core::{Assignment, WorkerId, WorkerStore};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    reporter::start_reporter_fiber,
    shutdown::{shutdown_manager::Shutdown, shutdown_reason::ShutdownReason},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOutcome {
    // Robots that reported all of their tasks.
    pub finished: usize,
    // Completion events received.
    pub events: usize,
}

/// Single consumer of every robot's completion events.
pub struct Aggregator {
    store: WorkerStore,
    completions: mpsc::Receiver<Assignment>,
    num_workers: usize,
    tasks_per_worker: usize,
    report_interval: Duration,
}

impl Aggregator {
    pub fn new(
        store: WorkerStore,
        completions: mpsc::Receiver<Assignment>,
        num_workers: usize,
        tasks_per_worker: usize,
        report_interval: Duration,
    ) -> Self {
        Self {
            store,
            completions,
            num_workers,
            tasks_per_worker,
            report_interval,
        }
    }

    /// Stores every event until all robots are finished, reporting progress
    /// periodically meanwhile. Triggers `shutdown` with `Done` on the way out,
    /// which also stops the periodic reporter.
    pub async fn run(mut self, shutdown: Arc<Shutdown<ShutdownReason>>) -> AggregateOutcome {
        start_reporter_fiber(
            self.store.clone(),
            self.tasks_per_worker,
            self.report_interval,
            shutdown.clone(),
        )
        .await;

        let mut finished: HashSet<WorkerId> = HashSet::new();
        let mut events = 0;

        while finished.len() < self.num_workers {
            let Some(assignment) = self.completions.recv().await else {
                warn!(
                    "Completion channel closed with {} of {} robots finished",
                    finished.len(),
                    self.num_workers
                );
                break;
            };
            events += 1;

            let worker_id = assignment.worker_id;
            // Only the number of completions decides whether a robot is done.
            let done = assignment.completed() == self.tasks_per_worker;
            debug!(
                "Robot {:?} completed {} tasks",
                worker_id,
                assignment.completed()
            );

            self.store.record(assignment).await;

            if done && finished.insert(worker_id) {
                info!(
                    "Robot {:?} finished ({}/{})",
                    worker_id,
                    finished.len(),
                    self.num_workers
                );
            }
        }

        shutdown.trigger(ShutdownReason::Done).await;

        AggregateOutcome {
            finished: finished.len(),
            events,
        }
    }
}
