use std::sync::Arc;

use botomat_core::{input::ValidatedInput, StatusSnapshot, WorkerStore};
use botomat_worker::WorkerPool;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{
    aggregator::{AggregateOutcome, Aggregator},
    config::MasterConfig,
    dispatcher::{DispatchError, Dispatcher},
    reporter::log_snapshot,
    shutdown::{shutdown_manager::Shutdown, shutdown_reason::ShutdownReason},
};

#[derive(Debug)]
pub struct RunSummary {
    pub outcome: AggregateOutcome,
    pub final_report: StatusSnapshot,
    // Most robots seen working at the same time.
    pub peak_parallel: usize,
}

/// Wires the dispatcher, the robots and the aggregator around one shared store.
pub struct Master {
    config: MasterConfig,
    store: WorkerStore,
    pool: WorkerPool,
    shutdown: Arc<Shutdown<ShutdownReason>>,
}

impl Master {
    pub fn new(config: MasterConfig, shutdown: Arc<Shutdown<ShutdownReason>>) -> Self {
        let pool = WorkerPool::new(config.concurrency_ceiling);
        Self {
            config,
            store: WorkerStore::new(),
            pool,
            shutdown,
        }
    }

    pub fn store(&self) -> &WorkerStore {
        &self.store
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Runs every robot to completion and returns the final report.
    pub async fn run(&self, input: ValidatedInput) -> Result<RunSummary, DispatchError> {
        info!(
            "Starting {} robots, {} tasks each, at most {} at once",
            self.config.num_workers, self.config.tasks_per_worker, self.config.concurrency_ceiling
        );

        let (completions_tx, completions_rx) = mpsc::channel(self.config.completion_buffer.max(1));

        let dispatcher = Dispatcher::new(
            &self.config,
            input.catalog,
            input.robots,
            self.store.clone(),
            self.pool.clone(),
            completions_tx,
        )?;

        let aggregator = Aggregator::new(
            self.store.clone(),
            completions_rx,
            self.config.num_workers,
            self.config.tasks_per_worker,
            self.config.report_interval,
        );
        let aggregator_handle = tokio::spawn(aggregator.run(self.shutdown.clone()));

        let mut workers = dispatcher.dispatch().await?;

        while let Some(result) = workers.join_next().await {
            if let Err(err) = result {
                error!("Robot task failed: {}", err);
            }
        }

        let outcome = match aggregator_handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("Aggregator failed: {}", err);
                self.shutdown.trigger(ShutdownReason::Done).await;
                AggregateOutcome {
                    finished: 0,
                    events: 0,
                }
            }
        };

        let final_report = self.store.snapshot(self.config.tasks_per_worker).await;
        log_snapshot("Final Report", &final_report);

        Ok(RunSummary {
            outcome,
            final_report,
            peak_parallel: self.pool.peak(),
        })
    }
}
