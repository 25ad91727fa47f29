use botomat_core::{Assignment, Catalog, Robot, TaskSampler, WorkerId, WorkerStore};
use botomat_worker::{run_worker, WorkerPool};
use tokio::{
    sync::{mpsc, AcquireError},
    task::JoinSet,
};
use tracing::info;

use crate::config::MasterConfig;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("at least one robot is required")]
    NoWorkers,

    #[error("task catalog is empty")]
    EmptyCatalog,

    #[error("robots must be given at least one task")]
    NoTasksPerWorker,

    #[error("concurrency ceiling must be at least one")]
    ZeroCeiling,

    #[error("worker pool closed: {0}")]
    PoolClosed(#[from] AcquireError),
}

/// Creates robots one by one, never letting more than the pool's ceiling
/// work at the same time.
pub struct Dispatcher {
    num_workers: usize,
    tasks_per_worker: usize,
    catalog: Catalog,
    robots: Vec<Robot>,
    sampler: TaskSampler,
    store: WorkerStore,
    pool: WorkerPool,
    completions: mpsc::Sender<Assignment>,
}

impl Dispatcher {
    pub fn new(
        config: &MasterConfig,
        catalog: Catalog,
        robots: Vec<Robot>,
        store: WorkerStore,
        pool: WorkerPool,
        completions: mpsc::Sender<Assignment>,
    ) -> Result<Self, DispatchError> {
        if config.num_workers == 0 {
            return Err(DispatchError::NoWorkers);
        }
        if catalog.is_empty() {
            return Err(DispatchError::EmptyCatalog);
        }
        if config.tasks_per_worker == 0 {
            return Err(DispatchError::NoTasksPerWorker);
        }
        if pool.ceiling() == 0 {
            return Err(DispatchError::ZeroCeiling);
        }

        Ok(Self {
            num_workers: config.num_workers,
            tasks_per_worker: config.tasks_per_worker,
            catalog,
            robots,
            sampler: TaskSampler::new(config.seed),
            store,
            pool,
            completions,
        })
    }

    /// Launches all robots and returns as soon as the last one has been
    /// created. Waiting for them to finish is left to the caller.
    pub async fn dispatch(mut self) -> Result<JoinSet<Assignment>, DispatchError> {
        let mut workers = JoinSet::new();

        for index in 1..=self.num_workers {
            let slot = match self.pool.try_acquire() {
                Some(slot) => slot,
                None => {
                    info!(
                        "{} robots working, waiting for one to finish before creating the remaining {}",
                        self.pool.live(),
                        self.num_workers - index + 1
                    );
                    self.pool.acquire().await?
                }
            };

            let worker_id = WorkerId(index as u32);
            let robot = self.robots.get(index - 1).cloned();
            let tasks = self.sampler.sample(&self.catalog, self.tasks_per_worker);
            let assignment = Assignment::new(worker_id, robot, tasks);

            match &assignment.robot {
                Some(robot) => info!("Dispatching {:?} to robot {}", worker_id, robot),
                None => info!("Dispatching {:?}", worker_id),
            }

            self.store.register(assignment.clone()).await;
            workers.spawn(run_worker(assignment, self.completions.clone(), slot));
        }

        info!("All {} robots dispatched", self.num_workers);

        Ok(workers)
    }
}
