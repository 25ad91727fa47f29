use std::{net::SocketAddr, path::PathBuf};

use botomat_worker::pool::default_ceiling;
use clap::Parser;
use tokio::time::Duration;

pub const DEFAULT_TASKS_PER_WORKER: usize = 5;
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:3222";

#[derive(Debug, Parser)]
#[command(name = "botomat", about = "Hands out chores to a fleet of robots and reports their progress")]
pub struct Cli {
    /// Path to the YAML input file (NumOfRobot, RobotData, UserTask)
    #[arg(long = "user-yaml-file", alias = "userYamlFile")]
    pub user_yaml_file: PathBuf,

    /// Number of tasks every robot gets
    #[arg(long, default_value_t = DEFAULT_TASKS_PER_WORKER)]
    pub tasks_per_robot: usize,

    /// Maximum number of robots working at once (defaults to available cores minus two)
    #[arg(long)]
    pub max_parallel: Option<usize>,

    /// How often the progress report is logged, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub report_interval_ms: u64,

    /// Address the status server listens on
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    pub listen: SocketAddr,

    /// Seed for task sampling, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Append-only log file
    #[arg(long, default_value = "/tmp/botomat.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MasterConfig {
    // Number of robots to dispatch.
    pub num_workers: usize,
    // Tasks sampled for each robot.
    pub tasks_per_worker: usize,
    // Upper bound on robots working at the same time.
    pub concurrency_ceiling: usize,
    // Interval between progress reports while robots are working.
    pub report_interval: Duration,
    // Capacity of the completion channel between robots and the aggregator.
    pub completion_buffer: usize,
    // Address to bind the status server to.
    pub address: SocketAddr,
    // Sampler seed. Random when absent.
    pub seed: Option<u64>,
}

impl MasterConfig {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            tasks_per_worker: DEFAULT_TASKS_PER_WORKER,
            concurrency_ceiling: default_ceiling(),
            report_interval: DEFAULT_REPORT_INTERVAL,
            completion_buffer: 1,
            address: SocketAddr::from(([0, 0, 0, 0], 3222)),
            seed: None,
        }
    }

    pub fn from_cli(cli: &Cli, num_workers: usize) -> Self {
        Self {
            tasks_per_worker: cli.tasks_per_robot,
            concurrency_ceiling: cli.max_parallel.unwrap_or_else(default_ceiling),
            report_interval: Duration::from_millis(cli.report_interval_ms),
            address: cli.listen,
            seed: cli.seed,
            ..Self::new(num_workers)
        }
    }
}
