pub mod pool;
pub mod worker;

pub use pool::{PoolSlot, WorkerPool};
pub use worker::run_worker;
