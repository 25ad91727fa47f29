use std::fmt::{Debug, Display};

pub mod assignment;
pub mod catalog;
pub mod error;
pub mod input;
pub mod report;
pub mod sampler;
pub mod store;

pub use assignment::{Assignment, Robot};
pub use catalog::{Catalog, Task};
pub use error::{CatalogError, ConfigError};
pub use report::{RobotStatus, StatusSnapshot};
pub use sampler::TaskSampler;
pub use store::WorkerStore;

/// Identity of a dispatched worker. Workers are numbered from 1 in dispatch order.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl Display for WorkerId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Task-{}", self.0)
  }
}

impl Debug for WorkerId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Task-{}", self.0)
  }
}
