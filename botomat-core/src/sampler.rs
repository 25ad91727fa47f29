use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::catalog::{Catalog, Task};

/// Draws task lists for robots, uniformly and with replacement.
pub struct TaskSampler {
  rng: StdRng,
}

impl TaskSampler {
  /// Seeded samplers produce the same lists run after run.
  pub fn new(seed: Option<u64>) -> Self {
    let rng = match seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    Self { rng }
  }

  pub fn sample(&mut self, catalog: &Catalog, count: usize) -> Vec<Task> {
    let tasks = catalog.tasks();
    (0..count)
      .map(|_| tasks[self.rng.gen_range(0..tasks.len())].clone())
      .collect()
  }
}
