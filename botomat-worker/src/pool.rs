use std::{
  num::NonZeroUsize,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
};

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

// Cores kept back for the aggregator and the reporter.
const RESERVED_CORES: usize = 2;

/// Ceiling derived from the machine's parallelism, never below one.
pub fn default_ceiling() -> usize {
  std::thread::available_parallelism()
    .map(NonZeroUsize::get)
    .unwrap_or(1)
    .saturating_sub(RESERVED_CORES)
    .max(1)
}

/// Caps how many workers run at once.
///
/// Every live worker holds a [`PoolSlot`]; dropping the slot frees capacity and
/// wakes a waiting dispatcher. The live count is `0..=ceiling` by construction.
#[derive(Debug, Clone)]
pub struct WorkerPool {
  semaphore: Arc<Semaphore>,
  ceiling: usize,
  peak: Arc<AtomicUsize>,
}

#[derive(Debug)]
pub struct PoolSlot {
  _permit: OwnedSemaphorePermit,
}

impl WorkerPool {
  pub fn new(ceiling: usize) -> Self {
    Self {
      semaphore: Arc::new(Semaphore::new(ceiling)),
      ceiling,
      peak: Arc::new(AtomicUsize::new(0)),
    }
  }

  pub fn ceiling(&self) -> usize {
    self.ceiling
  }

  pub fn live(&self) -> usize {
    self.ceiling - self.semaphore.available_permits()
  }

  /// Highest live count observed so far.
  pub fn peak(&self) -> usize {
    self.peak.load(Ordering::SeqCst)
  }

  pub fn try_acquire(&self) -> Option<PoolSlot> {
    let permit = self.semaphore.clone().try_acquire_owned().ok()?;
    Some(self.occupy(permit))
  }

  /// Waits until a slot frees up.
  pub async fn acquire(&self) -> Result<PoolSlot, AcquireError> {
    let permit = self.semaphore.clone().acquire_owned().await?;
    Ok(self.occupy(permit))
  }

  fn occupy(&self, permit: OwnedSemaphorePermit) -> PoolSlot {
    self.peak.fetch_max(self.live(), Ordering::SeqCst);
    PoolSlot { _permit: permit }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[test]
  fn test_default_ceiling_is_positive() {
    assert!(default_ceiling() >= 1);
  }

  #[test]
  fn test_live_count_follows_slots() {
    let pool = WorkerPool::new(2);
    assert_eq!(pool.live(), 0);

    let a = pool.try_acquire().unwrap();
    let b = pool.try_acquire().unwrap();
    assert_eq!(pool.live(), 2);
    assert!(pool.try_acquire().is_none());

    drop(a);
    assert_eq!(pool.live(), 1);
    drop(b);
    assert_eq!(pool.live(), 0);
    assert_eq!(pool.peak(), 2);
  }

  #[tokio::test]
  async fn test_acquire_waits_for_free_slot() {
    let pool = WorkerPool::new(1);
    let held = pool.acquire().await.unwrap();

    let waiter = {
      let pool = pool.clone();
      tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    drop(held);
    tokio::time::timeout(Duration::from_secs(1), waiter)
      .await
      .expect("waiter should get the freed slot")
      .unwrap()
      .unwrap();
    assert_eq!(pool.peak(), 1);
  }
}
