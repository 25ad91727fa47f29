use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{assignment::Assignment, report::StatusSnapshot, WorkerId};

/// Shared record of every dispatched worker's assignment and progress.
///
/// All reads and writes of an entry happen under one lock, so a reader never
/// sees a partially updated assignment.
#[derive(Debug, Clone, Default)]
pub struct WorkerStore {
  records: Arc<Mutex<BTreeMap<WorkerId, Assignment>>>,
}

impl WorkerStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn register(&self, assignment: Assignment) {
    self
      .records
      .lock()
      .await
      .insert(assignment.worker_id, assignment);
  }

  /// Replaces the stored entry with the worker's latest view (last write wins).
  pub async fn record(&self, assignment: Assignment) {
    let mut records = self.records.lock().await;
    if let Some(previous) = records.get(&assignment.worker_id) {
      if previous.completed() > assignment.completed() {
        warn!(
          "Progress for {:?} went backwards ({} -> {})",
          assignment.worker_id,
          previous.completed(),
          assignment.completed()
        );
      }
    }
    records.insert(assignment.worker_id, assignment);
  }

  pub async fn get(&self, worker_id: WorkerId) -> Option<Assignment> {
    self.records.lock().await.get(&worker_id).cloned()
  }

  pub async fn len(&self) -> usize {
    self.records.lock().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.records.lock().await.is_empty()
  }

  pub async fn assignments(&self) -> Vec<Assignment> {
    self.records.lock().await.values().cloned().collect()
  }

  /// Renders the status of every worker while holding the lock for the whole pass.
  pub async fn snapshot(&self, tasks_per_worker: usize) -> StatusSnapshot {
    let records = self.records.lock().await;
    StatusSnapshot::render(records.values(), tasks_per_worker, Utc::now())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Task;

  fn assignment(id: u32) -> Assignment {
    Assignment::new(
      WorkerId(id),
      None,
      vec![Task::new("sweep", 100), Task::new("wash", 50)],
    )
  }

  #[tokio::test]
  async fn test_record_replaces_entry() {
    let store = WorkerStore::new();
    let mut a = assignment(1);
    store.register(a.clone()).await;

    a.complete_next();
    store.record(a).await;

    let stored = store.get(WorkerId(1)).await.unwrap();
    assert_eq!(stored.completed(), 1);
    assert_eq!(store.len().await, 1);
  }

  #[tokio::test]
  async fn test_snapshot_is_ordered_by_worker_index() {
    let store = WorkerStore::new();
    for id in [10, 2, 1] {
      store.register(assignment(id)).await;
    }

    let names: Vec<String> = store
      .snapshot(2)
      .await
      .robots
      .into_iter()
      .map(|r| r.name)
      .collect();
    assert_eq!(names, vec!["Task-1", "Task-2", "Task-10"]);
  }

  #[tokio::test]
  async fn test_repeated_snapshots_are_identical() {
    let store = WorkerStore::new();
    let mut a = assignment(1);
    a.complete_next();
    store.register(a).await;
    store.register(assignment(2)).await;

    let first = store.snapshot(2).await;
    let second = store.snapshot(2).await;
    assert_eq!(first.robots, second.robots);
  }

  #[tokio::test]
  async fn test_concurrent_writers_never_tear_entries() {
    let store = WorkerStore::new();
    let mut handles = Vec::new();

    for id in 1..=8 {
      let store = store.clone();
      handles.push(tokio::spawn(async move {
        let mut a = assignment(id);
        store.register(a.clone()).await;
        while a.complete_next().is_some() {
          store.record(a.clone()).await;
          tokio::task::yield_now().await;
        }
      }));
    }

    for _ in 0..50 {
      for a in store.assignments().await {
        assert!(a.completed() <= a.tasks().len());
        assert!(a.completions().iter().all(|done| *done));
      }
      tokio::task::yield_now().await;
    }

    for handle in handles {
      handle.await.unwrap();
    }

    assert!(store.snapshot(2).await.is_all_completed());
    assert!(!store.is_empty().await);
  }
}
