use std::time::Duration;

use botomat_core::{Assignment, Task};
use tokio::{sync::mpsc, time::sleep};
use tracing::{debug, info, warn};

use crate::pool::PoolSlot;

/// Runs every task of `assignment` in order, simulating each one by sleeping
/// for its duration.
///
/// A copy of the assignment is published on `completions` after every task.
/// The pool slot is released once the last task is done. There is no
/// cancellation: a closed channel only stops the reporting, not the work.
pub async fn run_worker(
  mut assignment: Assignment,
  completions: mpsc::Sender<Assignment>,
  slot: PoolSlot,
) -> Assignment {
  let worker_id = assignment.worker_id;
  let mut reporting = true;

  info!(
    "Robot {:?} starting {} tasks",
    worker_id,
    assignment.tasks().len()
  );

  let durations: Vec<Duration> = assignment.tasks().iter().map(Task::duration).collect();

  for duration in durations {
    sleep(duration).await;

    if let Some(task) = assignment.complete_next() {
      debug!("Robot {:?} done with task: {}", worker_id, task.description);
    }

    if reporting && completions.send(assignment.clone()).await.is_err() {
      warn!(
        "Completion channel closed, robot {:?} will keep working without reporting",
        worker_id
      );
      reporting = false;
    }
  }

  drop(slot);
  info!("Robot {:?} is done", worker_id);

  assignment
}

#[cfg(test)]
mod tests {
  use botomat_core::WorkerId;

  use super::*;
  use crate::pool::WorkerPool;

  fn assignment() -> Assignment {
    Assignment::new(
      WorkerId(1),
      None,
      vec![Task::new("sweep", 10), Task::new("wash", 5)],
    )
  }

  #[tokio::test]
  async fn test_worker_reports_each_task_in_order() {
    let pool = WorkerPool::new(1);
    let slot = pool.try_acquire().unwrap();
    let (tx, mut rx) = mpsc::channel(1);

    let handle = tokio::spawn(run_worker(assignment(), tx, slot));

    let first = rx.recv().await.unwrap();
    assert_eq!(first.completed(), 1);
    assert_eq!(first.current_task().unwrap().description, "wash");

    let second = rx.recv().await.unwrap();
    assert_eq!(second.completed(), 2);
    assert!(second.is_finished());

    let finished = tokio::time::timeout(Duration::from_secs(1), handle)
      .await
      .unwrap()
      .unwrap();
    assert!(finished.is_finished());
    assert!(rx.recv().await.is_none());
    assert_eq!(pool.live(), 0);
  }

  #[tokio::test]
  async fn test_worker_finishes_when_nobody_listens() {
    let pool = WorkerPool::new(1);
    let slot = pool.try_acquire().unwrap();
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let finished = tokio::time::timeout(Duration::from_secs(1), run_worker(assignment(), tx, slot))
      .await
      .unwrap();

    assert_eq!(finished.completions(), &[true, true]);
    assert_eq!(pool.live(), 0);
  }

  #[tokio::test]
  async fn test_worker_holds_slot_while_running() {
    let pool = WorkerPool::new(1);
    let slot = pool.try_acquire().unwrap();
    let (tx, mut rx) = mpsc::channel(1);

    let handle = tokio::spawn(run_worker(assignment(), tx, slot));
    rx.recv().await.unwrap();
    assert_eq!(pool.live(), 1);

    rx.recv().await.unwrap();
    handle.await.unwrap();
    assert_eq!(pool.live(), 0);
  }
}
