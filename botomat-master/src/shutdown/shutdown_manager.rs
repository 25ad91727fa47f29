use std::{fmt::Debug, future::Future, pin::Pin, sync::Arc, time::Duration};
use tokio::{
  sync::{oneshot, Mutex},
  time::timeout,
};
use tracing::{info, warn};

/// How long a single shutdown task may take before it is given up on.
pub const SHUTDOWN_TASK_DEADLINE: Duration = Duration::from_secs(5);

type ShutdownTask = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

pub struct ShutdownManager<A> {
  pub shutdown: Arc<Shutdown<A>>,
  receiver: oneshot::Receiver<A>,
}

impl<A> ShutdownManager<A> {
  pub fn new() -> Self {
    Self::with_task_deadline(SHUTDOWN_TASK_DEADLINE)
  }

  pub fn with_task_deadline(task_deadline: Duration) -> Self {
    let (sender, receiver) = oneshot::channel();
    let shutdown = Arc::new(Shutdown {
      sender: Mutex::new(Some(sender)),
      tasks: Mutex::new(Vec::new()),
      task_deadline,
    });

    Self { shutdown, receiver }
  }

  pub async fn await_shutdown(self) -> Result<A, oneshot::error::RecvError> {
    self.receiver.await
  }
}

impl<A> Default for ShutdownManager<A> {
  fn default() -> Self {
    Self::new()
  }
}

/// One-shot shutdown signal. Registered tasks run in reverse registration
/// order, only on the first `trigger`, each bounded by the task deadline.
pub struct Shutdown<A> {
  sender: Mutex<Option<oneshot::Sender<A>>>,
  tasks: Mutex<Vec<(String, ShutdownTask)>>,
  task_deadline: Duration,
}

impl<A: Debug> Shutdown<A> {
  pub async fn register_shutdown_task<F>(&self, task: F, description: impl Into<String>)
  where
    F: FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + 'static,
  {
    self.tasks.lock().await.push((description.into(), Box::new(task)));
  }

  pub async fn trigger(&self, reason: A) {
    let mut sender_guard = self.sender.lock().await;
    let Some(sender) = sender_guard.take() else {
      info!("Shutdown already triggered, ignoring {:?}", reason);
      return;
    };

    info!("Shutting down: {:?}", reason);
    let tasks = std::mem::take(&mut *self.tasks.lock().await);
    let total_tasks = tasks.len();

    for (index, (description, task)) in tasks.into_iter().rev().enumerate() {
      info!("[{}/{}] Stopping {}", index + 1, total_tasks, description);
      if timeout(self.task_deadline, task()).await.is_err() {
        warn!(
          "[{}/{}] {} did not stop within {:?}, moving on",
          index + 1,
          total_tasks,
          description,
          self.task_deadline
        );
      }
    }

    if sender.send(reason).is_err() {
      warn!("Nobody is waiting on the shutdown signal");
    }
  }

  pub async fn is_triggered(&self) -> bool {
    self.sender.lock().await.is_none()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex as StdMutex;

  use super::*;
  use crate::shutdown::shutdown_reason::ShutdownReason;

  #[tokio::test]
  async fn test_tasks_run_once_in_reverse_order() {
    let manager = ShutdownManager::<ShutdownReason>::new();
    let log = Arc::new(StdMutex::new(Vec::new()));

    for name in ["first", "second"] {
      let log = log.clone();
      manager
        .shutdown
        .register_shutdown_task(
          move || {
            Box::pin(async move {
              log.lock().unwrap().push(name);
            })
          },
          name,
        )
        .await;
    }

    let shutdown = manager.shutdown.clone();
    assert!(!shutdown.is_triggered().await);

    shutdown.trigger(ShutdownReason::Done).await;
    shutdown.trigger(ShutdownReason::Interrupted).await;

    assert!(shutdown.is_triggered().await);
    assert_eq!(*log.lock().unwrap(), vec!["second", "first"]);
    assert_eq!(manager.await_shutdown().await.unwrap(), ShutdownReason::Done);
  }

  #[tokio::test]
  async fn test_stuck_task_does_not_block_the_signal() {
    let manager = ShutdownManager::<ShutdownReason>::with_task_deadline(Duration::from_millis(20));
    let ran_after = Arc::new(StdMutex::new(false));

    {
      let ran_after = ran_after.clone();
      manager
        .shutdown
        .register_shutdown_task(
          move || {
            Box::pin(async move {
              *ran_after.lock().unwrap() = true;
            })
          },
          "quick",
        )
        .await;
    }
    manager
      .shutdown
      .register_shutdown_task(|| Box::pin(std::future::pending::<()>()), "stuck")
      .await;

    timeout(
      Duration::from_secs(1),
      manager.shutdown.trigger(ShutdownReason::Interrupted),
    )
    .await
    .expect("trigger should give up on the stuck task");

    assert!(*ran_after.lock().unwrap());
    assert_eq!(
      manager.await_shutdown().await.unwrap(),
      ShutdownReason::Interrupted
    );
  }
}
