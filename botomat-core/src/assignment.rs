use std::fmt::Display;

use crate::{catalog::Task, input::RobotType, WorkerId};

/// Label from the `RobotData` section of the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Robot {
  pub name: String,
  pub kind: RobotType,
}

impl Display for Robot {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} ({:?})", self.name, self.kind)
  }
}

/// The task list handed to one worker and how far it has got.
///
/// `completions` only ever grows, one `true` per finished task, and never gets
/// longer than `tasks`.
#[derive(Debug, Clone)]
pub struct Assignment {
  pub worker_id: WorkerId,
  pub robot: Option<Robot>,
  tasks: Vec<Task>,
  completions: Vec<bool>,
}

impl Assignment {
  pub fn new(worker_id: WorkerId, robot: Option<Robot>, tasks: Vec<Task>) -> Self {
    let completions = Vec::with_capacity(tasks.len());
    Self {
      worker_id,
      robot,
      tasks,
      completions,
    }
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn completions(&self) -> &[bool] {
    &self.completions
  }

  pub fn completed(&self) -> usize {
    self.completions.len()
  }

  pub fn is_finished(&self) -> bool {
    self.completions.len() == self.tasks.len()
  }

  /// The task that is next to finish, or the last task once everything is done.
  pub fn current_task(&self) -> Option<&Task> {
    self
      .tasks
      .get(self.completions.len())
      .or_else(|| self.tasks.last())
  }

  /// Marks the next pending task as done and returns it. Returns `None` when
  /// every task has already been completed.
  pub fn complete_next(&mut self) -> Option<&Task> {
    let index = self.completions.len();
    let task = self.tasks.get(index)?;
    self.completions.push(true);
    Some(task)
  }
}
