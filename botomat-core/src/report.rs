use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::assignment::Assignment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotStatus {
  pub name: String,
  pub status: String,
  #[serde(skip)]
  pub done: bool,
}

/// Point in time view of every robot's progress. Built fresh on each report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
  pub info: String,
  pub robots: Vec<RobotStatus>,
}

impl StatusSnapshot {
  pub fn render<'a, I>(assignments: I, tasks_per_worker: usize, generated_at: DateTime<Utc>) -> Self
  where
    I: IntoIterator<Item = &'a Assignment>,
  {
    let robots = assignments
      .into_iter()
      .map(|assignment| RobotStatus {
        name: assignment.worker_id.to_string(),
        status: status_line(assignment, tasks_per_worker),
        done: assignment.completed() == tasks_per_worker,
      })
      .collect();

    Self {
      info: format!("Report Robot Status @ {}", generated_at.to_rfc3339()),
      robots,
    }
  }

  pub fn is_all_completed(&self) -> bool {
    self.robots.iter().all(|robot| robot.done)
  }
}

pub fn status_line(assignment: &Assignment, tasks_per_worker: usize) -> String {
  let completed = assignment.completed();
  if completed == tasks_per_worker {
    return format!("Completed {} Tasks", completed);
  }

  let description = assignment
    .current_task()
    .map_or("", |task| task.description.as_str());

  format!("Working on Task: {}: Completed {} Tasks", description, completed)
}
