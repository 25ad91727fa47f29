use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

const BUILTIN_TASKS: &str = r#"[
  { "Description": "do the dishes", "ETA": 1000 },
  { "Description": "sweep the house", "ETA": 3000 },
  { "Description": "do the laundry", "ETA": 10000 },
  { "Description": "take out the recycling", "ETA": 4000 },
  { "Description": "make a sammich", "ETA": 7000 },
  { "Description": "mow the lawn", "ETA": 20000 },
  { "Description": "rake the leaves", "ETA": 18000 },
  { "Description": "give the dog a bath", "ETA": 14500 },
  { "Description": "bake some cookies", "ETA": 8000 },
  { "Description": "wash the car", "ETA": 20000 }
]"#;

/// A unit of simulated work. `duration_ms` is how long a robot spends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  #[serde(rename = "Description")]
  pub description: String,
  #[serde(rename = "ETA")]
  pub duration_ms: u64,
}

impl Task {
  pub fn new(description: impl Into<String>, duration_ms: u64) -> Self {
    Self {
      description: description.into(),
      duration_ms,
    }
  }

  pub fn duration(&self) -> Duration {
    Duration::from_millis(self.duration_ms)
  }

  /// Parses a `<description>:<duration>` entry. The duration is the text after the last `:`.
  pub fn parse(entry: &str) -> Result<Self, CatalogError> {
    let (description, duration) = entry
      .rsplit_once(':')
      .ok_or_else(|| CatalogError::MalformedTask(entry.to_string()))?;

    let description = description.trim();
    if description.is_empty() {
      return Err(CatalogError::MalformedTask(entry.to_string()));
    }

    let duration_ms = duration
      .trim()
      .parse::<u64>()
      .map_err(|source| CatalogError::InvalidDuration {
        entry: entry.to_string(),
        source,
      })?;

    Ok(Self::new(description, duration_ms))
  }
}

pub trait TaskSource {
  fn tasks(&self) -> Result<Vec<Task>, CatalogError>;
}

/// The default chores every catalog starts with.
pub struct BuiltinTasks;

impl TaskSource for BuiltinTasks {
  fn tasks(&self) -> Result<Vec<Task>, CatalogError> {
    Ok(serde_json::from_str(BUILTIN_TASKS)?)
  }
}

/// Tasks supplied in the `UserTask` section of the input file.
pub struct UserTasks<'a> {
  entries: &'a [String],
}

impl UserTasks<'_> {
  pub fn new(entries: &[String]) -> UserTasks {
    UserTasks { entries }
  }
}

impl TaskSource for UserTasks<'_> {
  fn tasks(&self) -> Result<Vec<Task>, CatalogError> {
    self.entries.iter().map(|entry| Task::parse(entry)).collect()
  }
}

/// Immutable, ordered list of tasks robots are sampled from.
#[derive(Debug, Clone)]
pub struct Catalog {
  tasks: Arc<[Task]>,
}

impl Catalog {
  pub fn new(tasks: Vec<Task>) -> Result<Self, CatalogError> {
    if tasks.is_empty() {
      return Err(CatalogError::Empty);
    }
    Ok(Self {
      tasks: Arc::from(tasks),
    })
  }

  /// Concatenates the sources in order.
  pub fn from_sources(sources: &[&dyn TaskSource]) -> Result<Self, CatalogError> {
    let mut tasks = Vec::new();
    for source in sources {
      tasks.extend(source.tasks()?);
    }
    Self::new(tasks)
  }

  /// Built-in tasks followed by the user supplied entries.
  pub fn with_user_tasks(entries: &[String]) -> Result<Self, CatalogError> {
    Self::from_sources(&[&BuiltinTasks, &UserTasks::new(entries)])
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&Task> {
    self.tasks.get(index)
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }
}
