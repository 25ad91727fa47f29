use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse yaml: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("invalid number of robots ({count}) or it does not match the {listed} robots listed")]
  RobotCount { count: i64, listed: usize },

  #[error("robot entry {0:?} is not of the form <name>:<type>")]
  MalformedRobot(String),

  #[error("unknown robot type {0:?}")]
  UnknownRobotType(String),

  #[error("user task error: {0}")]
  Task(#[from] CatalogError),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
  #[error("failed to decode built-in tasks: {0}")]
  Builtin(#[from] serde_json::Error),

  #[error("user task {0:?} is not of the form <description>:<duration>")]
  MalformedTask(String),

  #[error("user task {entry:?} has an invalid duration")]
  InvalidDuration {
    entry: String,
    #[source]
    source: std::num::ParseIntError,
  },

  #[error("task catalog is empty")]
  Empty,
}
