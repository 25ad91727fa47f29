use std::{path::Path, str::FromStr};

use serde::Deserialize;

use crate::{assignment::Robot, catalog::Catalog, error::ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotType {
  Unipedal,
  Bipedal,
  Quadrupedal,
  Arachnid,
  Radial,
  Aeronautical,
}

impl FromStr for RobotType {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "Unipedal" => Ok(RobotType::Unipedal),
      "Bipedal" => Ok(RobotType::Bipedal),
      "Quadrupedal" => Ok(RobotType::Quadrupedal),
      "Arachnid" => Ok(RobotType::Arachnid),
      "Radial" => Ok(RobotType::Radial),
      "Aeronautical" => Ok(RobotType::Aeronautical),
      other => Err(ConfigError::UnknownRobotType(other.to_string())),
    }
  }
}

/// Raw contents of the user input file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputParams {
  #[serde(rename = "NumOfRobot", default)]
  pub number_of_robots: i64,
  #[serde(rename = "RobotData", default)]
  pub robot_data: Vec<String>,
  #[serde(rename = "UserTask", default)]
  pub user_tasks: Vec<String>,
}

/// Everything the dispatcher needs, checked.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
  pub robots: Vec<Robot>,
  pub catalog: Catalog,
}

impl ValidatedInput {
  pub fn num_robots(&self) -> usize {
    self.robots.len()
  }
}

impl InputParams {
  pub async fn read_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
      .await
      .map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
      })?;
    Self::from_yaml_str(&contents)
  }

  pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
    Ok(serde_yaml::from_str(contents)?)
  }

  pub fn validate(&self) -> Result<ValidatedInput, ConfigError> {
    if self.number_of_robots <= 0 || self.number_of_robots as usize != self.robot_data.len() {
      return Err(ConfigError::RobotCount {
        count: self.number_of_robots,
        listed: self.robot_data.len(),
      });
    }

    let robots = self
      .robot_data
      .iter()
      .map(|entry| parse_robot(entry))
      .collect::<Result<Vec<_>, _>>()?;

    let catalog = Catalog::with_user_tasks(&self.user_tasks)?;

    Ok(ValidatedInput { robots, catalog })
  }
}

fn parse_robot(entry: &str) -> Result<Robot, ConfigError> {
  let (name, kind) = entry
    .split_once(':')
    .ok_or_else(|| ConfigError::MalformedRobot(entry.to_string()))?;

  Ok(Robot {
    name: name.trim().to_string(),
    kind: kind.parse()?,
  })
}
