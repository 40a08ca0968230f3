use crate::task_error::TaskError;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

/// A target of a project, optionally with a named configuration.
/// Formatted as `project:target[:configuration]`.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Target {
    pub project: String,
    pub target: String,
    pub configuration: Option<String>,
}

impl Target {
    pub fn new(project: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            target: target.into(),
            configuration: None,
        }
    }

    pub fn with_configuration(mut self, configuration: Option<&str>) -> Self {
        self.configuration = configuration.map(|config| config.to_owned());
        self
    }

    pub fn parse(value: &str) -> miette::Result<Target> {
        let invalid = || TaskError::InvalidTarget {
            target: value.to_owned(),
        };

        let mut parts = value.split(':');

        let (Some(project), Some(target)) = (parts.next(), parts.next()) else {
            return Err(invalid().into());
        };

        let configuration = parts.next();

        if project.is_empty()
            || target.is_empty()
            || configuration.is_some_and(|config| config.is_empty())
            || parts.next().is_some()
        {
            return Err(invalid().into());
        }

        Ok(Target::new(project, target).with_configuration(configuration))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.target)?;

        if let Some(configuration) = &self.configuration {
            write!(f, ":{configuration}")?;
        }

        Ok(())
    }
}

impl FromStr for Target {
    type Err = miette::Report;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Target::parse(value)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;

        Target::parse(&value).map_err(de::Error::custom)
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
