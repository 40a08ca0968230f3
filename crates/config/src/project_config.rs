use crate::config_struct;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Application,
    #[default]
    Library,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ProjectType::Application => "application",
                ProjectType::Library => "library",
            }
        )
    }
}

config_struct!(
    /// A runnable target of a project, for example `build` or `test`.
    pub struct TargetConfig {
        pub executor: String,

        /// Shell command to run. Takes precedence over an `options.command`.
        pub command: Option<String>,

        pub options: BTreeMap<String, Value>,

        /// Named option sets that are merged over `options` when selected.
        pub configurations: BTreeMap<String, BTreeMap<String, Value>>,

        /// Workspace relative files or directories produced by the target.
        pub outputs: Vec<String>,

        /// Maximum seconds to run before the process is killed.
        pub timeout: Option<u64>,
    }
);

impl TargetConfig {
    pub fn has_configuration(&self, name: &str) -> bool {
        self.configurations.contains_key(name)
    }

    /// Merge options in order of precedence: base options, the selected
    /// configuration, then overrides.
    pub fn resolve_options(
        &self,
        configuration: Option<&str>,
        overrides: &BTreeMap<String, Value>,
    ) -> BTreeMap<String, Value> {
        let mut options = self.options.clone();

        if let Some(config) = configuration.and_then(|name| self.configurations.get(name)) {
            options.extend(config.clone());
        }

        options.extend(overrides.clone());
        options
    }

    /// Return the command to execute, preferring an explicit `command` field.
    pub fn resolve_command(&self, options: &BTreeMap<String, Value>) -> Option<String> {
        self.command.clone().or_else(|| {
            options
                .get("command")
                .and_then(|value| value.as_str())
                .map(|value| value.to_owned())
        })
    }
}

config_struct!(
    pub struct ProjectConfig {
        /// Workspace relative directory of the project.
        pub root: String,

        pub project_type: ProjectType,

        pub tags: Vec<String>,

        /// Projects this project depends on without importing them.
        pub implicit_dependencies: Vec<String>,

        pub targets: BTreeMap<String, TargetConfig>,
    }
);

impl ProjectConfig {
    pub fn new(root: impl Into<String>, project_type: ProjectType) -> Self {
        ProjectConfig {
            root: root.into(),
            project_type,
            ..Default::default()
        }
    }
}
