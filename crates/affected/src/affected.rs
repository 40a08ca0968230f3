use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq)]
pub enum AffectedBy {
    /// A project that depends on this node is affected.
    DownstreamProject(String),
    TouchedFile(String),
    /// A node this project depends on is affected.
    UpstreamProject(String),
}

// Dependents
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DownstreamScope {
    None,
    Direct,
    #[default]
    Deep,
}

// Dependencies
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum UpstreamScope {
    #[default]
    None,
    Direct,
    Deep,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedProjectState {
    pub by_dependencies: BTreeSet<String>,
    pub by_dependents: BTreeSet<String>,
    pub by_files: BTreeSet<String>,
}

impl AffectedProjectState {
    pub fn from(list: Vec<AffectedBy>) -> Self {
        let mut state = Self::default();

        for by in list {
            match by {
                AffectedBy::DownstreamProject(name) => {
                    state.by_dependents.insert(name);
                }
                AffectedBy::TouchedFile(file) => {
                    state.by_files.insert(file);
                }
                AffectedBy::UpstreamProject(name) => {
                    state.by_dependencies.insert(name);
                }
            };
        }

        state
    }

    /// True when a touched file maps directly to this node.
    pub fn is_seed(&self) -> bool {
        !self.by_files.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Affected {
    pub projects: BTreeMap<String, AffectedProjectState>,
}

impl Affected {
    pub fn get_project_names(&self) -> BTreeSet<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn is_project_affected(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
