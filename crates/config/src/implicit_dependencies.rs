use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ALL_PROJECTS: &str = "*";

/// A value within the workspace-level `implicitDependencies` map. Keys are
/// workspace files, and values describe which projects are affected when
/// that file (or a field within it) changes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImplicitDependencyEntry {
    /// Every project, written as `"*"`.
    All(String),
    Projects(Vec<String>),
    /// Mirrors the structure of a JSON file, keyed by field name.
    Nested(BTreeMap<String, ImplicitDependencyEntry>),
}

impl ImplicitDependencyEntry {
    /// Resolve the projects touched by a change at the provided JSON field path.
    /// An empty path, or a path that stops at a nested object, resolves every
    /// leaf beneath it.
    pub fn resolve_path<T: AsRef<str>>(&self, path: &[T], all_projects: &[String]) -> Vec<String> {
        match self {
            Self::All(_) => all_projects.to_vec(),
            Self::Projects(projects) => projects.clone(),
            Self::Nested(fields) => match path.split_first() {
                Some((key, rest)) => fields
                    .get(key.as_ref())
                    .map(|entry| entry.resolve_path(rest, all_projects))
                    .unwrap_or_default(),
                None => {
                    let mut projects = fields
                        .values()
                        .flat_map(|entry| entry.resolve_path::<&str>(&[], all_projects))
                        .collect::<Vec<_>>();
                    projects.sort();
                    projects.dedup();
                    projects
                }
            },
        }
    }

    pub fn resolve_all(&self, all_projects: &[String]) -> Vec<String> {
        self.resolve_path::<&str>(&[], all_projects)
    }

    /// Return every leaf (non-nested) entry, depth first.
    pub fn get_leaves(&self) -> Vec<&ImplicitDependencyEntry> {
        let mut leaves = vec![];
        let mut stack = vec![self];

        while let Some(entry) = stack.pop() {
            match entry {
                Self::Nested(fields) => stack.extend(fields.values().rev()),
                leaf => leaves.push(leaf),
            }
        }

        leaves
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All(value) if value == ALL_PROJECTS)
    }
}
