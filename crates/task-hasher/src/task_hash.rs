use orbit_hash::hash_content;
use orbit_task::Target;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Serialize)]
#[serde(untagged)]
pub enum DependencyHash<'task> {
    // Workspace project files mapped to their hash
    Files(BTreeMap<&'task str, &'task str>),

    // External package version
    Package(&'task str),
}

hash_content!(
    pub struct TaskHash<'task> {
        // Resolved shell command
        pub command: Option<String>,

        // Static and implicit dependencies, transitively
        pub deps: BTreeMap<&'task str, DependencyHash<'task>>,

        pub executor: &'task str,

        // Project files mapped to their hash
        pub files: BTreeMap<&'task str, &'task str>,

        // Workspace files from `implicitDependencies` that apply to the project
        pub global_files: BTreeMap<&'task str, &'task str>,

        // Options after merging the configuration and overrides
        pub options: BTreeMap<String, Value>,

        pub outputs: Vec<&'task str>,

        pub target: &'task Target,

        // Bump this to invalidate all caches
        pub version: &'static str,
    }
);
