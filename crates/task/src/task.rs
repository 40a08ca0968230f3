use crate::target::Target;
use crate::task_error::TaskError;
use orbit_config::TargetConfig;
use orbit_hash::ContentHasher;
use orbit_project_graph::{ProjectGraph, ProjectGraphNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Number of hash characters appended to the id of a task with overrides.
const OVERRIDES_HASH_LENGTH: usize = 8;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub target: Target,
    pub overrides: BTreeMap<String, Value>,
}

impl Task {
    /// Create a task with an id derived from the target and overrides.
    /// Without overrides the id is the target itself, otherwise a short
    /// hash of the overrides is appended, as in `app:build#1a2b3c4d`.
    pub fn new(target: Target, overrides: BTreeMap<String, Value>) -> miette::Result<Self> {
        let mut id = target.to_string();

        if !overrides.is_empty() {
            let mut hasher = ContentHasher::new("task-overrides");
            hasher.hash_content(&overrides)?;

            let hash = hasher.generate_hash()?;

            id.push('#');
            id.push_str(&hash[0..OVERRIDES_HASH_LENGTH]);
        }

        Ok(Self {
            id,
            target,
            overrides,
        })
    }

    /// Return the configuration of the target this task runs.
    pub fn get_target_config<'graph>(
        &self,
        graph: &'graph ProjectGraph,
    ) -> miette::Result<&'graph TargetConfig> {
        let node = graph.get_node(&self.target.project)?;

        node.data.targets.get(&self.target.target).ok_or_else(|| {
            TaskError::MissingTarget {
                project: self.target.project.clone(),
                target: self.target.target.clone(),
            }
            .into()
        })
    }

    /// Options after merging the selected configuration and overrides.
    pub fn resolve_options(&self, config: &TargetConfig) -> BTreeMap<String, Value> {
        config.resolve_options(self.target.configuration.as_deref(), &self.overrides)
    }
}

pub fn has_target(node: &ProjectGraphNode, target: &str) -> bool {
    node.data.targets.contains_key(target)
}

/// Names of workspace projects that define the target, sorted.
pub fn get_projects_with_target(graph: &ProjectGraph, target: &str) -> Vec<String> {
    graph
        .get_workspace_projects()
        .into_iter()
        .filter(|node| has_target(node, target))
        .map(|node| node.name.clone())
        .collect()
}

/// Create a task for every requested project that defines the target.
/// Projects without the target are skipped. Selecting a configuration that
/// the target doesn't define is an error.
#[instrument(skip(graph, overrides))]
pub fn create_tasks(
    graph: &ProjectGraph,
    projects: &[String],
    target: &str,
    configuration: Option<&str>,
    overrides: &BTreeMap<String, Value>,
) -> miette::Result<Vec<Task>> {
    let mut projects = projects.to_vec();
    projects.sort();
    projects.dedup();

    let mut tasks = vec![];

    for project in projects {
        let node = graph.get_node(&project)?;

        let Some(config) = node.data.targets.get(target) else {
            debug!(
                project = project.as_str(),
                target,
                "Project does not have target, skipping"
            );

            continue;
        };

        if let Some(name) = configuration
            && !config.has_configuration(name)
        {
            return Err(TaskError::UnknownConfiguration {
                target: Target::new(&project, target).to_string(),
                configuration: name.to_owned(),
            }
            .into());
        }

        tasks.push(Task::new(
            Target::new(&project, target).with_configuration(configuration),
            overrides.clone(),
        )?);
    }

    debug!(tasks = tasks.len(), "Created tasks");

    Ok(tasks)
}
