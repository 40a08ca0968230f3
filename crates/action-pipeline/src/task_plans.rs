use orbit_common::ReadFs;
use orbit_config::WorkspaceConfig;
use orbit_project_graph::ProjectGraph;
use orbit_task::Task;
use orbit_task_hasher::TaskHasher;
use orbit_task_runner::command_builder::{CommandBuilder, TaskPlan};
use std::path::Path;
use tracing::{debug, instrument};

/// Resolve the command and cache key of every task before anything runs,
/// so all keys of a run derive from the same graph snapshot. Only targets
/// listed in `cacheableOperations` receive a key.
#[instrument(skip_all)]
pub fn create_task_plans(
    workspace_root: &Path,
    project_graph: &ProjectGraph,
    config: &WorkspaceConfig,
    fs: &dyn ReadFs,
    tasks: &[Task],
    skip_cache: bool,
) -> miette::Result<Vec<TaskPlan>> {
    let hasher = TaskHasher::new(project_graph, config, fs)?;
    let mut plans = Vec::with_capacity(tasks.len());

    for task in tasks {
        let hash = if !skip_cache && config.is_cacheable(&task.target.target) {
            Some(hasher.hash(task)?)
        } else {
            None
        };

        plans.push(CommandBuilder::new(workspace_root, project_graph, task)?.build(hash)?);
    }

    debug!(count = plans.len(), "Created task plans");

    Ok(plans)
}
