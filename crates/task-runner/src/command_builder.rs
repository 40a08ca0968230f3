use crate::task_runner_error::TaskRunnerError;
use orbit_config::TargetConfig;
use orbit_project_graph::{ProjectGraph, ProjectGraphNode};
use orbit_task::Task;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument, trace};

/// Everything required to run a task. Plans are resolved before the run
/// starts, so running jobs never read the project graph.
#[derive(Clone, Debug)]
pub struct TaskPlan {
    pub task: Task,
    pub command_line: String,
    pub working_dir: PathBuf,
    pub env: BTreeMap<String, String>,

    /// Workspace relative outputs to archive and restore.
    pub outputs: Vec<String>,

    pub timeout: Option<Duration>,

    /// Cache key of the task. Tasks without one never touch the cache.
    pub hash: Option<String>,
}

impl TaskPlan {
    pub fn is_cacheable(&self) -> bool {
        self.hash.is_some()
    }
}

pub struct CommandBuilder<'task> {
    config: &'task TargetConfig,
    options: BTreeMap<String, Value>,
    project: &'task ProjectGraphNode,
    task: &'task Task,
    workspace_root: &'task Path,
}

impl<'task> CommandBuilder<'task> {
    pub fn new(
        workspace_root: &'task Path,
        project_graph: &'task ProjectGraph,
        task: &'task Task,
    ) -> miette::Result<Self> {
        let project = project_graph.get_node(&task.target.project)?;
        let config = task.get_target_config(project_graph)?;

        Ok(Self {
            options: task.resolve_options(config),
            config,
            project,
            task,
            workspace_root,
        })
    }

    pub fn get_command_line(&self) -> miette::Result<String> {
        self.config
            .resolve_command(&self.options)
            .filter(|command| !command.trim().is_empty())
            .ok_or_else(|| {
                TaskRunnerError::MissingCommand {
                    target: self.task.id.clone(),
                }
                .into()
            })
    }

    /// Commands run from the workspace root, unless a `cwd` option points
    /// elsewhere (relative to the root).
    pub fn get_working_dir(&self) -> PathBuf {
        match self.options.get("cwd").and_then(|cwd| cwd.as_str()) {
            Some(cwd) if !cwd.is_empty() => self.workspace_root.join(cwd),
            _ => self.workspace_root.to_path_buf(),
        }
    }

    pub fn get_env(&self, hash: Option<&str>) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();

        env.insert("ORBIT_TARGET".into(), self.task.target.to_string());
        env.insert("ORBIT_PROJECT".into(), self.project.name.clone());
        env.insert(
            "ORBIT_PROJECT_ROOT".into(),
            self.workspace_root
                .join(self.project.data.root.as_deref().unwrap_or_default())
                .to_string_lossy()
                .into_owned(),
        );
        env.insert(
            "ORBIT_WORKSPACE_ROOT".into(),
            self.workspace_root.to_string_lossy().into_owned(),
        );

        if let Some(hash) = hash {
            env.insert("ORBIT_TASK_HASH".into(), hash.to_owned());
        }

        env
    }

    #[instrument(skip_all)]
    pub fn build(self, hash: Option<String>) -> miette::Result<TaskPlan> {
        let command_line = self.get_command_line()?;

        debug!(
            task_target = self.task.id.as_str(),
            command = command_line.as_str(),
            cacheable = hash.is_some(),
            "Resolved task command"
        );

        Ok(TaskPlan {
            env: self.get_env(hash.as_deref()),
            working_dir: self.get_working_dir(),
            outputs: self.config.outputs.clone(),
            timeout: self.config.timeout.map(Duration::from_secs),
            task: self.task.clone(),
            command_line,
            hash,
        })
    }
}

/// Wrap the command line in the platform shell, with output piped for
/// capturing. The child is killed if its handle is dropped.
pub fn create_shell_command(plan: &TaskPlan) -> Command {
    #[cfg(windows)]
    let mut command = {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(&plan.command_line);
        command
    };

    #[cfg(not(windows))]
    let mut command = {
        let mut command = Command::new("sh");
        command.arg("-c").arg(&plan.command_line);
        command
    };

    trace!(
        task_target = plan.task.id.as_str(),
        working_dir = ?plan.working_dir,
        "Creating shell command"
    );

    command
        .current_dir(&plan.working_dir)
        .envs(&plan.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    command
}
