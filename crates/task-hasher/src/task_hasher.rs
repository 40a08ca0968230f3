use crate::task_hash::{DependencyHash, TaskHash};
use orbit_common::ReadFs;
use orbit_config::WorkspaceConfig;
use orbit_graph_utils::walk;
use orbit_hash::{ContentHasher, FileData};
use orbit_project_graph::{DependencyType, ProjectGraph};
use orbit_task::Task;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, trace};

/// Workspace files declared in `implicitDependencies`, along with the
/// projects they apply to.
struct GlobalInput {
    files: Vec<FileData>,
    projects: BTreeSet<String>,
}

/// Derives cache keys for tasks. Workspace-level files are read once when
/// the hasher is created, so every key in a run reflects the same snapshot.
pub struct TaskHasher<'graph> {
    project_graph: &'graph ProjectGraph,
    global_inputs: Vec<GlobalInput>,
}

impl<'graph> TaskHasher<'graph> {
    #[instrument(skip_all)]
    pub fn new(
        project_graph: &'graph ProjectGraph,
        config: &WorkspaceConfig,
        fs: &dyn ReadFs,
    ) -> miette::Result<Self> {
        let all_projects = project_graph.get_workspace_project_names();
        let mut all_files = None;
        let mut global_inputs = vec![];

        for (pattern, entry) in &config.implicit_dependencies {
            let files = if fs.exists(pattern) {
                vec![pattern.to_owned()]
            } else if let Ok(glob) = glob::Pattern::new(pattern) {
                if all_files.is_none() {
                    all_files = Some(fs.list("")?);
                }

                all_files
                    .iter()
                    .flatten()
                    .filter(|file| glob.matches(file))
                    .cloned()
                    .collect()
            } else {
                vec![]
            };

            let mut hashed = vec![];

            for file in files {
                hashed.push(FileData::from_contents(&file, &fs.read(&file)?));
            }

            trace!(
                pattern = pattern.as_str(),
                files = hashed.len(),
                "Hashed global input"
            );

            global_inputs.push(GlobalInput {
                files: hashed,
                projects: entry.resolve_all(&all_projects).into_iter().collect(),
            });
        }

        Ok(Self {
            project_graph,
            global_inputs,
        })
    }

    /// Return the nodes whose contents affect the project's tasks: every node
    /// reachable through static or implicit edges. Dynamic edges are not
    /// followed.
    pub fn get_hashed_dependencies(&self, project: &str) -> BTreeSet<String> {
        let mut deps = walk(&[project.to_owned()], |name| {
            self.project_graph
                .get_dependencies_of(name)
                .iter()
                .filter(|edge| edge.type_of != DependencyType::Dynamic)
                .map(|edge| edge.target.clone())
                .collect()
        });

        deps.remove(project);
        deps
    }

    pub fn create_hash_content<'task>(&'task self, task: &'task Task) -> miette::Result<TaskHash<'task>> {
        let project = self.project_graph.get_node(&task.target.project)?;
        let config = task.get_target_config(self.project_graph)?;
        let options = task.resolve_options(config);
        let hashed_deps = self.get_hashed_dependencies(&project.name);

        let mut deps = BTreeMap::new();

        for name in &hashed_deps {
            let Some(node) = self.project_graph.nodes.get(name) else {
                continue;
            };

            let hash = if node.is_npm() {
                DependencyHash::Package(node.data.version.as_deref().unwrap_or("*"))
            } else {
                DependencyHash::Files(hash_files(&node.data.files))
            };

            deps.insert(node.name.as_str(), hash);
        }

        let global_files = self
            .global_inputs
            .iter()
            .filter(|input| {
                input.projects.contains(&project.name)
                    || input.projects.iter().any(|name| hashed_deps.contains(name))
            })
            .flat_map(|input| input.files.iter())
            .map(|data| (data.file.as_str(), data.hash.as_str()))
            .collect();

        Ok(TaskHash {
            command: config.resolve_command(&options),
            deps,
            executor: &config.executor,
            files: hash_files(&project.data.files),
            global_files,
            options,
            outputs: config.outputs.iter().map(|output| output.as_str()).collect(),
            target: &task.target,
            version: "1",
        })
    }

    pub fn hash(&self, task: &Task) -> miette::Result<String> {
        let content = self.create_hash_content(task)?;

        let mut hasher = ContentHasher::new("task");
        hasher.hash_content(&content)?;

        let hash = hasher.generate_hash()?;

        debug!(task_target = task.id.as_str(), hash = hash.as_str(), "Hashed task");

        Ok(hash)
    }
}

fn hash_files(files: &[FileData]) -> BTreeMap<&str, &str> {
    files
        .iter()
        .map(|data| (data.file.as_str(), data.hash.as_str()))
        .collect()
}
