use crate::action_pipeline_error::ActionPipelineError;
use orbit_project_graph::{DependencyType, ProjectGraph};
use orbit_task_runner::command_builder::TaskPlan;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub type TaskGraphType = DiGraph<TaskPlan, ()>;

/// Tasks of a run, with an edge from each task to the tasks it must wait
/// for. A task waits on the tasks of every project its project depends on
/// through static or implicit edges. Projects without tasks in the run are
/// passed through, so their own dependencies are still awaited.
pub struct TaskGraph {
    graph: TaskGraphType,
    indices: FxHashMap<String, NodeIndex>,
}

impl TaskGraph {
    #[instrument(skip_all)]
    pub fn new(project_graph: &ProjectGraph, plans: Vec<TaskPlan>) -> miette::Result<Self> {
        let mut graph = TaskGraphType::new();
        let mut indices = FxHashMap::default();
        let mut by_project = BTreeMap::<String, Vec<NodeIndex>>::new();

        for plan in plans {
            let id = plan.task.id.clone();

            if indices.contains_key(&id) {
                return Err(ActionPipelineError::DuplicateTask { task: id }.into());
            }

            let project = plan.task.target.project.clone();
            let index = graph.add_node(plan);

            indices.insert(id, index);
            by_project.entry(project).or_default().push(index);
        }

        for (project, tasks) in &by_project {
            for dep_project in find_dependency_projects(project_graph, project, &by_project) {
                for task in tasks {
                    for dep in &by_project[&dep_project] {
                        graph.add_edge(*task, *dep, ());
                    }
                }
            }
        }

        debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            "Created task graph"
        );

        let task_graph = Self { graph, indices };
        task_graph.sort_topological()?;

        Ok(task_graph)
    }

    pub fn get_inner_graph(&self) -> &TaskGraphType {
        &self.graph
    }

    pub fn get_index(&self, task_id: &str) -> Option<NodeIndex> {
        self.indices.get(task_id).copied()
    }

    pub fn get_plan(&self, index: NodeIndex) -> Option<&TaskPlan> {
        self.graph.node_weight(index)
    }

    pub fn get_task_ids(&self) -> Vec<&str> {
        self.graph
            .node_weights()
            .map(|plan| plan.task.id.as_str())
            .collect()
    }

    /// Tasks that must finish before the given one starts.
    pub fn get_dependencies(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| edge.target())
            .collect()
    }

    pub fn get_dependents(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| edge.source())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Order tasks so that every task comes after its dependencies.
    pub fn sort_topological(&self) -> miette::Result<Vec<NodeIndex>> {
        let mut order = toposort(&self.graph, None).map_err(|cycle| {
            ActionPipelineError::CycleDetected {
                task: self.graph[cycle.node_id()].task.id.clone(),
            }
        })?;

        // Edges point at dependencies, so they sort last
        order.reverse();

        Ok(order)
    }
}

fn find_dependency_projects(
    project_graph: &ProjectGraph,
    project: &str,
    by_project: &BTreeMap<String, Vec<NodeIndex>>,
) -> Vec<String> {
    let mut found = vec![];
    let mut visited = FxHashSet::default();
    let mut stack = vec![project];

    while let Some(current) = stack.pop() {
        for edge in project_graph.get_dependencies_of(current) {
            if edge.type_of == DependencyType::Dynamic || !visited.insert(edge.target.as_str()) {
                continue;
            }

            if by_project.contains_key(&edge.target) {
                found.push(edge.target.clone());
            } else {
                stack.push(&edge.target);
            }
        }
    }

    found
}
