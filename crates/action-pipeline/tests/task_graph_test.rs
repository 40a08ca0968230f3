use orbit_action_pipeline::*;
use orbit_project_graph::DependencyType;
use orbit_task::{Target, Task};
use orbit_task_runner::command_builder::TaskPlan;
use orbit_test_utils::{create_graph_stub, create_static_graph_stub};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn create_plan(project: &str) -> TaskPlan {
    TaskPlan {
        task: Task::new(Target::new(project, "build"), BTreeMap::new()).unwrap(),
        command_line: "echo".into(),
        working_dir: PathBuf::from("."),
        env: BTreeMap::new(),
        outputs: vec![],
        timeout: None,
        hash: None,
    }
}

fn get_dependency_ids(graph: &TaskGraph, task_id: &str) -> Vec<String> {
    let mut ids = graph
        .get_dependencies(graph.get_index(task_id).unwrap())
        .into_iter()
        .map(|index| graph.get_plan(index).unwrap().task.id.clone())
        .collect::<Vec<_>>();
    ids.sort();
    ids
}

fn get_order(graph: &TaskGraph) -> Vec<String> {
    graph
        .sort_topological()
        .unwrap()
        .into_iter()
        .map(|index| graph.get_plan(index).unwrap().task.id.clone())
        .collect()
}

mod task_graph {
    use super::*;

    #[test]
    fn follows_static_and_implicit_edges() {
        let project_graph = create_graph_stub(
            &[],
            &[
                ("app", "lib", DependencyType::Static),
                ("app", "tools", DependencyType::Implicit),
            ],
        );
        let graph = TaskGraph::new(
            &project_graph,
            vec![create_plan("app"), create_plan("lib"), create_plan("tools")],
        )
        .unwrap();

        assert_eq!(
            get_dependency_ids(&graph, "app:build"),
            vec!["lib:build", "tools:build"]
        );
        assert!(get_dependency_ids(&graph, "lib:build").is_empty());
    }

    #[test]
    fn ignores_dynamic_edges() {
        let project_graph =
            create_graph_stub(&[], &[("app", "lazy", DependencyType::Dynamic)]);
        let graph =
            TaskGraph::new(&project_graph, vec![create_plan("app"), create_plan("lazy")]).unwrap();

        assert!(get_dependency_ids(&graph, "app:build").is_empty());
    }

    #[test]
    fn passes_through_projects_without_tasks() {
        let project_graph = create_static_graph_stub(&[("a", "b"), ("b", "c"), ("c", "d")]);
        let graph = TaskGraph::new(
            &project_graph,
            vec![create_plan("a"), create_plan("c"), create_plan("d")],
        )
        .unwrap();

        assert_eq!(get_dependency_ids(&graph, "a:build"), vec!["c:build"]);
        assert_eq!(get_dependency_ids(&graph, "c:build"), vec!["d:build"]);
    }

    #[test]
    fn orders_dependencies_first() {
        let project_graph = create_static_graph_stub(&[("a", "b"), ("b", "c")]);
        let graph = TaskGraph::new(
            &project_graph,
            vec![create_plan("a"), create_plan("b"), create_plan("c")],
        )
        .unwrap();

        assert_eq!(get_order(&graph), vec!["c:build", "b:build", "a:build"]);
    }

    #[test]
    fn ignores_npm_dependencies() {
        let project_graph = create_static_graph_stub(&[("app", "npm:react")]);
        let graph = TaskGraph::new(&project_graph, vec![create_plan("app")]).unwrap();

        assert!(get_dependency_ids(&graph, "app:build").is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn errors_on_cycles() {
        let project_graph = create_static_graph_stub(&[("a", "b"), ("b", "a")]);

        assert!(TaskGraph::new(&project_graph, vec![create_plan("a"), create_plan("b")]).is_err());
    }

    #[test]
    fn errors_on_cycles_through_projects_without_tasks() {
        let project_graph = create_static_graph_stub(&[("a", "b"), ("b", "a")]);

        assert!(TaskGraph::new(&project_graph, vec![create_plan("a")]).is_err());
    }

    #[test]
    fn allows_cycles_outside_the_run() {
        let project_graph = create_static_graph_stub(&[("a", "b"), ("b", "c"), ("c", "b")]);

        assert!(TaskGraph::new(&project_graph, vec![create_plan("a")]).is_ok());
    }

    #[test]
    fn errors_on_duplicate_tasks() {
        let project_graph = create_static_graph_stub(&[]);

        assert!(TaskGraph::new(&project_graph, vec![create_plan("a"), create_plan("a")]).is_err());
    }
}
