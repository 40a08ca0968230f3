use async_trait::async_trait;
use orbit_action_pipeline::subscribers::{format_run_summary, format_task_result};
use orbit_action_pipeline::*;
use orbit_cache::{CacheEngine, TaskCache};
use orbit_notifier::{Notifier, NotifierEvent};
use orbit_project_graph::ProjectGraph;
use orbit_task::{Target, Task};
use orbit_task_runner::TaskStatus;
use orbit_task_runner::command_builder::TaskPlan;
use orbit_test_utils::create_static_graph_stub;
use starbase_sandbox::create_empty_sandbox;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn create_plan(root: &Path, project: &str, command: &str, hash: Option<&str>) -> TaskPlan {
    TaskPlan {
        task: Task::new(Target::new(project, "build"), BTreeMap::new()).unwrap(),
        command_line: command.into(),
        working_dir: root.to_path_buf(),
        env: BTreeMap::new(),
        outputs: vec![],
        timeout: None,
        hash: hash.map(|hash| hash.to_owned()),
    }
}

fn create_cache(root: &Path) -> Arc<TaskCache> {
    Arc::new(CacheEngine::new(root, None).unwrap().create_task_cache())
}

fn create_graph(project_graph: &ProjectGraph, plans: Vec<TaskPlan>) -> TaskGraph {
    TaskGraph::new(project_graph, plans).unwrap()
}

fn read_lines(root: &Path, file: &str) -> Vec<String> {
    fs::read_to_string(root.join(file))
        .unwrap_or_default()
        .lines()
        .map(|line| line.trim().to_owned())
        .collect()
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<Mutex<BTreeSet<String>>>,
    max_in_flight: Arc<Mutex<usize>>,
}

#[async_trait]
impl Subscriber for Recorder {
    async fn on_emit<'data>(&mut self, event: &Event<'data>) -> miette::Result<()> {
        let label = match event {
            Event::TaskQueued { task } => format!("queued {}", task.id),
            Event::TaskStarted { task, .. } => {
                let mut in_flight = self.in_flight.lock().unwrap();
                in_flight.insert(task.id.clone());

                let mut max = self.max_in_flight.lock().unwrap();
                *max = (*max).max(in_flight.len());

                format!("started {}", task.id)
            }
            Event::TaskFinished { result } => {
                self.in_flight.lock().unwrap().remove(&result.task_id);

                format!("finished {}", result.task_id)
            }
            other => other.get_type().to_owned(),
        };

        self.events.lock().unwrap().push(label);

        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotifierEvent) {
        self.events.lock().unwrap().push(event.type_of);
    }

    async fn flush(&self) -> Vec<String> {
        vec!["hook failed".into()]
    }
}

mod action_pipeline {
    use super::*;

    #[tokio::test]
    async fn runs_dependencies_first() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[("app", "lib"), ("lib", "core")]);
        let task_graph = create_graph(
            &project_graph,
            vec![
                create_plan(root, "app", "echo app >> order.txt", None),
                create_plan(root, "lib", "sleep 0.1 && echo lib >> order.txt", None),
                create_plan(root, "core", "sleep 0.1 && echo core >> order.txt", None),
            ],
        );

        let mut pipeline = ActionPipeline::new(create_cache(root));
        let summary = pipeline.run(task_graph).await.unwrap();

        assert!(summary.is_success());
        assert_eq!(read_lines(root, "order.txt"), vec!["core", "lib", "app"]);
    }

    #[tokio::test]
    async fn skips_dependents_of_failures() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[("app", "lib"), ("web", "ui")]);
        let task_graph = create_graph(
            &project_graph,
            vec![
                create_plan(root, "app", "echo app >> order.txt", None),
                create_plan(root, "lib", "exit 1", None),
                create_plan(root, "web", "echo web >> order.txt", None),
                create_plan(root, "ui", "echo ui >> order.txt", None),
            ],
        );

        let mut pipeline = ActionPipeline::new(create_cache(root));
        let summary = pipeline.run(task_graph).await.unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.results.len(), 4);
        assert_eq!(
            summary.get_result("lib:build").unwrap().status,
            TaskStatus::Failed
        );
        assert_eq!(
            summary.get_result("app:build").unwrap().status,
            TaskStatus::Skipped
        );
        assert_eq!(
            summary.get_result("web:build").unwrap().status,
            TaskStatus::Passed
        );

        let mut ran = read_lines(root, "order.txt");
        ran.sort();

        assert_eq!(ran, vec!["ui", "web"]);
    }

    #[tokio::test]
    async fn skips_transitive_dependents() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[("a", "b"), ("b", "c")]);
        let task_graph = create_graph(
            &project_graph,
            vec![
                create_plan(root, "a", "echo a", None),
                create_plan(root, "b", "echo b", None),
                create_plan(root, "c", "exit 3", None),
            ],
        );

        let mut pipeline = ActionPipeline::new(create_cache(root));
        let summary = pipeline.run(task_graph).await.unwrap();

        assert_eq!(summary.get_result("c:build").unwrap().code, Some(3));
        assert_eq!(summary.get_skipped().len(), 2);
        assert_eq!(summary.get_failed().len(), 1);
    }

    #[tokio::test]
    async fn limits_concurrency() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[]);
        let task_graph = create_graph(
            &project_graph,
            ["a", "b", "c", "d", "e"]
                .into_iter()
                .map(|project| create_plan(root, project, "sleep 0.1", None))
                .collect(),
        );

        let recorder = Recorder::default();
        let mut pipeline = ActionPipeline::new(create_cache(root));
        pipeline.concurrency = 2;
        pipeline.subscribe(recorder.clone());

        let summary = pipeline.run(task_graph).await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.results.len(), 5);
        assert!(*recorder.max_in_flight.lock().unwrap() <= 2);
    }

    #[tokio::test]
    async fn emits_events_in_order() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[("app", "lib")]);
        let task_graph = create_graph(
            &project_graph,
            vec![
                create_plan(root, "app", "echo app", None),
                create_plan(root, "lib", "echo lib", None),
            ],
        );

        let recorder = Recorder::default();
        let mut pipeline = ActionPipeline::new(create_cache(root));
        pipeline.subscribe(recorder.clone());
        pipeline.run(task_graph).await.unwrap();

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                "pipeline.started",
                "queued lib:build",
                "queued app:build",
                "started lib:build",
                "finished lib:build",
                "started app:build",
                "finished app:build",
                "pipeline.finished",
            ]
        );
    }

    #[tokio::test]
    async fn replays_cached_tasks() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[]);
        let cache = create_cache(root);

        let create_task_graph = || {
            create_graph(
                &project_graph,
                vec![create_plan(
                    root,
                    "app",
                    "echo app >> runs.txt && echo built",
                    Some("hash123"),
                )],
            )
        };

        let first = ActionPipeline::new(cache.clone())
            .run(create_task_graph())
            .await
            .unwrap();

        assert_eq!(first.count_cached(), 0);

        let second = ActionPipeline::new(cache)
            .run(create_task_graph())
            .await
            .unwrap();

        assert_eq!(second.count_cached(), 1);
        assert_eq!(
            second.get_result("app:build").unwrap().terminal_output.trim(),
            "built"
        );
        assert_eq!(read_lines(root, "runs.txt").len(), 1);
    }

    #[tokio::test]
    async fn cancels_pending_tasks() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[("app", "lib")]);
        let task_graph = create_graph(
            &project_graph,
            vec![
                create_plan(root, "app", "echo app >> runs.txt", None),
                create_plan(root, "lib", "echo lib >> runs.txt", None),
            ],
        );

        let mut pipeline = ActionPipeline::new(create_cache(root));
        pipeline.get_cancel_token().cancel();

        let summary = pipeline.run(task_graph).await.unwrap();

        assert!(!summary.is_success());
        assert!(
            summary
                .results
                .iter()
                .all(|result| result.status == TaskStatus::Cancelled)
        );
        assert!(read_lines(root, "runs.txt").is_empty());
    }

    #[tokio::test]
    async fn runs_empty_graphs() {
        let sandbox = create_empty_sandbox();
        let project_graph = create_static_graph_stub(&[]);
        let task_graph = create_graph(&project_graph, vec![]);

        let summary = ActionPipeline::new(create_cache(sandbox.path()))
            .run(task_graph)
            .await
            .unwrap();

        assert!(summary.is_success());
        assert!(summary.results.is_empty());
    }

    #[tokio::test]
    async fn relays_events_to_notifier() {
        let sandbox = create_empty_sandbox();
        let root = sandbox.path();
        let project_graph = create_static_graph_stub(&[]);
        let task_graph = create_graph(&project_graph, vec![create_plan(root, "app", "echo app", None)]);
        let notifier = Arc::new(RecordingNotifier::default());

        let summary = ActionPipeline::new(create_cache(root))
            .with_notifier(notifier.clone())
            .run(task_graph)
            .await
            .unwrap();

        assert_eq!(
            *notifier.events.lock().unwrap(),
            vec!["command.started", "task.finished", "command.finished"]
        );
        assert_eq!(summary.notifier_errors, vec!["hook failed"]);
    }
}

mod console_output {
    use super::*;
    use orbit_task_runner::TaskResult;

    fn create_result(id: &str, status: TaskStatus) -> TaskResult {
        let (project, target) = id.split_once(':').unwrap();

        TaskResult::new(id, Target::new(project, target), status)
    }

    #[test]
    fn formats_passed_task_with_output() {
        let mut result = create_result("app:build", TaskStatus::Passed);
        result.terminal_output = "compiled\n".into();

        let message = format_task_result(&result);

        assert!(message.contains("app:build"));
        assert!(message.contains("(passed)"));
        assert!(message.ends_with("\ncompiled"));
    }

    #[test]
    fn formats_cached_and_failed_tasks() {
        let mut cached = create_result("app:build", TaskStatus::Passed);
        cached.cached = true;

        let mut failed = create_result("app:test", TaskStatus::Failed);
        failed.code = Some(2);

        assert!(format_task_result(&cached).contains("(cached)"));
        assert!(format_task_result(&failed).contains("(failed with code 2)"));
        assert!(
            format_task_result(&create_result("app:lint", TaskStatus::Skipped))
                .contains("(skipped, a dependency failed)")
        );
    }

    #[test]
    fn summarizes_failures() {
        let mut failed = create_result("lib:build", TaskStatus::Failed);
        failed.code = Some(1);

        let summary = RunSummary {
            results: vec![
                create_result("core:build", TaskStatus::Passed),
                failed,
                create_result("app:build", TaskStatus::Skipped),
            ],
            cache_warnings: vec!["disk full".into()],
            ..Default::default()
        };

        let message = format_run_summary(&summary);

        assert!(message.contains("Failure:"));
        assert!(message.contains("1 passed (0 cached), 1 failed, 1 skipped"));
        assert!(message.contains("Failed: "));
        assert!(message.contains("Skipped: "));
        assert!(message.contains("1 cache operations failed"));
    }
}
