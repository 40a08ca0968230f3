use super::affected::{create_touched_files, get_affected_projects};
use super::{HEADING_AFFECTED, HEADING_SELECTION};
use crate::AppResult;
use crate::app_error::AppError;
use crate::helpers::parse_overrides;
use crate::session::OrbitSession;
use clap::Args;
use orbit_action_pipeline::subscribers::ConsoleSubscriber;
use orbit_action_pipeline::{ActionPipeline, TaskGraph, create_task_plans};
use orbit_cache::{CacheMode, HttpRemoteCache, RemoteCache, force_cache_mode};
use orbit_common::color;
use orbit_notifier::create_notifier;
use orbit_project_graph::ProjectGraph;
use orbit_task::{Target, TaskError, create_tasks, get_projects_with_target};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    #[arg(help = "Target to run, either a target name or project:target[:configuration]")]
    target: String,

    #[arg(
        long,
        value_delimiter = ',',
        num_args = 1..,
        help = "Projects to run the target for",
        help_heading = HEADING_SELECTION
    )]
    projects: Vec<String>,

    #[arg(
        long,
        help = "Run the target for every project that defines it",
        help_heading = HEADING_SELECTION
    )]
    all: bool,

    #[arg(
        long,
        requires = "files",
        help = "Run the target for projects affected by the touched files",
        help_heading = HEADING_AFFECTED
    )]
    affected: bool,

    #[arg(
        long,
        num_args = 1..,
        requires = "affected",
        help = "Workspace relative files that were touched",
        help_heading = HEADING_AFFECTED
    )]
    files: Vec<String>,

    #[arg(
        long,
        requires = "affected",
        help = "Previous version of the root package.json, to diff its fields",
        help_heading = HEADING_AFFECTED
    )]
    manifest_before: Option<PathBuf>,

    #[arg(long, short = 'c', help = "Named configuration of the target to apply")]
    configuration: Option<String>,

    #[arg(long, help = "Maximum number of tasks to run at once")]
    parallel: Option<usize>,

    #[arg(long, help = "Bypass the cache, always executing and never recording")]
    skip_cache: bool,

    #[arg(last = true, help = "Option overrides for the target, as key=value")]
    overrides: Vec<String>,
}

struct Selection {
    projects: Vec<String>,
    target: String,
    configuration: Option<String>,
    explicit: Option<Target>,
}

fn select_projects(
    session: &OrbitSession,
    project_graph: &ProjectGraph,
    args: &RunArgs,
) -> miette::Result<Selection> {
    if args.target.contains(':') {
        if args.all || args.affected || !args.projects.is_empty() {
            return Err(AppError::ConflictingSelection {
                target: args.target.clone(),
            }
            .into());
        }

        let target = Target::parse(&args.target)?;

        return Ok(Selection {
            projects: vec![target.project.clone()],
            configuration: args
                .configuration
                .clone()
                .or_else(|| target.configuration.clone()),
            target: target.target.clone(),
            explicit: Some(target),
        });
    }

    let projects = if args.all {
        get_projects_with_target(project_graph, &args.target)
    } else if args.affected {
        let touched_files =
            create_touched_files(session, &args.files, args.manifest_before.as_ref())?;

        get_affected_projects(session, project_graph, &touched_files)
    } else if !args.projects.is_empty() {
        args.projects.clone()
    } else {
        return Err(AppError::NoProjectsSelected {
            target: args.target.clone(),
        }
        .into());
    };

    Ok(Selection {
        projects,
        target: args.target.clone(),
        configuration: args.configuration.clone(),
        explicit: None,
    })
}

fn create_remote_cache(session: &OrbitSession) -> Option<Arc<dyn RemoteCache>> {
    let config = session
        .workspace_config
        .tasks_runner_options
        .remote_cache
        .as_ref()?;

    match HttpRemoteCache::new(&config.url, config.token_env.as_deref()) {
        Ok(remote) => Some(Arc::new(remote)),
        Err(error) => {
            // The local cache still works without it
            warn!(
                "Unable to create the remote cache client: {}",
                color::muted_light(error.to_string())
            );

            None
        }
    }
}

#[instrument(skip(session))]
pub async fn run(session: &OrbitSession, args: RunArgs) -> AppResult {
    let runner_options = &session.workspace_config.tasks_runner_options;
    let concurrency = args.parallel.unwrap_or(runner_options.parallel);

    if concurrency == 0 {
        return Err(AppError::InvalidParallel.into());
    }

    if args.skip_cache {
        force_cache_mode(CacheMode::Off);
    }

    let overrides = parse_overrides(&args.overrides)?;
    let project_graph = session.get_project_graph()?;
    let selection = select_projects(session, &project_graph, &args)?;

    let tasks = create_tasks(
        &project_graph,
        &selection.projects,
        &selection.target,
        selection.configuration.as_deref(),
        &overrides,
    )?;

    if let Some(target) = &selection.explicit
        && tasks.is_empty()
    {
        return Err(TaskError::MissingTarget {
            project: target.project.clone(),
            target: target.target.clone(),
        }
        .into());
    }

    if tasks.is_empty() {
        println!(
            "No projects to run {} for",
            color::label(&selection.target)
        );

        return Ok(None);
    }

    let plans = create_task_plans(
        &session.workspace_root,
        &project_graph,
        &session.workspace_config,
        &session.fs,
        &tasks,
        args.skip_cache,
    )?;
    let task_graph = TaskGraph::new(&project_graph, plans)?;

    debug!(
        tasks = task_graph.len(),
        concurrency, "Running target {}", selection.target
    );

    let engine = session.get_cache_engine()?;
    let mut pipeline = ActionPipeline::new(Arc::new(engine.create_task_cache()))
        .with_remote(create_remote_cache(session))
        .with_notifier(create_notifier(&session.workspace_config.notifier));

    pipeline.concurrency = concurrency;
    pipeline.grace_period = Duration::from_secs(runner_options.grace_period);
    pipeline.subscribe(ConsoleSubscriber::new());

    let summary = pipeline.run(task_graph).await?;

    if !summary.notifier_errors.is_empty() {
        println!(
            "{}",
            color::caution(format!(
                "{} notifications failed to deliver",
                summary.notifier_errors.len()
            ))
        );
    }

    Ok(if summary.is_success() { None } else { Some(1) })
}
