use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ActionPipelineError {
    #[diagnostic(
        code(action_pipeline::cycle_detected),
        help("Tasks of projects that depend on each other can't be ordered.")
    )]
    #[error("Task {} depends on itself through its project's dependencies.", .task.style(Style::Label))]
    CycleDetected { task: String },

    #[diagnostic(code(action_pipeline::duplicate_task))]
    #[error("Task {} was requested more than once.", .task.style(Style::Label))]
    DuplicateTask { task: String },
}
