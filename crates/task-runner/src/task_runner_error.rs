use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum TaskRunnerError {
    #[diagnostic(
        code(task_runner::missing_command),
        help("Set a {} for the target, or a {} option.", "command".style(Style::Property), "command".style(Style::Property))
    )]
    #[error("Target {} has no command to run.", .target.style(Style::Label))]
    MissingCommand { target: String },

    #[diagnostic(code(task_runner::spawn_failed))]
    #[error("Failed to run {} for target {}.", .command.style(Style::Shell), .target.style(Style::Label))]
    Spawn {
        target: String,
        command: String,
        #[source]
        error: Box<std::io::Error>,
    },

    #[diagnostic(code(task_runner::capture_failed))]
    #[error("Failed to capture the output of target {}.", .target.style(Style::Label))]
    Capture {
        target: String,
        #[source]
        error: Box<std::io::Error>,
    },
}
