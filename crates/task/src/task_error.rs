use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum TaskError {
    #[diagnostic(code(task::invalid_target))]
    #[error(
        "Invalid target {}, must be in the format of \"project:target\" or \"project:target:configuration\".",
        .target.style(Style::Label),
    )]
    InvalidTarget { target: String },

    #[diagnostic(code(task::missing_target))]
    #[error(
        "Project {} does not have a {} target.",
        .project.style(Style::Id),
        .target.style(Style::Label),
    )]
    MissingTarget { project: String, target: String },

    #[diagnostic(code(task::unknown_configuration))]
    #[error(
        "Target {} does not have a {} configuration.",
        .target.style(Style::Label),
        .configuration.style(Style::Property),
    )]
    UnknownConfiguration {
        target: String,
        configuration: String,
    },
}
