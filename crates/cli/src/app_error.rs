use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum AppError {
    #[diagnostic(
        code(app::missing_workspace),
        help = "Run orbit from within a workspace that contains a workspace.json."
    )]
    #[error(
        "Unable to find a workspace root, no {} found in {} or any parent directory.",
        "workspace.json".style(Style::File),
        .dir.style(Style::Path),
    )]
    MissingWorkspace { dir: PathBuf },

    #[diagnostic(code(app::run::no_projects_selected))]
    #[error(
        "No projects selected for target {}. Pass {}, {}, or {}, or use the {} form.",
        .target.style(Style::Label),
        "--projects".style(Style::Shell),
        "--all".style(Style::Shell),
        "--affected".style(Style::Shell),
        "project:target".style(Style::Label),
    )]
    NoProjectsSelected { target: String },

    #[diagnostic(code(app::run::conflicting_selection))]
    #[error(
        "Project target {} cannot be combined with {}, {}, or {}.",
        .target.style(Style::Label),
        "--projects".style(Style::Shell),
        "--all".style(Style::Shell),
        "--affected".style(Style::Shell),
    )]
    ConflictingSelection { target: String },

    #[diagnostic(code(app::invalid_override))]
    #[error(
        "Invalid task override {}, expected the format {}.",
        .value.style(Style::Symbol),
        "key=value".style(Style::Symbol),
    )]
    InvalidOverride { value: String },

    #[diagnostic(code(app::invalid_parallel))]
    #[error("The {} option must be at least 1.", "--parallel".style(Style::Shell))]
    InvalidParallel,
}
