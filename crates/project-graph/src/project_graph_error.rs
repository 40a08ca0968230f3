use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ProjectGraphError {
    #[diagnostic(code(project_graph::missing_root))]
    #[error(
        "Unable to build the project graph, the root {} of project {} does not exist.",
        .root.style(Style::Path),
        .project.style(Style::Id),
    )]
    MissingProjectRoot { project: String, root: String },

    #[diagnostic(code(project_graph::unknown_project))]
    #[error("No project has been configured with the name {}.", .name.style(Style::Id))]
    UnknownProject { name: String },
}
