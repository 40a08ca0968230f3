use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use orbit_project_graph::ProjectGraphNodeType;
use thiserror::Error;

#[derive(Clone, Error, Debug, Diagnostic, PartialEq)]
pub enum ProjectConstraintsError {
    #[diagnostic(code(project_constraints::circular_dependency))]
    #[error(
        "Circular dependency between {} and {} detected: {path}.",
        .source_id.style(Style::Id),
        .dep_id.style(Style::Id),
    )]
    CircularDependency {
        source_id: String,
        dep_id: String,
        path: String,
    },

    #[diagnostic(code(project_constraints::invalid_type_relationship))]
    #[error(
        "Invalid project relationship. Project {} of type {source_type} cannot depend on project {} of type {dep_type}; can only depend on {allowed}.",
        .source_id.style(Style::Id),
        .dep_id.style(Style::Id),
    )]
    InvalidTypeRelationship {
        source_id: String,
        source_type: ProjectGraphNodeType,
        dep_id: String,
        dep_type: ProjectGraphNodeType,
        allowed: String,
    },

    #[diagnostic(code(project_constraints::invalid_tag_relationship))]
    #[error(
        "Invalid tag relationship. Project {} with tag #{source_tag} cannot depend on project {}. The tag #{source_tag} requires a dependency to have one of the following tags: {allowed}.",
        .source_id.style(Style::Id),
        .dep_id.style(Style::Id),
    )]
    InvalidTagRelationship {
        source_id: String,
        source_tag: String,
        dep_id: String,
        allowed: String,
    },

    #[diagnostic(code(project_constraints::static_import_of_lazy_library))]
    #[error(
        "Project {} statically imports the lazy-loaded library {}. Imports of lazy-loaded libraries must themselves be lazy.",
        .source_id.style(Style::Id),
        .dep_id.style(Style::Id),
    )]
    StaticImportOfLazyLibrary { source_id: String, dep_id: String },
}
