use crate::config_error::ConfigError;
use crate::implicit_dependencies::{ALL_PROJECTS, ImplicitDependencyEntry};
use crate::workspace_config::WorkspaceConfig;
use orbit_common::ReadFs;
use orbit_common::consts::CONFIG_WORKSPACE_FILENAME;
use std::collections::BTreeMap;
use tracing::instrument;

/// Verify the workspace configuration is internally consistent and that
/// every declared project root exists. All problems are collected into a
/// single configuration error.
#[instrument(skip_all)]
pub fn assert_workspace_validity(config: &WorkspaceConfig, fs: &dyn ReadFs) -> miette::Result<()> {
    let mut body = vec![];

    let missing_roots = config
        .projects
        .iter()
        .filter(|(_, project)| project.root.is_empty() || !fs.exists(&project.root))
        .map(|(name, project)| {
            if project.root.is_empty() {
                format!("{name} (no root declared)")
            } else {
                format!("{name} ({})", project.root)
            }
        })
        .collect::<Vec<_>>();

    if !missing_roots.is_empty() {
        body.push(format!(
            "The following projects have a root that does not exist: {}",
            missing_roots.join(", ")
        ));
    }

    // Keyed by the file or project that declared the dependencies
    let mut invalid_deps = BTreeMap::<String, Vec<String>>::new();
    let mut invalid_leaves = vec![];

    for (file, entry) in &config.implicit_dependencies {
        for leaf in entry.get_leaves() {
            match leaf {
                ImplicitDependencyEntry::All(value) if value != ALL_PROJECTS => {
                    invalid_leaves.push(format!("{file} ({value})"));
                }
                ImplicitDependencyEntry::Projects(names) => {
                    for name in names {
                        if !config.projects.contains_key(name) {
                            invalid_deps
                                .entry(file.to_owned())
                                .or_default()
                                .push(name.to_owned());
                        }
                    }
                }
                _ => {}
            };
        }
    }

    for (project_name, project) in &config.projects {
        for name in &project.implicit_dependencies {
            if !config.projects.contains_key(name) {
                invalid_deps
                    .entry(project_name.to_owned())
                    .or_default()
                    .push(name.to_owned());
            }
        }
    }

    if !invalid_deps.is_empty() {
        let mut message = format!(
            "The following implicitDependencies specified in {CONFIG_WORKSPACE_FILENAME} are invalid:"
        );

        for (key, names) in invalid_deps {
            message.push_str(&format!("\n    {key}"));

            for name in names {
                message.push_str(&format!("\n        {name}"));
            }
        }

        body.push(message);
    }

    if !invalid_leaves.is_empty() {
        body.push(format!(
            "Implicit dependencies must be \"{ALL_PROJECTS}\" or a list of project names, found: {}",
            invalid_leaves.join(", ")
        ));
    }

    for (index, constraint) in config.dep_constraints.iter().enumerate() {
        if constraint.source_tag.trim().is_empty() {
            body.push(format!(
                "Dependency constraint at index {index} is missing a sourceTag."
            ));
        }
    }

    if config.tasks_runner_options.parallel == 0 {
        body.push("tasksRunnerOptions.parallel must be greater than 0.".into());
    }

    if body.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::invalid(body).into())
    }
}
