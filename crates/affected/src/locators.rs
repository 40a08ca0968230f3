use crate::json_diff::DiffType;
use crate::touched_file::TouchedFile;
use orbit_common::consts::{CONFIG_WORKSPACE_FILENAME, NPM_NODE_PREFIX, ROOT_MANIFEST_FILENAME};
use orbit_config::WorkspaceConfig;
use orbit_project_graph::{PackageManifest, ProjectGraph};
use tracing::{trace, warn};

/// Maps a single touched file to the nodes it directly affects.
pub type TouchedNodeLocator = fn(&TouchedFile, &ProjectGraph, &WorkspaceConfig) -> Vec<String>;

pub const TOUCHED_NODE_LOCATORS: [TouchedNodeLocator; 4] = [
    get_touched_projects_by_files,
    get_implicitly_touched_projects,
    get_touched_npm_packages,
    get_touched_projects_in_workspace_config,
];

/// Run every locator and return the touched nodes, sorted and deduplicated.
pub fn locate_touched_nodes(
    file: &TouchedFile,
    graph: &ProjectGraph,
    config: &WorkspaceConfig,
) -> Vec<String> {
    let mut nodes = TOUCHED_NODE_LOCATORS
        .iter()
        .flat_map(|locator| locator(file, graph, config))
        .collect::<Vec<_>>();

    nodes.sort();
    nodes.dedup();
    nodes
}

/// The project that owns the file, either by its file list or, for files
/// that no longer exist, by the deepest project root containing it.
pub fn get_touched_projects_by_files(
    file: &TouchedFile,
    graph: &ProjectGraph,
    _config: &WorkspaceConfig,
) -> Vec<String> {
    graph
        .find_project_with_file(&file.file)
        .map(|node| vec![node.name.clone()])
        .unwrap_or_default()
}

/// Projects declared in the workspace-level `implicitDependencies` for the
/// file. Keys may be globs, and nested entries are matched against the
/// changed JSON fields.
pub fn get_implicitly_touched_projects(
    file: &TouchedFile,
    graph: &ProjectGraph,
    config: &WorkspaceConfig,
) -> Vec<String> {
    let all_projects = graph.get_workspace_project_names();
    let mut touched = vec![];

    for (pattern, entry) in &config.implicit_dependencies {
        if !matches_pattern(pattern, &file.file) {
            continue;
        }

        if file.is_whole_file_change() {
            touched.extend(entry.resolve_all(&all_projects));
        } else {
            for change in file.get_json_changes() {
                touched.extend(entry.resolve_path(&change.path, &all_projects));
            }
        }
    }

    touched
}

/// Nodes touched by a change to the root package manifest.
///
/// A whole-file change marks every npm node. A deleted dependency marks the
/// workspace projects that depended on it, or every workspace project when
/// none did, since the package node may already be gone from the graph. An
/// added or modified dependency marks only its npm node.
pub fn get_touched_npm_packages(
    file: &TouchedFile,
    graph: &ProjectGraph,
    _config: &WorkspaceConfig,
) -> Vec<String> {
    if file.file != ROOT_MANIFEST_FILENAME {
        return vec![];
    }

    if file.is_whole_file_change() {
        return graph
            .get_npm_nodes()
            .into_iter()
            .map(|node| node.name.clone())
            .collect();
    }

    let mut touched = vec![];

    for change in file.get_json_changes() {
        if !PackageManifest::SECTIONS
            .iter()
            .any(|section| change.is_under(section))
        {
            continue;
        }

        let Some(package) = change.path.get(1) else {
            if change.type_of == DiffType::Deleted {
                return graph.get_workspace_project_names();
            }

            // Section level modifications are also reported per package
            continue;
        };

        let node_name = format!("{NPM_NODE_PREFIX}{package}");

        match change.type_of {
            DiffType::Deleted => {
                let dependents = graph
                    .get_reverse_dependencies()
                    .get(node_name.as_str())
                    .map(|sources| {
                        sources
                            .iter()
                            .filter(|source| !source.starts_with(NPM_NODE_PREFIX))
                            .map(|source| source.to_string())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();

                trace!(
                    package = package.as_str(),
                    dependents = ?dependents,
                    "Dependency removed from manifest"
                );

                if dependents.is_empty() {
                    return graph.get_workspace_project_names();
                }

                touched.extend(dependents);

                if graph.nodes.contains_key(&node_name) {
                    touched.push(node_name);
                }
            }
            DiffType::Added | DiffType::Modified => {
                if graph.nodes.contains_key(&node_name) {
                    touched.push(node_name);
                }
            }
        };
    }

    touched
}

/// Projects whose declaration under `projects.<name>` changed. A removed
/// declaration, or a change that can't be broken down, marks every project.
pub fn get_touched_projects_in_workspace_config(
    file: &TouchedFile,
    graph: &ProjectGraph,
    _config: &WorkspaceConfig,
) -> Vec<String> {
    if file.file != CONFIG_WORKSPACE_FILENAME {
        return vec![];
    }

    if file.is_whole_file_change() {
        return graph.get_workspace_project_names();
    }

    let mut touched = vec![];

    for change in file.get_json_changes() {
        if !change.is_under("projects") {
            continue;
        }

        let Some(name) = change.path.get(1) else {
            continue;
        };

        if graph.nodes.contains_key(name) {
            touched.push(name.to_owned());
        } else {
            return graph.get_workspace_project_names();
        }
    }

    touched
}

fn matches_pattern(pattern: &str, file: &str) -> bool {
    if pattern == file {
        return true;
    }

    match glob::Pattern::new(pattern) {
        Ok(glob) => glob.matches(file),
        Err(error) => {
            warn!(
                pattern,
                "Invalid implicit dependency pattern, only exact matches are supported: {error}"
            );

            false
        }
    }
}
