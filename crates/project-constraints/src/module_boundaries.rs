use crate::constraints::*;
use crate::project_constraints_error::ProjectConstraintsError;
use crate::reachability::ReachabilityCache;
use orbit_config::DepConstraint;
use orbit_project_graph::{DependencyType, ProjectGraph};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Check every dependency between workspace projects and return each
/// violation found. Checked per dependency, in order: circular paths,
/// libraries depending on applications, tag constraints, and static imports
/// of libraries that are also lazy loaded.
///
/// A dependency made only of dynamic edges is exempt from tag constraints.
#[instrument(skip_all)]
pub fn enforce_module_boundaries(
    graph: &ProjectGraph,
    constraints: &[DepConstraint],
    cache: &mut ReachabilityCache,
) -> miette::Result<Vec<ProjectConstraintsError>> {
    let mut violations = vec![];

    // One matrix for the whole pass
    let matrix = cache.get_matrix(graph)?;

    for (source_name, edges) in &graph.dependencies {
        let Some(source) = graph.nodes.get(source_name) else {
            continue;
        };

        if !source.is_workspace_project() {
            continue;
        }

        let mut edge_types = BTreeMap::<&str, Vec<DependencyType>>::new();

        for edge in edges {
            edge_types
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.type_of);
        }

        for (target_name, types) in edge_types {
            let Some(target) = graph.nodes.get(target_name) else {
                continue;
            };

            if !target.is_workspace_project() || target_name == source_name {
                continue;
            }

            // Adding this edge closed a cycle if the target leads back to the source
            let cycle = matrix.find_circular_path(target_name, source_name);

            if !cycle.is_empty() {
                let mut path = vec![source_name.as_str()];
                path.extend(cycle.iter().map(|name| name.as_str()));

                violations.push(ProjectConstraintsError::CircularDependency {
                    source_id: source_name.clone(),
                    dep_id: target_name.to_owned(),
                    path: path.join(" -> "),
                });
            }

            if let Err(error) = enforce_project_type_relationships(source, target) {
                violations.push(error);
            }

            let dynamic_only = types.iter().all(|type_of| *type_of == DependencyType::Dynamic);

            if !dynamic_only {
                for constraint in find_constraints_for(source, constraints) {
                    if let Err(error) = enforce_tag_relationships(source, constraint, target) {
                        violations.push(error);
                    }
                }
            }

            if types.contains(&DependencyType::Static)
                && only_load_children(graph, source_name, target_name)
            {
                violations.push(ProjectConstraintsError::StaticImportOfLazyLibrary {
                    source_id: source_name.clone(),
                    dep_id: target_name.to_owned(),
                });
            }
        }
    }

    debug!(violations = violations.len(), "Enforced module boundaries");

    Ok(violations)
}
