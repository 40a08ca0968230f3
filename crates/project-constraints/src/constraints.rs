use crate::project_constraints_error::ProjectConstraintsError;
use orbit_config::DepConstraint;
use orbit_project_graph::{DependencyType, ProjectGraph, ProjectGraphNode, ProjectGraphNodeType};
use std::collections::BTreeSet;

pub const ANY_TAG: &str = "*";

/// Constraints that apply to the node, based on its tags.
pub fn find_constraints_for<'c>(
    node: &ProjectGraphNode,
    constraints: &'c [DepConstraint],
) -> Vec<&'c DepConstraint> {
    constraints
        .iter()
        .filter(|constraint| node.has_tag(&constraint.source_tag))
        .collect()
}

/// True if the node carries none of the tags. A `*` tag matches everything.
pub fn has_none_of_these_tags<T: AsRef<str>>(node: &ProjectGraphNode, tags: &[T]) -> bool {
    !tags.iter().any(|tag| {
        let tag = tag.as_ref();

        tag == ANY_TAG || node.has_tag(tag)
    })
}

/// True if any constraint of the source rejects the target.
pub fn violates_constraint(
    constraints: &[DepConstraint],
    source: &ProjectGraphNode,
    target: &ProjectGraphNode,
) -> bool {
    find_constraints_for(source, constraints)
        .iter()
        .any(|constraint| has_none_of_these_tags(target, &constraint.only_depend_on_libs_with_tags))
}

/// True if the target can be reached from the source by following
/// dynamic edges only.
pub fn only_load_children(graph: &ProjectGraph, source: &str, target: &str) -> bool {
    let mut visited = BTreeSet::new();
    let mut stack = vec![source];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }

        for edge in graph.get_dependencies_of(current) {
            if edge.type_of != DependencyType::Dynamic {
                continue;
            }

            if edge.target == target {
                return true;
            }

            stack.push(edge.target.as_str());
        }
    }

    false
}

pub fn enforce_project_type_relationships(
    source: &ProjectGraphNode,
    dependency: &ProjectGraphNode,
) -> Result<(), ProjectConstraintsError> {
    if source.type_of == ProjectGraphNodeType::Lib && dependency.type_of == ProjectGraphNodeType::App
    {
        return Err(ProjectConstraintsError::InvalidTypeRelationship {
            source_id: source.name.clone(),
            source_type: source.type_of,
            dep_id: dependency.name.clone(),
            dep_type: dependency.type_of,
            allowed: [ProjectGraphNodeType::Lib, ProjectGraphNodeType::Npm]
                .iter()
                .map(|type_of| type_of.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    Ok(())
}

pub fn enforce_tag_relationships(
    source: &ProjectGraphNode,
    constraint: &DepConstraint,
    dependency: &ProjectGraphNode,
) -> Result<(), ProjectConstraintsError> {
    // Source project isn't using the source tag
    if constraint.source_tag.is_empty() || !source.has_tag(&constraint.source_tag) {
        return Ok(());
    }

    if !has_none_of_these_tags(dependency, &constraint.only_depend_on_libs_with_tags) {
        return Ok(());
    }

    Err(ProjectConstraintsError::InvalidTagRelationship {
        source_id: source.name.clone(),
        source_tag: constraint.source_tag.clone(),
        dep_id: dependency.name.clone(),
        allowed: constraint
            .only_depend_on_libs_with_tags
            .iter()
            .map(|tag| format!("#{tag}"))
            .collect::<Vec<_>>()
            .join(", "),
    })
}
