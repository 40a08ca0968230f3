use crate::workspace_mocker::WorkspaceMocker;
use orbit_common::consts::NPM_NODE_PREFIX;
use orbit_hash::FileData;
use orbit_project_graph::*;

pub use orbit_project_graph::ProjectGraph;

/// Create a node without touching a workspace. Names prefixed with `npm:`
/// become package nodes, everything else is rooted at `libs/<name>` with
/// a single index file.
pub fn create_node(name: &str, type_of: ProjectGraphNodeType) -> ProjectGraphNode {
    if let Some(package) = name.strip_prefix(NPM_NODE_PREFIX) {
        return ProjectGraphNode::new_npm(package, Some("1.0.0".into()));
    }

    let root = format!("libs/{name}");

    ProjectGraphNode {
        name: name.into(),
        type_of,
        data: ProjectGraphNodeData {
            files: vec![FileData::new(format!("{root}/src/index.ts"), name)],
            root: Some(root),
            ..Default::default()
        },
    }
}

/// Create a graph from node names and typed edges. Names in the edge list
/// that weren't declared are added as libraries.
pub fn create_graph_stub(
    nodes: &[(&str, ProjectGraphNodeType)],
    edges: &[(&str, &str, DependencyType)],
) -> ProjectGraph {
    let mut graph = ProjectGraph::default();

    for (name, type_of) in nodes {
        graph.add_node(create_node(name, *type_of));
    }

    for (source, target, type_of) in edges {
        for name in [source, target] {
            if !graph.nodes.contains_key(*name) {
                graph.add_node(create_node(name, ProjectGraphNodeType::Lib));
            }
        }

        graph.add_dependency(source, target, *type_of);
    }

    graph
}

/// Create a graph of libraries connected by static edges.
pub fn create_static_graph_stub(edges: &[(&str, &str)]) -> ProjectGraph {
    create_graph_stub(
        &[],
        &edges
            .iter()
            .map(|(source, target)| (*source, *target, DependencyType::Static))
            .collect::<Vec<_>>(),
    )
}

pub fn set_node_tags(graph: &mut ProjectGraph, name: &str, tags: &[&str]) {
    if let Some(node) = graph.nodes.get_mut(name) {
        node.data.tags = tags.iter().map(|tag| tag.to_string()).collect();
    }
}

pub fn generate_project_graph() -> ProjectGraph {
    let mut mock = WorkspaceMocker::new();
    mock.with_default_projects();
    mock.build_project_graph()
}
