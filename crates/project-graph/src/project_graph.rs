use crate::project_graph_error::ProjectGraphError;
use orbit_common::consts::NPM_NODE_PREFIX;
use orbit_common::path::{is_within_dir, remove_ext};
use orbit_config::{ProjectType, TargetConfig};
use orbit_graph_utils::{GraphConnections, GraphToDot};
use orbit_hash::{ContentHasher, FileData};
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Files of each workspace project, keyed by project name.
pub type ProjectFileMap = BTreeMap<String, Vec<FileData>>;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectGraphNodeType {
    App,
    Lib,
    Npm,
}

impl From<ProjectType> for ProjectGraphNodeType {
    fn from(value: ProjectType) -> Self {
        match value {
            ProjectType::Application => Self::App,
            ProjectType::Library => Self::Lib,
        }
    }
}

impl fmt::Display for ProjectGraphNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::App => "app",
                Self::Lib => "lib",
                Self::Npm => "npm",
            }
        )
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// Compile-time import.
    Static,
    /// Lazily loaded import.
    Dynamic,
    /// Declared in configuration.
    Implicit,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Static => "static",
                Self::Dynamic => "dynamic",
                Self::Implicit => "implicit",
            }
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectGraphNodeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    pub files: Vec<FileData>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, TargetConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProjectGraphNode {
    pub name: String,

    #[serde(rename = "type")]
    pub type_of: ProjectGraphNodeType,

    pub data: ProjectGraphNodeData,
}

impl ProjectGraphNode {
    pub fn new_npm(package_name: &str, version: Option<String>) -> Self {
        Self {
            name: format!("{NPM_NODE_PREFIX}{package_name}"),
            type_of: ProjectGraphNodeType::Npm,
            data: ProjectGraphNodeData {
                package_name: Some(package_name.to_owned()),
                version,
                ..Default::default()
            },
        }
    }

    pub fn is_workspace_project(&self) -> bool {
        !self.is_npm()
    }

    pub fn is_npm(&self) -> bool {
        matches!(self.type_of, ProjectGraphNodeType::Npm)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.data.tags.contains(tag)
    }

    /// Return true if the node owns the file. Extensions are ignored
    /// so that a file renamed across extensions still matches.
    pub fn contains_file(&self, file: &str) -> bool {
        let target = remove_ext(file);

        self.data
            .files
            .iter()
            .any(|data| data.file == file || remove_ext(&data.file) == target)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProjectGraphDependency {
    pub source: String,
    pub target: String,

    #[serde(rename = "type")]
    pub type_of: DependencyType,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ProjectGraph {
    pub nodes: BTreeMap<String, ProjectGraphNode>,

    /// Outgoing edges grouped by source node, sorted and deduplicated.
    pub dependencies: BTreeMap<String, Vec<ProjectGraphDependency>>,
}

impl ProjectGraph {
    pub fn add_node(&mut self, node: ProjectGraphNode) {
        if node.is_workspace_project() {
            self.dependencies.entry(node.name.clone()).or_default();
        }

        self.nodes.insert(node.name.clone(), node);
    }

    /// Add an edge, keeping the source's edge list sorted and free of duplicates.
    pub fn add_dependency(&mut self, source: &str, target: &str, type_of: DependencyType) {
        let edge = ProjectGraphDependency {
            source: source.to_owned(),
            target: target.to_owned(),
            type_of,
        };
        let edges = self.dependencies.entry(source.to_owned()).or_default();

        if let Err(index) = edges.binary_search(&edge) {
            edges.insert(index, edge);
        }
    }

    pub fn get_node(&self, name: &str) -> miette::Result<&ProjectGraphNode> {
        self.nodes.get(name).ok_or_else(|| {
            ProjectGraphError::UnknownProject {
                name: name.to_owned(),
            }
            .into()
        })
    }

    pub fn get_dependencies_of(&self, name: &str) -> &[ProjectGraphDependency] {
        self.dependencies
            .get(name)
            .map(|edges| edges.as_slice())
            .unwrap_or_default()
    }

    pub fn get_workspace_projects(&self) -> Vec<&ProjectGraphNode> {
        self.nodes
            .values()
            .filter(|node| node.is_workspace_project())
            .collect()
    }

    pub fn get_workspace_project_names(&self) -> Vec<String> {
        self.get_workspace_projects()
            .into_iter()
            .map(|node| node.name.clone())
            .collect()
    }

    pub fn get_npm_nodes(&self) -> Vec<&ProjectGraphNode> {
        self.nodes.values().filter(|node| node.is_npm()).collect()
    }

    /// Find the workspace project that owns the file, first by file list,
    /// then by the deepest project root that contains it.
    pub fn find_project_with_file(&self, file: &str) -> Option<&ProjectGraphNode> {
        let projects = self.get_workspace_projects();

        projects
            .iter()
            .find(|node| node.contains_file(file))
            .or_else(|| {
                projects
                    .iter()
                    .filter(|node| {
                        node.data
                            .root
                            .as_ref()
                            .is_some_and(|root| !root.is_empty() && is_within_dir(file, root))
                    })
                    .max_by_key(|node| node.data.root.as_ref().map(|root| root.len()))
            })
            .copied()
    }

    /// Return a map of every node to the nodes with an edge into it.
    pub fn get_reverse_dependencies(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut reverse = BTreeMap::<&str, Vec<&str>>::new();

        for edge in self.dependencies.values().flatten() {
            reverse
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
        }

        reverse
    }

    /// Return edge targets that have no node in the graph.
    pub fn get_missing_targets(&self) -> BTreeSet<String> {
        self.dependencies
            .values()
            .flatten()
            .filter(|edge| !self.nodes.contains_key(&edge.target))
            .map(|edge| edge.target.clone())
            .collect()
    }

    /// Hash the structure of the graph (node names, types, and edges).
    /// Graphs with equal structure produce equal fingerprints.
    pub fn fingerprint(&self) -> miette::Result<String> {
        let mut hasher = ContentHasher::new("project-graph");

        hasher.hash_content(
            self.nodes
                .values()
                .map(|node| (&node.name, node.type_of))
                .collect::<Vec<_>>(),
        )?;
        hasher.hash_content(&self.dependencies)?;

        hasher.generate_hash()
    }
}

impl GraphConnections<String> for ProjectGraph {
    fn dependencies_of(&self, key: &String) -> Vec<String> {
        self.get_dependencies_of(key)
            .iter()
            .map(|edge| edge.target.clone())
            .collect()
    }

    fn dependents_of(&self, key: &String) -> Vec<String> {
        self.dependencies
            .values()
            .flatten()
            .filter(|edge| &edge.target == key)
            .map(|edge| edge.source.clone())
            .collect()
    }

    fn get_node_keys(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }
}

impl GraphToDot<String, DependencyType> for ProjectGraph {
    fn to_labelled_graph(&self) -> DiGraph<String, DependencyType> {
        let mut graph = DiGraph::new();
        let mut indexes = BTreeMap::new();

        for name in self.nodes.keys() {
            indexes.insert(name.as_str(), graph.add_node(name.clone()));
        }

        for edge in self.dependencies.values().flatten() {
            if let (Some(source), Some(target)) = (
                indexes.get(edge.source.as_str()),
                indexes.get(edge.target.as_str()),
            ) {
                graph.add_edge(*source, *target, edge.type_of);
            }
        }

        graph
    }

    fn get_edge_style(&self, edge: &DependencyType) -> &'static str {
        match edge {
            DependencyType::Static => "solid",
            DependencyType::Dynamic => "dashed",
            DependencyType::Implicit => "dotted",
        }
    }

    fn get_node_color(&self, node: &String) -> &'static str {
        match self.nodes.get(node).map(|node| node.type_of) {
            Some(ProjectGraphNodeType::App) => "palegreen",
            Some(ProjectGraphNodeType::Npm) => "lightblue",
            _ => "gray",
        }
    }
}
