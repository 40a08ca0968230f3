use orbit_graph_utils::walk;
use orbit_project_graph::ProjectGraph;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, trace};

/// Which workspace projects can reach which. Package nodes are left out,
/// since a path can never continue through an external package.
#[derive(Debug, Default)]
pub struct ReachabilityMatrix {
    adjacency: BTreeMap<String, Vec<String>>,
    reach: BTreeMap<String, BTreeSet<String>>,
}

impl ReachabilityMatrix {
    pub fn new(graph: &ProjectGraph) -> Self {
        let mut adjacency = BTreeMap::<String, Vec<String>>::new();

        for node in graph.get_workspace_projects() {
            let mut targets = graph
                .get_dependencies_of(&node.name)
                .iter()
                .filter(|edge| {
                    graph
                        .nodes
                        .get(&edge.target)
                        .is_some_and(|target| target.is_workspace_project())
                })
                .map(|edge| edge.target.clone())
                .collect::<Vec<_>>();

            targets.sort();
            targets.dedup();
            adjacency.insert(node.name.clone(), targets);
        }

        let reach = adjacency
            .iter()
            .map(|(name, targets)| {
                let reachable = walk(targets, |key| {
                    adjacency.get(key).cloned().unwrap_or_default()
                });

                (name.clone(), reachable)
            })
            .collect();

        Self { adjacency, reach }
    }

    /// True if a path of at least one edge leads from source to target.
    pub fn is_reachable(&self, source: &str, target: &str) -> bool {
        self.reach
            .get(source)
            .is_some_and(|reachable| reachable.contains(target))
    }

    /// Return the path `source -> ... -> target` when the two projects are on
    /// a cycle (each can reach the other), otherwise an empty list. A project
    /// is never circular with itself here, even when it sits on a cycle.
    pub fn find_circular_path(&self, source: &str, target: &str) -> Vec<String> {
        if source == target
            || !self.is_reachable(source, target)
            || !self.is_reachable(target, source)
        {
            return vec![];
        }

        self.find_path(source, target)
    }

    /// Return the shortest path from source to target, including both ends,
    /// or an empty list when there is none. Branches that can't reach the
    /// target are never expanded.
    pub fn find_path(&self, source: &str, target: &str) -> Vec<String> {
        if !self.is_reachable(source, target) {
            return vec![];
        }

        let mut parents = BTreeMap::<&str, &str>::new();
        let mut queue = VecDeque::from([source]);
        let mut visited = BTreeSet::from([source]);

        while let Some(current) = queue.pop_front() {
            for next in self.adjacency.get(current).into_iter().flatten() {
                if next == target {
                    let mut path = vec![target.to_owned(), current.to_owned()];
                    let mut step = current;

                    while let Some(&parent) = parents.get(step) {
                        path.push(parent.to_owned());
                        step = parent;
                    }

                    path.reverse();

                    return path;
                }

                if self.is_reachable(next, target) && visited.insert(next.as_str()) {
                    parents.insert(next.as_str(), current);
                    queue.push_back(next.as_str());
                }
            }
        }

        vec![]
    }
}

/// Holds the matrix of the most recently seen graph. Graphs are compared by
/// their structural fingerprint, so an equal graph reuses the matrix and a
/// changed graph rebuilds it.
#[derive(Debug, Default)]
pub struct ReachabilityCache {
    entry: Option<(String, ReachabilityMatrix)>,
}

impl ReachabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_fingerprint(&self) -> Option<&str> {
        self.entry.as_ref().map(|(fingerprint, _)| fingerprint.as_str())
    }

    pub fn get_matrix(&mut self, graph: &ProjectGraph) -> miette::Result<&ReachabilityMatrix> {
        let fingerprint = graph.fingerprint()?;

        if self
            .entry
            .as_ref()
            .is_some_and(|(cached, _)| *cached != fingerprint)
        {
            trace!("Project graph changed, discarding reachability matrix");

            self.entry = None;
        }

        let (_, matrix) = self.entry.get_or_insert_with(|| {
            debug!(
                fingerprint = fingerprint.as_str(),
                "Building reachability matrix"
            );

            let matrix = ReachabilityMatrix::new(graph);

            (fingerprint, matrix)
        });

        Ok(matrix)
    }
}
