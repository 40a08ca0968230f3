use crate::affected::*;
use crate::locators::locate_touched_nodes;
use crate::touched_file::TouchedFile;
use orbit_config::WorkspaceConfig;
use orbit_project_graph::ProjectGraph;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, trace};

pub struct AffectedTracker<'app> {
    config: &'app WorkspaceConfig,
    project_graph: &'app ProjectGraph,
    touched_files: &'app [TouchedFile],

    projects: BTreeMap<String, Vec<AffectedBy>>,
    project_downstream: DownstreamScope,
    project_upstream: UpstreamScope,

    dependencies: BTreeMap<&'app str, Vec<&'app str>>,
    dependents: BTreeMap<&'app str, Vec<&'app str>>,
}

impl<'app> AffectedTracker<'app> {
    pub fn new(
        project_graph: &'app ProjectGraph,
        config: &'app WorkspaceConfig,
        touched_files: &'app [TouchedFile],
    ) -> Self {
        debug!("Creating affected tracker");

        let dependencies = project_graph
            .dependencies
            .iter()
            .map(|(source, edges)| {
                (
                    source.as_str(),
                    edges.iter().map(|edge| edge.target.as_str()).collect(),
                )
            })
            .collect();

        Self {
            config,
            project_graph,
            touched_files,
            projects: BTreeMap::new(),
            project_downstream: DownstreamScope::Deep,
            project_upstream: UpstreamScope::None,
            dependencies,
            dependents: project_graph.get_reverse_dependencies(),
        }
    }

    pub fn build(self) -> Affected {
        let mut affected = Affected::default();

        for (name, list) in self.projects {
            affected
                .projects
                .insert(name, AffectedProjectState::from(list));
        }

        affected
    }

    pub fn with_project_scopes(
        &mut self,
        upstream_scope: UpstreamScope,
        downstream_scope: DownstreamScope,
    ) -> &mut Self {
        debug!(
            upstream = ?upstream_scope,
            downstream = ?downstream_scope,
            "Setting project scopes"
        );

        self.project_upstream = upstream_scope;
        self.project_downstream = downstream_scope;
        self
    }

    /// Map touched files to seed nodes, then mark everything with a path
    /// into a seed, and optionally everything a seed depends on.
    #[instrument(skip_all)]
    pub fn track_projects(&mut self) -> &mut Self {
        debug!(
            files = self.touched_files.len(),
            "Tracking projects and marking any affected"
        );

        let mut seeds = BTreeSet::new();

        for touched in self.touched_files {
            for name in locate_touched_nodes(touched, self.project_graph, self.config) {
                self.mark_project_affected(&name, AffectedBy::TouchedFile(touched.file.clone()));
                seeds.insert(name);
            }
        }

        for name in &seeds {
            self.track_project_dependents(name);
            self.track_project_dependencies(name);
        }

        self
    }

    fn track_project_dependencies(&mut self, name: &str) {
        if self.project_upstream == UpstreamScope::None {
            return;
        }

        for (project, by) in walk_neighbors(
            name,
            self.project_upstream == UpstreamScope::Deep,
            &self.dependencies,
            AffectedBy::DownstreamProject,
        ) {
            self.mark_project_affected(&project, by);
        }
    }

    fn track_project_dependents(&mut self, name: &str) {
        if self.project_downstream == DownstreamScope::None {
            return;
        }

        for (project, by) in walk_neighbors(
            name,
            self.project_downstream == DownstreamScope::Deep,
            &self.dependents,
            AffectedBy::UpstreamProject,
        ) {
            self.mark_project_affected(&project, by);
        }
    }

    fn mark_project_affected(&mut self, name: &str, affected: AffectedBy) {
        trace!(project = name, by = ?affected, "Marking project as affected");

        let list = self.projects.entry(name.to_owned()).or_default();

        if !list.contains(&affected) {
            list.push(affected);
        }
    }
}

// Explicit stack so that deep chains can't overflow
fn walk_neighbors(
    root: &str,
    deep: bool,
    neighbors: &BTreeMap<&str, Vec<&str>>,
    by: fn(String) -> AffectedBy,
) -> Vec<(String, AffectedBy)> {
    let mut marked = vec![];
    let mut visited = BTreeSet::new();
    let mut stack = vec![root.to_owned()];

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }

        for next in neighbors.get(current.as_str()).into_iter().flatten() {
            marked.push((next.to_string(), by(current.clone())));

            if deep {
                stack.push(next.to_string());
            }
        }
    }

    marked
}

/// Return every node affected by the touched files: the seed nodes they map
/// to, plus every node with a path into a seed.
pub fn get_affected_nodes(
    project_graph: &ProjectGraph,
    config: &WorkspaceConfig,
    touched_files: &[TouchedFile],
) -> BTreeSet<String> {
    let mut tracker = AffectedTracker::new(project_graph, config, touched_files);
    tracker.track_projects();
    tracker.build().get_project_names()
}
