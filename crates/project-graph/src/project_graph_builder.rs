use crate::import_scanner::{is_scannable_file, scan_imports};
use crate::project_graph::*;
use crate::project_graph_cache::{ProjectGraphCache, ProjectGraphCacheStore, diff_against_cache};
use crate::project_graph_error::ProjectGraphError;
use crate::target_project_locator::TargetProjectLocator;
use miette::IntoDiagnostic;
use orbit_common::consts::{
    CONFIG_WORKSPACE_FILENAME, NPM_NODE_PREFIX, ROOT_MANIFEST_FILENAME, TSCONFIG_BASE_FILENAME,
};
use orbit_common::{ReadFs, color};
use orbit_config::WorkspaceConfig;
use orbit_hash::FileData;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, trace, warn};

/// Workspace level files whose contents affect the entire graph.
pub const ROOT_FILES: [&str; 3] = [
    ROOT_MANIFEST_FILENAME,
    CONFIG_WORKSPACE_FILENAME,
    TSCONFIG_BASE_FILENAME,
];

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageManifest {
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    pub peer_dependencies: BTreeMap<String, String>,
    pub optional_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    pub const SECTIONS: [&str; 4] = [
        "dependencies",
        "devDependencies",
        "peerDependencies",
        "optionalDependencies",
    ];

    /// All declared packages and their versions. Earlier sections win.
    pub fn get_packages(&self) -> BTreeMap<&str, &str> {
        let mut packages = BTreeMap::new();

        for section in [
            &self.dependencies,
            &self.dev_dependencies,
            &self.peer_dependencies,
            &self.optional_dependencies,
        ] {
            for (name, version) in section {
                packages.entry(name.as_str()).or_insert(version.as_str());
            }
        }

        packages
    }
}

pub struct ProjectGraphBuilder<'ws> {
    config: &'ws WorkspaceConfig,
    fs: &'ws dyn ReadFs,
}

impl<'ws> ProjectGraphBuilder<'ws> {
    pub fn new(config: &'ws WorkspaceConfig, fs: &'ws dyn ReadFs) -> Self {
        Self { config, fs }
    }

    /// Hash the files of every project. A file within nested project roots
    /// belongs to the deepest project only.
    #[instrument(skip_all)]
    pub fn create_file_map(&self) -> miette::Result<ProjectFileMap> {
        let mut projects = self.config.projects.iter().collect::<Vec<_>>();
        projects.sort_by(|a, d| d.1.root.len().cmp(&a.1.root.len()));

        let mut seen = BTreeSet::new();
        let mut file_map = ProjectFileMap::new();

        for (name, project) in projects {
            if project.root.is_empty() || !self.fs.exists(&project.root) {
                return Err(ProjectGraphError::MissingProjectRoot {
                    project: name.to_owned(),
                    root: project.root.clone(),
                }
                .into());
            }

            let mut files = vec![];

            for file in self.fs.list(&project.root)? {
                if !seen.insert(file.clone()) {
                    continue;
                }

                match self.fs.read(&file) {
                    Ok(contents) => files.push(FileData::from_contents(file, &contents)),
                    Err(error) => {
                        warn!(
                            project = name,
                            "Unable to hash file {}, it will be excluded from the graph: {}",
                            color::file(&file),
                            color::muted_light(error.to_string()),
                        );
                    }
                }
            }

            files.sort();
            file_map.insert(name.to_owned(), files);
        }

        Ok(file_map)
    }

    pub fn hash_root_files(&self) -> miette::Result<Vec<FileData>> {
        let mut files = vec![];

        for file in ROOT_FILES {
            if self.fs.exists(file) {
                files.push(FileData::from_contents(file, &self.fs.read(file)?));
            }
        }

        Ok(files)
    }

    /// Read the root package manifest, treating a malformed manifest as empty.
    pub fn load_manifest(&self) -> PackageManifest {
        if !self.fs.exists(ROOT_MANIFEST_FILENAME) {
            return PackageManifest::default();
        }

        let result = self
            .fs
            .read_to_string(ROOT_MANIFEST_FILENAME)
            .and_then(|contents| serde_json::from_str::<PackageManifest>(&contents).into_diagnostic());

        match result {
            Ok(manifest) => manifest,
            Err(error) => {
                warn!(
                    "Unable to parse {}, npm packages will not be included in the graph: {}",
                    color::file(ROOT_MANIFEST_FILENAME),
                    color::muted_light(error.to_string()),
                );

                PackageManifest::default()
            }
        }
    }

    pub fn build(&self, prior: Option<ProjectGraphCache>) -> miette::Result<ProjectGraph> {
        Ok(self.build_snapshot(prior)?.into_graph())
    }

    /// Build the graph, reusing edges from a prior snapshot for projects
    /// whose files have not changed. The result is identical to a full build.
    #[instrument(skip_all)]
    pub fn build_snapshot(
        &self,
        prior: Option<ProjectGraphCache>,
    ) -> miette::Result<ProjectGraphCache> {
        let file_map = self.create_file_map()?;
        let root_files = self.hash_root_files()?;

        let (changed_projects, reusable) = match prior {
            Some(cache) => {
                let diff = diff_against_cache(&file_map, &root_files, cache);

                match diff.partial_graph {
                    Some(partial) => (
                        diff.changed_projects.into_keys().collect::<BTreeSet<_>>(),
                        partial.dependencies,
                    ),
                    None => (file_map.keys().cloned().collect(), BTreeMap::new()),
                }
            }
            None => (file_map.keys().cloned().collect(), BTreeMap::new()),
        };

        debug!(
            projects = file_map.len(),
            changed = changed_projects.len(),
            "Building project graph"
        );

        let mut graph = ProjectGraph::default();

        for (name, files) in file_map {
            let project = &self.config.projects[&name];

            graph.add_node(ProjectGraphNode {
                type_of: project.project_type.into(),
                data: ProjectGraphNodeData {
                    root: Some(project.root.clone()),
                    files,
                    tags: project.tags.iter().cloned().collect(),
                    targets: project.targets.clone(),
                    ..Default::default()
                },
                name,
            });
        }

        let manifest = self.load_manifest();

        for (package_name, version) in manifest.get_packages() {
            graph.add_node(ProjectGraphNode::new_npm(
                package_name,
                Some(version.to_owned()),
            ));
        }

        let edges = {
            let locator = TargetProjectLocator::new(graph.nodes.values(), &self.config.paths);
            let mut edges = vec![];

            for project in graph.get_workspace_projects() {
                if !changed_projects.contains(&project.name)
                    && let Some(cached) = reusable.get(&project.name)
                {
                    trace!(project = project.name, "Reusing cached dependencies");

                    edges.extend(
                        cached
                            .iter()
                            .filter(|edge| edge.type_of != DependencyType::Implicit)
                            .cloned(),
                    );

                    continue;
                }

                edges.extend(self.scan_project(project, &locator));
            }

            edges
        };

        for edge in edges {
            graph.add_dependency(&edge.source, &edge.target, edge.type_of);
        }

        for (name, project) in &self.config.projects {
            for dep in &project.implicit_dependencies {
                if dep != name {
                    graph.add_dependency(name, dep, DependencyType::Implicit);
                }
            }
        }

        // Materialize packages that are imported but not declared in the manifest
        for target in graph.get_missing_targets() {
            if let Some(package_name) = target.strip_prefix(NPM_NODE_PREFIX) {
                graph.add_node(ProjectGraphNode::new_npm(package_name, None));
            }
        }

        Ok(ProjectGraphCache::new(root_files, graph))
    }

    /// Scan every script file of a project and resolve its imports to edges.
    /// Files that can't be read contribute no edges.
    fn scan_project(
        &self,
        project: &ProjectGraphNode,
        locator: &TargetProjectLocator,
    ) -> Vec<ProjectGraphDependency> {
        let mut edges = vec![];

        for data in &project.data.files {
            if !is_scannable_file(&data.file) {
                continue;
            }

            let contents = match self.fs.read_to_string(&data.file) {
                Ok(contents) => contents,
                Err(error) => {
                    warn!(
                        project = project.name,
                        "Unable to scan {} for imports: {}",
                        color::file(&data.file),
                        color::muted_light(error.to_string()),
                    );

                    continue;
                }
            };

            for import in scan_imports(&contents) {
                let Some(target) = locator.find_project_with_import(&import.specifier, &data.file)
                else {
                    continue;
                };

                if target != project.name {
                    edges.push(ProjectGraphDependency {
                        source: project.name.clone(),
                        target,
                        type_of: import.type_of,
                    });
                }
            }
        }

        edges
    }
}

/// Build the project graph using the cached snapshot when available,
/// and persist the new snapshot. Cache failures are not fatal.
#[instrument(skip_all)]
pub fn create_project_graph(
    config: &WorkspaceConfig,
    fs: &dyn ReadFs,
    store: &ProjectGraphCacheStore,
) -> miette::Result<ProjectGraph> {
    let prior = match store.read() {
        Ok(prior) => prior,
        Err(error) => {
            warn!(
                "Unable to read the project graph cache: {}",
                color::muted_light(error.to_string())
            );

            None
        }
    };

    let snapshot = ProjectGraphBuilder::new(config, fs).build_snapshot(prior)?;

    if let Err(error) = store.write(&snapshot) {
        warn!(
            "Unable to write the project graph cache: {}",
            color::muted_light(error.to_string())
        );
    }

    Ok(snapshot.into_graph())
}
