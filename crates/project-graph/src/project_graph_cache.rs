use crate::project_graph::{ProjectFileMap, ProjectGraph};
use orbit_cache::{ensure_dir, get_cache_mode};
use orbit_common::color;
use orbit_hash::{FileData, files_changed};
use serde::{Deserialize, Serialize};
use starbase_utils::{fs, json};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};

pub const PROJECT_GRAPH_CACHE_VERSION: &str = "1";

/// Persisted snapshot of the most recently computed project graph.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGraphCache {
    pub version: String,

    /// Hashes of workspace level files that affect the entire graph.
    pub root_files: Vec<FileData>,

    #[serde(flatten)]
    pub graph: ProjectGraph,
}

impl ProjectGraphCache {
    pub fn new(root_files: Vec<FileData>, graph: ProjectGraph) -> Self {
        Self {
            version: PROJECT_GRAPH_CACHE_VERSION.into(),
            root_files,
            graph,
        }
    }

    pub fn into_graph(self) -> ProjectGraph {
        self.graph
    }
}

#[derive(Debug, Default)]
pub struct ProjectGraphCacheDiff {
    /// True when nothing changed and the cached graph can be used as-is.
    pub identical: bool,

    /// Projects whose files differ from the cache (every project when
    /// a full recompute is required).
    pub changed_projects: ProjectFileMap,

    /// The cached graph with outgoing edges of changed projects removed.
    /// Absent when a full recompute is required.
    pub partial_graph: Option<ProjectGraph>,
}

/// Compare the current workspace against a cached snapshot.
pub fn diff_against_cache(
    file_map: &ProjectFileMap,
    root_files: &[FileData],
    cache: ProjectGraphCache,
) -> ProjectGraphCacheDiff {
    let full_recompute = || ProjectGraphCacheDiff {
        identical: false,
        changed_projects: file_map.clone(),
        partial_graph: None,
    };

    if cache.version != PROJECT_GRAPH_CACHE_VERSION {
        debug!(
            version = cache.version,
            "Project graph cache version mismatch, recomputing entire graph"
        );

        return full_recompute();
    }

    if files_changed(&cache.root_files, root_files) {
        debug!("Workspace root files have changed, recomputing entire graph");

        return full_recompute();
    }

    let current_projects = file_map.keys().collect::<BTreeSet<_>>();
    let previous_projects = cache
        .graph
        .nodes
        .values()
        .filter(|node| node.is_workspace_project())
        .map(|node| &node.name)
        .collect::<BTreeSet<_>>();

    if current_projects != previous_projects {
        debug!("Workspace projects have changed, recomputing entire graph");

        return full_recompute();
    }

    let mut changed_projects = BTreeMap::new();

    for (name, files) in file_map {
        if cache
            .graph
            .nodes
            .get(name)
            .is_none_or(|node| files_changed(&node.data.files, files))
        {
            changed_projects.insert(name.to_owned(), files.to_owned());
        }
    }

    let mut graph = cache.graph;

    for name in changed_projects.keys() {
        graph.dependencies.remove(name);
    }

    trace!(
        changed = ?changed_projects.keys().collect::<Vec<_>>(),
        "Diffed project graph against cache"
    );

    ProjectGraphCacheDiff {
        identical: changed_projects.is_empty(),
        changed_projects,
        partial_graph: Some(graph),
    }
}

/// Reads and writes the project graph snapshot within the cache directory.
pub struct ProjectGraphCacheStore {
    pub cache_dir: PathBuf,
    pub path: PathBuf,
}

impl ProjectGraphCacheStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            path: cache_dir.join("projectGraph.json"),
        }
    }

    #[instrument(skip(self))]
    pub fn read(&self) -> miette::Result<Option<ProjectGraphCache>> {
        ensure_dir(&self.cache_dir)?;

        if !get_cache_mode().is_readable() {
            trace!(cache = ?self.path, "Cache is not readable, skipping project graph");

            return Ok(None);
        }

        if !self.path.exists() {
            debug!(cache = ?self.path, "Cache miss, no project graph snapshot");

            return Ok(None);
        }

        let cache: ProjectGraphCache = match json::read_file(&self.path) {
            Ok(cache) => cache,
            Err(error) => {
                warn!(
                    cache = ?self.path,
                    "Unable to read the project graph cache, continuing without it: {}",
                    color::muted_light(error.to_string()),
                );

                return Ok(None);
            }
        };

        if cache.version != PROJECT_GRAPH_CACHE_VERSION {
            debug!(
                cache = ?self.path,
                version = cache.version,
                "Ignoring project graph cache with an unsupported version"
            );

            return Ok(None);
        }

        Ok(Some(cache))
    }

    /// Write the snapshot to a temporary file, then move it into place, so that
    /// concurrent readers never observe a partially written file.
    #[instrument(skip_all)]
    pub fn write(&self, cache: &ProjectGraphCache) -> miette::Result<()> {
        if !get_cache_mode().is_writable() {
            trace!(cache = ?self.path, "Cache is not writeable, skipping project graph");

            return Ok(());
        }

        ensure_dir(&self.cache_dir)?;

        let temp_path = self
            .cache_dir
            .join(format!("projectGraph.json.{}.tmp", std::process::id()));

        debug!(cache = ?self.path, "Writing project graph cache");

        json::write_file(&temp_path, cache, false)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
