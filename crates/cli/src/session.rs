use crate::helpers::find_workspace_root;
use orbit_cache::CacheEngine;
use orbit_common::DiskFs;
use orbit_config::{WorkspaceConfig, assert_workspace_validity};
use orbit_project_graph::{ProjectGraph, ProjectGraphCacheStore, create_project_graph};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// State shared by every command: where the workspace lives and its
/// validated configuration.
pub struct OrbitSession {
    pub fs: DiskFs,
    pub working_dir: PathBuf,
    pub workspace_config: WorkspaceConfig,
    pub workspace_root: PathBuf,
}

impl OrbitSession {
    #[instrument]
    pub fn load(working_dir: &Path) -> miette::Result<Self> {
        let workspace_root = find_workspace_root(working_dir)?;

        debug!(workspace_root = ?workspace_root, "Found workspace root");

        let fs = DiskFs::new(&workspace_root);
        let workspace_config = WorkspaceConfig::load_from(&fs)?;

        assert_workspace_validity(&workspace_config, &fs)?;

        Ok(Self {
            fs,
            working_dir: working_dir.to_path_buf(),
            workspace_config,
            workspace_root,
        })
    }

    pub fn get_cache_engine(&self) -> miette::Result<CacheEngine> {
        CacheEngine::new(
            &self.workspace_root,
            self.workspace_config
                .tasks_runner_options
                .cache_directory
                .as_deref(),
        )
    }

    /// Build the project graph, reusing the snapshot from the previous
    /// invocation for projects that didn't change.
    pub fn get_project_graph(&self) -> miette::Result<ProjectGraph> {
        let engine = self.get_cache_engine()?;
        let store = ProjectGraphCacheStore::new(&engine.cache_dir);

        create_project_graph(&self.workspace_config, &self.fs, &store)
    }
}
