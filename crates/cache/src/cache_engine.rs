use crate::cache_mode::{CacheMode, get_cache_mode};
use crate::task_cache::TaskCache;
use orbit_common::consts;
use starbase_utils::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CacheEngine {
    /// The cache directory, `.orbit/cache` relative to the workspace root
    /// unless configured otherwise. Contains the project graph snapshot
    /// and task results keyed by hash.
    pub cache_dir: PathBuf,

    pub workspace_root: PathBuf,
}

impl CacheEngine {
    pub fn new(workspace_root: &Path, cache_directory: Option<&str>) -> miette::Result<CacheEngine> {
        let dir = match cache_directory {
            Some(custom) => workspace_root.join(custom),
            None => workspace_root.join(consts::CONFIG_DIRNAME).join("cache"),
        };
        let cache_tag = dir.join("CACHEDIR.TAG");

        debug!(cache_dir = ?dir, "Creating cache engine");

        ensure_dir(&dir)?;

        // Create a cache directory tag
        if !cache_tag.exists() {
            fs::write_file(
                cache_tag,
                r#"Signature: 8a477f597d28d172789f06886806bc55
# This file is a cache directory tag created by orbit.
# For information see https://bford.info/cachedir"#,
            )?;
        }

        Ok(CacheEngine {
            cache_dir: dir,
            workspace_root: workspace_root.to_path_buf(),
        })
    }

    pub fn get_mode(&self) -> CacheMode {
        get_cache_mode()
    }

    pub fn is_readable(&self) -> bool {
        self.get_mode().is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.get_mode().is_writable()
    }

    pub fn create_task_cache(&self) -> TaskCache {
        TaskCache::new(&self.workspace_root, &self.cache_dir)
    }
}

/// Create the directory, tolerating another process creating it first.
pub fn ensure_dir(dir: &Path) -> miette::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(_) => Ok(()),
        Err(_) if dir.is_dir() => Ok(()),
        Err(error) => Err(error.into()),
    }
}
