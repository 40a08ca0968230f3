use crate::command_builder::TaskPlan;
use orbit_cache::{CachedResult, RemoteCache, TaskCache, get_cache_mode};
use orbit_common::color;
use tracing::{debug, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HydrateFrom {
    LocalCache,
    RemoteCache,
}

/// Looks up a recorded result for a task, first locally and then remotely,
/// and restores its outputs into the workspace.
pub struct OutputHydrater<'task> {
    pub cache: &'task TaskCache,
    pub remote: Option<&'task dyn RemoteCache>,
    pub plan: &'task TaskPlan,

    /// Problems that were demoted to a cache miss.
    pub warnings: Vec<String>,
}

impl<'task> OutputHydrater<'task> {
    pub fn new(
        cache: &'task TaskCache,
        remote: Option<&'task dyn RemoteCache>,
        plan: &'task TaskPlan,
    ) -> Self {
        Self {
            cache,
            remote,
            plan,
            warnings: vec![],
        }
    }

    #[instrument(skip(self))]
    pub async fn hydrate(&mut self, hash: &str) -> Option<(CachedResult, HydrateFrom)> {
        if let Some(result) = self.read_local(hash) {
            self.restore_outputs(hash);

            return Some((result, HydrateFrom::LocalCache));
        }

        if self.retrieve_remote(hash).await
            && let Some(result) = self.read_local(hash)
        {
            self.restore_outputs(hash);

            return Some((result, HydrateFrom::RemoteCache));
        }

        None
    }

    fn read_local(&mut self, hash: &str) -> Option<CachedResult> {
        match self.cache.get(hash) {
            Ok(result) => result,
            Err(error) => {
                self.warn(hash, "Failed to read local cache entry", error.to_string());
                None
            }
        }
    }

    async fn retrieve_remote(&mut self, hash: &str) -> bool {
        let Some(remote) = self.remote else {
            return false;
        };

        if !get_cache_mode().is_readable() {
            return false;
        }

        match remote.retrieve(hash, &self.cache.cache_dir).await {
            Ok(found) => {
                debug!(
                    task_target = self.plan.task.id.as_str(),
                    hash, found, "Checked remote cache"
                );

                found
            }
            Err(error) => {
                self.warn(hash, "Failed to retrieve from remote cache", error.to_string());
                false
            }
        }
    }

    fn restore_outputs(&mut self, hash: &str) {
        if self.plan.outputs.is_empty() {
            return;
        }

        debug!(
            task_target = self.plan.task.id.as_str(),
            hash, "Hydrating cached outputs into workspace"
        );

        if let Err(error) = self.cache.restore_outputs(hash, &self.plan.outputs) {
            self.warn(hash, "Failed to restore cached outputs", error.to_string());
        }
    }

    fn warn(&mut self, hash: &str, message: &str, error: String) {
        warn!(
            task_target = self.plan.task.id.as_str(),
            hash,
            "{message}: {}",
            color::muted_light(&error),
        );

        self.warnings
            .push(format!("{} ({hash}): {message}: {error}", self.plan.task.id));
    }
}
