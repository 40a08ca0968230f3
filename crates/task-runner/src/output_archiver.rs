use crate::command_builder::TaskPlan;
use orbit_cache::{RemoteCache, TaskCache, get_cache_mode};
use orbit_common::color;
use tracing::{debug, instrument, warn};

/// Records an executed task's result into the local cache, and uploads
/// successful results to the remote cache.
pub struct OutputArchiver<'task> {
    pub cache: &'task TaskCache,
    pub remote: Option<&'task dyn RemoteCache>,
    pub plan: &'task TaskPlan,

    /// Problems that prevented a write. They never fail the task.
    pub warnings: Vec<String>,
}

impl<'task> OutputArchiver<'task> {
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

    #[instrument(skip(self, terminal_output))]
    pub async fn archive(&mut self, hash: &str, terminal_output: &str, code: i32) {
        if let Err(error) = self
            .cache
            .put(hash, terminal_output, &self.plan.outputs, code)
        {
            self.warn(hash, "Failed to record local cache entry", error.to_string());

            return;
        }

        // A local write is required before uploading, since the remote
        // cache uploads the committed entry
        if code != 0 || !self.cache.is_committed(hash) {
            return;
        }

        let Some(remote) = self.remote else {
            return;
        };

        if !get_cache_mode().is_writable() {
            return;
        }

        match remote.store(hash, &self.cache.cache_dir).await {
            Ok(stored) => {
                debug!(
                    task_target = self.plan.task.id.as_str(),
                    hash, stored, "Uploaded to remote cache"
                );
            }
            Err(error) => {
                self.warn(hash, "Failed to store in remote cache", error.to_string());
            }
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
