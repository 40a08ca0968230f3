use std::path::Path;

/// A shared store of committed task cache entries.
#[async_trait::async_trait]
pub trait RemoteCache: Send + Sync {
    /// Download the entry for `hash` and commit it into `cache_dir`.
    /// Returns false only when the remote has no such entry. Transport
    /// errors are returned, and callers treat them as a miss.
    async fn retrieve(&self, hash: &str, cache_dir: &Path) -> miette::Result<bool>;

    /// Upload the committed entry for `hash` from `cache_dir`.
    async fn store(&self, hash: &str, cache_dir: &Path) -> miette::Result<bool>;
}
