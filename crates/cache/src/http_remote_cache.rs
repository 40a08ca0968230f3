use crate::cache_engine::ensure_dir;
use crate::cache_error::CacheError;
use crate::remote_cache::RemoteCache;
use crate::task_cache::{commit_entry, create_staging_dir, get_commit_path, read_entry_code};
use miette::IntoDiagnostic;
use orbit_common::color;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use starbase_archive::Archiver;
use starbase_archive::tar::{TarPacker, TarUnpacker};
use starbase_utils::fs;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

/// Remote cache over plain HTTP. Entries are transferred as gzipped
/// tarballs of the entry directory: `GET`/`PUT {url}/cache/{hash}`.
pub struct HttpRemoteCache {
    client: Client,
    url: String,
}

impl HttpRemoteCache {
    pub fn new(url: &str, token_env: Option<&str>) -> miette::Result<Self> {
        let mut headers = HeaderMap::default();

        if let Some(token_name) = token_env {
            let token = env::var(token_name).unwrap_or_default();

            if token.is_empty() {
                warn!(
                    "Auth token {} does not exist, remote cache requests will be unauthorized",
                    color::property(token_name)
                );
            } else {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}")).into_diagnostic()?;
                value.set_sensitive(true);

                headers.insert(AUTHORIZATION, value);
            }
        }

        let url = url.trim_end_matches('/').to_owned();

        debug!("Using HTTP remote cache {}", color::url(&url));

        let client = Client::builder()
            .user_agent("orbit")
            .tcp_keepalive(Duration::from_secs(60))
            .default_headers(headers)
            .build()
            .map_err(|error| CacheError::HttpCallFailed {
                url: url.clone(),
                error: Box::new(error),
            })?;

        Ok(Self { client, url })
    }

    pub fn get_endpoint(&self, hash: &str) -> String {
        format!("{}/cache/{hash}", self.url)
    }
}

#[async_trait::async_trait]
impl RemoteCache for HttpRemoteCache {
    #[instrument(skip(self))]
    async fn retrieve(&self, hash: &str, cache_dir: &Path) -> miette::Result<bool> {
        let url = self.get_endpoint(hash);

        trace!(hash, url = url.as_str(), "Checking remote cache");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| CacheError::HttpCallFailed {
                url: url.clone(),
                error: Box::new(error),
            })?;

        let status = response.status();

        if status.as_u16() == 404 {
            debug!(hash, "Remote cache miss");

            return Ok(false);
        }

        if !status.is_success() {
            return Err(CacheError::HttpStatus {
                url,
                code: status.as_u16(),
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| CacheError::HttpCallFailed {
                url: url.clone(),
                error: Box::new(error),
            })?;

        let cache_dir = cache_dir.to_path_buf();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || unpack_entry(&cache_dir, &hash, &bytes))
            .await
            .map_err(|error| CacheError::BackgroundTaskFailed {
                error: error.to_string(),
            })??;

        debug!("Retrieved entry from remote cache");

        Ok(true)
    }

    #[instrument(skip(self))]
    async fn store(&self, hash: &str, cache_dir: &Path) -> miette::Result<bool> {
        if !get_commit_path(cache_dir, hash).exists() {
            return Err(CacheError::MissingLocalEntry {
                hash: hash.to_owned(),
                dir: cache_dir.to_path_buf(),
            }
            .into());
        }

        let bytes = {
            let cache_dir = cache_dir.to_path_buf();
            let hash = hash.to_owned();

            tokio::task::spawn_blocking(move || pack_entry(&cache_dir, &hash))
                .await
                .map_err(|error| CacheError::BackgroundTaskFailed {
                    error: error.to_string(),
                })??
        };

        let url = self.get_endpoint(hash);

        trace!(hash, url = url.as_str(), size = bytes.len(), "Uploading to remote cache");

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|error| CacheError::HttpCallFailed {
                url: url.clone(),
                error: Box::new(error),
            })?;

        let status = response.status();

        if !status.is_success() {
            return Err(CacheError::HttpStatus {
                url,
                code: status.as_u16(),
            }
            .into());
        }

        debug!(hash, "Stored entry in remote cache");

        Ok(true)
    }
}

/// Pack `<cache_dir>/<hash>` into a tarball whose entries are prefixed with the hash.
fn pack_entry(cache_dir: &Path, hash: &str) -> miette::Result<Vec<u8>> {
    let archive_file = cache_dir.join(format!("{hash}.{}.tar.gz", Uuid::new_v4().simple()));

    let mut archive = Archiver::new(cache_dir, &archive_file);
    archive.add_source_file(hash, None);
    archive.pack(TarPacker::new_gz)?;

    let bytes = fs::read_file_bytes(&archive_file);

    fs::remove_file(&archive_file)?;

    Ok(bytes?)
}

/// Unpack a downloaded tarball into a staging directory, then commit the
/// entry it contains the same way local writes are committed.
fn unpack_entry(cache_dir: &Path, hash: &str, bytes: &[u8]) -> miette::Result<()> {
    ensure_dir(cache_dir)?;

    let staging_root = create_staging_dir(cache_dir, hash)?;
    let result = unpack_into_staging(&staging_root, cache_dir, hash, bytes);

    fs::remove_dir_all(&staging_root)?;

    result
}

fn unpack_into_staging(
    staging_root: &Path,
    cache_dir: &Path,
    hash: &str,
    bytes: &[u8],
) -> miette::Result<()> {
    let archive_file = staging_root.join("remote.tar.gz");

    fs::write_file(&archive_file, bytes)?;

    Archiver::new(staging_root, &archive_file).unpack(TarUnpacker::new_gz)?;

    let staged_dir: PathBuf = staging_root.join(hash);

    if !staged_dir.is_dir() || read_entry_code(&staged_dir, hash).is_err() {
        return Err(CacheError::MalformedArchive {
            hash: hash.to_owned(),
        }
        .into());
    }

    commit_entry(cache_dir, hash, &staged_dir)?;

    Ok(())
}
