use crate::cache_engine::ensure_dir;
use crate::cache_error::CacheError;
use crate::cache_mode::get_cache_mode;
use orbit_common::color;
use starbase_archive::Archiver;
use starbase_archive::tar::{TarPacker, TarUnpacker};
use starbase_utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

pub const CODE_FILE: &str = "code";
pub const OUTPUTS_ARCHIVE_FILE: &str = "outputs.tar.gz";
pub const TERMINAL_OUTPUT_FILE: &str = "terminalOutput";

/// A task result recorded in the cache.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedResult {
    pub code: i32,
    pub terminal_output: String,
    pub outputs_archive: Option<PathBuf>,
}

pub fn get_entry_dir(cache_dir: &Path, hash: &str) -> PathBuf {
    cache_dir.join(hash)
}

/// The marker file that signals an entry has been fully written.
pub fn get_commit_path(cache_dir: &Path, hash: &str) -> PathBuf {
    cache_dir.join(format!("{hash}.commit"))
}

/// Create a uniquely named directory to stage an entry in before committing it.
pub fn create_staging_dir(cache_dir: &Path, hash: &str) -> miette::Result<PathBuf> {
    let dir = cache_dir.join(format!("{hash}.{}.tmp", Uuid::new_v4().simple()));

    ensure_dir(&dir)?;

    Ok(dir)
}

/// Read the exit code recorded in an entry directory.
pub fn read_entry_code(entry_dir: &Path, hash: &str) -> miette::Result<i32> {
    let code_path = entry_dir.join(CODE_FILE);

    if !code_path.exists() {
        return Err(CacheError::InvalidExitCode {
            hash: hash.to_owned(),
            code: String::new(),
        }
        .into());
    }

    let code = fs::read_file(code_path)?;

    code.trim().parse::<i32>().map_err(|_| {
        CacheError::InvalidExitCode {
            hash: hash.to_owned(),
            code: code.trim().to_owned(),
        }
        .into()
    })
}

/// Move a fully staged entry into place and write its commit marker.
/// Returns false when another writer committed the same hash first, in which
/// case the staged copy is discarded. Entries are identical per hash, so the
/// first writer wins.
pub fn commit_entry(cache_dir: &Path, hash: &str, staged_dir: &Path) -> miette::Result<bool> {
    let entry_dir = get_entry_dir(cache_dir, hash);

    let committed = if entry_dir.exists() {
        false
    } else {
        match fs::rename(staged_dir, &entry_dir) {
            Ok(_) => true,
            Err(_) if entry_dir.is_dir() => false,
            Err(error) => {
                fs::remove_dir_all(staged_dir)?;

                return Err(error.into());
            }
        }
    };

    if committed {
        debug!(hash, entry = ?entry_dir, "Committed cache entry");
    } else {
        trace!(hash, "Cache entry was committed by another writer, discarding ours");

        fs::remove_dir_all(staged_dir)?;
    }

    // The entry directory only appears through an atomic rename, so marking
    // it as committed is safe regardless of which writer won
    fs::write_file(get_commit_path(cache_dir, hash), "true")?;

    Ok(committed)
}

/// Task results keyed by hash within the cache directory:
///
/// ```text
/// <cache_dir>/<hash>/terminalOutput
/// <cache_dir>/<hash>/code
/// <cache_dir>/<hash>/outputs.tar.gz
/// <cache_dir>/<hash>.commit
/// ```
pub struct TaskCache {
    pub cache_dir: PathBuf,
    pub workspace_root: PathBuf,
}

impl TaskCache {
    pub fn new(workspace_root: &Path, cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            workspace_root: workspace_root.to_path_buf(),
        }
    }

    pub fn get_entry_dir(&self, hash: &str) -> PathBuf {
        get_entry_dir(&self.cache_dir, hash)
    }

    pub fn get_commit_path(&self, hash: &str) -> PathBuf {
        get_commit_path(&self.cache_dir, hash)
    }

    pub fn get_archive_path(&self, hash: &str) -> PathBuf {
        self.get_entry_dir(hash).join(OUTPUTS_ARCHIVE_FILE)
    }

    /// An entry without a commit marker is still being written.
    pub fn is_committed(&self, hash: &str) -> bool {
        self.get_commit_path(hash).exists() && self.get_entry_dir(hash).is_dir()
    }

    #[instrument(skip(self))]
    pub fn get(&self, hash: &str) -> miette::Result<Option<CachedResult>> {
        if !get_cache_mode().is_readable() {
            trace!(hash, "Cache is not readable, skipping lookup");

            return Ok(None);
        }

        if !self.is_committed(hash) {
            debug!(hash, "Cache miss, no committed entry");

            return Ok(None);
        }

        match self.read_entry(hash) {
            Ok(result) => {
                debug!(hash, code = result.code, "Cache hit");

                Ok(Some(result))
            }
            Err(error) => {
                warn!(
                    hash,
                    "Removing unreadable cache entry: {}",
                    color::muted_light(error.to_string()),
                );

                // Drop the marker first, so the entry reads as uncommitted
                // while its directory is removed, and the next record rewrites it
                fs::remove_file(self.get_commit_path(hash))?;
                fs::remove_dir_all(self.get_entry_dir(hash))?;

                Err(error)
            }
        }
    }

    fn read_entry(&self, hash: &str) -> miette::Result<CachedResult> {
        let entry_dir = self.get_entry_dir(hash);
        let code = read_entry_code(&entry_dir, hash)?;

        let terminal_output_path = entry_dir.join(TERMINAL_OUTPUT_FILE);
        let terminal_output = if terminal_output_path.exists() {
            fs::read_file(terminal_output_path)?
        } else {
            String::new()
        };

        let archive_path = self.get_archive_path(hash);

        Ok(CachedResult {
            code,
            terminal_output,
            outputs_archive: archive_path.exists().then_some(archive_path),
        })
    }

    /// Record a task result. The entry is staged in a temporary directory
    /// and renamed into place, so readers never observe a partial entry.
    #[instrument(skip(self, terminal_output))]
    pub fn put(
        &self,
        hash: &str,
        terminal_output: &str,
        outputs: &[String],
        code: i32,
    ) -> miette::Result<bool> {
        if !get_cache_mode().is_writable() {
            trace!(hash, "Cache is not writable, skipping record");

            return Ok(false);
        }

        if self.is_committed(hash) {
            trace!(hash, "Cache entry already exists, skipping record");

            return Ok(false);
        }

        let staged_dir = create_staging_dir(&self.cache_dir, hash)?;

        let staged = self
            .stage_entry(&staged_dir, terminal_output, outputs, code)
            .and_then(|_| commit_entry(&self.cache_dir, hash, &staged_dir));

        if staged.is_err() && staged_dir.exists() {
            fs::remove_dir_all(&staged_dir)?;
        }

        staged
    }

    fn stage_entry(
        &self,
        staged_dir: &Path,
        terminal_output: &str,
        outputs: &[String],
        code: i32,
    ) -> miette::Result<()> {
        fs::write_file(staged_dir.join(TERMINAL_OUTPUT_FILE), terminal_output)?;
        fs::write_file(staged_dir.join(CODE_FILE), code.to_string())?;

        let existing_outputs = outputs
            .iter()
            .filter(|output| self.workspace_root.join(output).exists())
            .collect::<Vec<_>>();

        if existing_outputs.is_empty() {
            return Ok(());
        }

        let archive_file = staged_dir.join(OUTPUTS_ARCHIVE_FILE);
        let mut archive = Archiver::new(&self.workspace_root, &archive_file);

        // Outputs are relative from the workspace root
        for output in existing_outputs {
            archive.add_source_file(output, None);
        }

        archive.pack(TarPacker::new_gz)?;

        Ok(())
    }

    /// Restore archived outputs into the workspace, replacing what exists.
    #[instrument(skip(self))]
    pub fn restore_outputs(&self, hash: &str, outputs: &[String]) -> miette::Result<bool> {
        let archive_file = self.get_archive_path(hash);

        if !get_cache_mode().is_readable() || !archive_file.exists() {
            return Ok(false);
        }

        // Clear stale outputs so the restored tree matches the recorded one
        for output in outputs {
            fs::remove(self.workspace_root.join(output))?;
        }

        let mut archive = Archiver::new(&self.workspace_root, &archive_file);

        for output in outputs {
            archive.add_source_file(output, None);
        }

        match archive.unpack(TarUnpacker::new_gz) {
            Ok(_) => Ok(true),
            Err(error) => {
                warn!(
                    hash,
                    "Failed to restore outputs from cache: {}",
                    color::muted_light(error.to_string()),
                );

                for output in outputs {
                    fs::remove(self.workspace_root.join(output))?;
                }

                Ok(false)
            }
        }
    }
}
