use crate::path::{is_root_level_source, is_within_dir, standardize_separators};
use ignore::WalkBuilder;
use miette::Diagnostic;
use starbase_styles::{Style, Stylize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Diagnostic)]
pub enum ReadFsError {
    #[diagnostic(code(read_fs::list_failed))]
    #[error("Failed to list files in {}.", .dir.style(Style::Path))]
    ListFailed {
        dir: String,
        #[source]
        error: Box<ignore::Error>,
    },

    #[diagnostic(code(read_fs::missing_file))]
    #[error("File {} does not exist.", .path.style(Style::Path))]
    MissingFile { path: String },

    #[diagnostic(code(read_fs::read_failed))]
    #[error("Failed to read file {}.", .path.style(Style::Path))]
    ReadFailed {
        path: String,
        #[source]
        error: Box<std::io::Error>,
    },
}

/// Read-only access to workspace files. All paths are workspace relative
/// and use forward slashes.
pub trait ReadFs: Send + Sync {
    /// Return true if a file or directory exists at the path.
    fn exists(&self, path: &str) -> bool;

    /// Recursively list all files within the directory, sorted.
    fn list(&self, dir: &str) -> miette::Result<Vec<String>>;

    /// Read the raw bytes of a file.
    fn read(&self, path: &str) -> miette::Result<Vec<u8>>;

    fn read_to_string(&self, path: &str) -> miette::Result<String> {
        Ok(String::from_utf8_lossy(&self.read(path)?).into_owned())
    }
}

/// Reads from the real file system, rooted at the workspace root.
/// Listing respects `.gitignore` files.
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            root: workspace_root.to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if is_root_level_source(path) {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl ReadFs for DiskFs {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn list(&self, dir: &str) -> miette::Result<Vec<String>> {
        let start = self.resolve(dir);

        trace!(dir = ?start, "Listing files");

        if !start.exists() {
            return Ok(vec![]);
        }

        let walker = WalkBuilder::new(&start)
            .hidden(false)
            .require_git(false)
            .filter_entry(|entry| {
                let name = entry.file_name();

                name != ".git" && name != "node_modules" && name != ".orbit"
            })
            .build();

        let mut files = vec![];

        for entry in walker {
            let entry = entry.map_err(|error| ReadFsError::ListFailed {
                dir: dir.to_owned(),
                error: Box::new(error),
            })?;

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                files.push(standardize_separators(rel.to_string_lossy()));
            }
        }

        files.sort();

        Ok(files)
    }

    fn read(&self, path: &str) -> miette::Result<Vec<u8>> {
        let abs = self.resolve(path);

        if !abs.is_file() {
            return Err(ReadFsError::MissingFile {
                path: path.to_owned(),
            }
            .into());
        }

        std::fs::read(&abs).map_err(|error| {
            ReadFsError::ReadFailed {
                path: path.to_owned(),
                error: Box::new(error),
            }
            .into()
        })
    }
}

/// An in-memory file tree, primarily used for testing the graph
/// builder without touching the disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryFs {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<str>, contents: impl AsRef<[u8]>) {
        self.files.insert(
            standardize_separators(path),
            contents.as_ref().to_vec(),
        );
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    pub fn with_file(mut self, path: impl AsRef<str>, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl ReadFs for MemoryFs {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path) || self.files.keys().any(|file| is_within_dir(file, path))
    }

    fn list(&self, dir: &str) -> miette::Result<Vec<String>> {
        Ok(self
            .files
            .keys()
            .filter(|file| is_within_dir(file, dir))
            .cloned()
            .collect())
    }

    fn read(&self, path: &str) -> miette::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            ReadFsError::MissingFile {
                path: path.to_owned(),
            }
            .into()
        })
    }
}
