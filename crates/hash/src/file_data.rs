use crate::hasher::hash_bytes;
use orbit_common::path::extension_of;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A workspace file and the hash of its contents.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct FileData {
    pub file: String,
    pub hash: String,
    #[serde(default)]
    pub ext: String,
}

impl FileData {
    pub fn new(file: impl Into<String>, hash: impl Into<String>) -> Self {
        let file = file.into();

        FileData {
            ext: extension_of(&file),
            hash: hash.into(),
            file,
        }
    }

    pub fn from_contents(file: impl Into<String>, contents: &[u8]) -> Self {
        Self::new(file, hash_bytes(contents))
    }
}

/// Return true if the two file lists differ in any member, either
/// by an added, removed, or modified (different hash) file.
pub fn files_changed(a: &[FileData], b: &[FileData]) -> bool {
    if a.len() != b.len() {
        return true;
    }

    let lookup = a
        .iter()
        .map(|data| (data.file.as_str(), data.hash.as_str()))
        .collect::<BTreeMap<_, _>>();

    b.iter()
        .any(|data| lookup.get(data.file.as_str()) != Some(&data.hash.as_str()))
}
