use serde::Serialize;
use sha2::{Digest, Sha256};
use starbase_utils::json;
use tracing::{debug, trace};

/// Builds a digest from an ordered list of serializable parts.
///
/// Every part is appended to a single JSON array, so two hashers fed equal
/// parts in the same order produce the same digest. Map-like parts should be
/// `BTreeMap`s to keep key order stable.
pub struct ContentHasher {
    label: String,
    parts: usize,
    buffer: String,
    digest: Option<String>,
}

impl ContentHasher {
    pub fn new(label: &str) -> ContentHasher {
        trace!(label, "Created new content hasher");

        ContentHasher {
            label: label.to_owned(),
            parts: 0,
            buffer: String::new(),
            digest: None,
        }
    }

    pub fn hash_content<T: Serialize>(&mut self, content: T) -> miette::Result<()> {
        let part = json::format(&content, false)?;

        trace!(label = &self.label, index = self.parts, "Adding content to hasher");

        if self.parts > 0 {
            self.buffer.push(',');
        }

        self.buffer.push_str(&part);
        self.parts += 1;
        self.digest = None;

        Ok(())
    }

    /// The JSON array that gets digested.
    pub fn serialize(&self) -> String {
        format!("[{}]", self.buffer)
    }

    pub fn generate_hash(&mut self) -> miette::Result<String> {
        if let Some(digest) = &self.digest {
            return Ok(digest.clone());
        }

        let digest = hash_bytes(self.serialize().as_bytes());

        debug!(
            label = &self.label,
            parts = self.parts,
            hash = &digest,
            "Generated content hash"
        );

        self.digest = Some(digest.clone());

        Ok(digest)
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
