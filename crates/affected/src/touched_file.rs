use crate::json_diff::{JsonChange, json_diff};
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum FileChange {
    /// The change could not be broken down into fields.
    WholeFileChange,
    JsonChanges(Vec<JsonChange>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TouchedFile {
    pub file: String,
    pub changes: FileChange,
}

impl TouchedFile {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            changes: FileChange::WholeFileChange,
        }
    }

    pub fn with_json_changes(file: impl Into<String>, changes: Vec<JsonChange>) -> Self {
        Self {
            file: file.into(),
            changes: FileChange::JsonChanges(changes),
        }
    }

    /// Derive changes from the contents before and after. Field-level
    /// changes are only produced for JSON files that exist and parse on
    /// both sides.
    pub fn from_contents(file: impl Into<String>, before: Option<&str>, after: Option<&str>) -> Self {
        let file = file.into();

        if !file.ends_with(".json") {
            return Self::new(file);
        }

        let parse = |contents: Option<&str>| {
            contents.and_then(|contents| serde_json::from_str::<Value>(contents).ok())
        };

        match (parse(before), parse(after)) {
            (Some(lhs), Some(rhs)) => {
                let changes = json_diff(&lhs, &rhs);

                // Scalar documents have no fields to diff
                if changes.is_empty() && lhs != rhs {
                    return Self::new(file);
                }

                trace!(file = file.as_str(), changes = changes.len(), "Diffed JSON file");

                Self::with_json_changes(file, changes)
            }
            _ => Self::new(file),
        }
    }

    pub fn is_whole_file_change(&self) -> bool {
        matches!(self.changes, FileChange::WholeFileChange)
    }

    pub fn get_json_changes(&self) -> &[JsonChange] {
        match &self.changes {
            FileChange::JsonChanges(changes) => changes,
            FileChange::WholeFileChange => &[],
        }
    }
}
