use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CacheError {
    #[diagnostic(code(cache::entry::invalid_code))]
    #[error("Cache entry {} has an invalid exit code: {code}", .hash.style(Style::Hash))]
    InvalidExitCode { hash: String, code: String },

    #[diagnostic(code(cache::remote::http_call_failed))]
    #[error("Failed to make HTTP request to remote cache {}.", .url.style(Style::Url))]
    HttpCallFailed {
        url: String,
        #[source]
        error: Box<reqwest::Error>,
    },

    #[diagnostic(code(cache::remote::http_status))]
    #[error("Remote cache {} responded with status {code}.", .url.style(Style::Url))]
    HttpStatus { url: String, code: u16 },

    #[diagnostic(code(cache::remote::missing_entry))]
    #[error(
        "Unable to store {} in the remote cache, no committed local entry at {}.",
        .hash.style(Style::Hash),
        .dir.style(Style::Path),
    )]
    MissingLocalEntry { hash: String, dir: PathBuf },

    #[diagnostic(code(cache::remote::malformed_archive))]
    #[error(
        "Remote cache archive for {} did not contain a cache entry.",
        .hash.style(Style::Hash),
    )]
    MalformedArchive { hash: String },

    #[diagnostic(code(cache::background_task_failed))]
    #[error("Cache background task failed: {error}")]
    BackgroundTaskFailed { error: String },
}
