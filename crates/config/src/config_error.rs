use miette::Diagnostic;
use orbit_common::{Style, Stylize};
use thiserror::Error;

pub const CONFIG_ERROR_TITLE: &str = "Configuration Error";

#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[diagnostic(code(config::invalid))]
    #[error("{title}\n{}", .body.join("\n"))]
    Invalid { title: String, body: Vec<String> },

    #[diagnostic(
        code(config::missing_workspace),
        help = "Is this command being ran from the root of a workspace?"
    )]
    #[error("Unable to locate {} in the workspace root.", .file.style(Style::File))]
    MissingWorkspaceConfig { file: String },

    #[diagnostic(code(config::parse_failed))]
    #[error("Failed to parse {}.", .file.style(Style::File))]
    ParseFailed {
        file: String,
        #[source]
        error: Box<serde_json::Error>,
    },
}

impl ConfigError {
    pub fn invalid(body: Vec<String>) -> Self {
        ConfigError::Invalid {
            title: CONFIG_ERROR_TITLE.into(),
            body,
        }
    }
}
