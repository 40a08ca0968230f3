use crate::app_error::AppError;
use crate::app_options::LogLevel;
use orbit_common::consts::CONFIG_WORKSPACE_FILENAME;
use orbit_common::{is_formatted_output, is_test_env};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "ORBIT_LOG";

/// Create the log filter. An explicit level wins, then `ORBIT_LOG` (which
/// also accepts per-crate directives), and otherwise only warnings and
/// errors are shown. JSON and DOT output default to errors only.
pub fn create_log_filter(level: Option<LogLevel>) -> EnvFilter {
    if let Some(level) = level {
        return EnvFilter::new(level.to_string());
    }

    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        EnvFilter::new(if is_formatted_output() {
            LogLevel::Error.to_string()
        } else {
            LogLevel::Warn.to_string()
        })
    })
}

/// Logs are written to stderr, so captured task output on stdout is never
/// mixed with them.
pub fn setup_logging(level: Option<LogLevel>) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(create_log_filter(level))
        .with_writer(io::stderr)
        .with_ansi(!is_test_env())
        .with_target(false)
        .try_init();

    // Already installed when embedded in tests
    if result.is_ok() {
        debug!("Running orbit v{}", env!("CARGO_PKG_VERSION"));
    }
}

/// Walk up from the directory until a workspace configuration is found.
pub fn find_workspace_root(dir: &Path) -> miette::Result<PathBuf> {
    dir.ancestors()
        .find(|ancestor| ancestor.join(CONFIG_WORKSPACE_FILENAME).exists())
        .map(|root| root.to_path_buf())
        .ok_or_else(|| {
            AppError::MissingWorkspace {
                dir: dir.to_path_buf(),
            }
            .into()
        })
}

/// Parse `key=value` task overrides. Values that parse as JSON keep their
/// type (`minify=true`, `retries=3`), anything else is a string.
pub fn parse_overrides(values: &[String]) -> miette::Result<BTreeMap<String, Value>> {
    let mut overrides = BTreeMap::new();

    for value in values {
        let Some((key, raw)) = value
            .trim_start_matches("--")
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
        else {
            return Err(AppError::InvalidOverride {
                value: value.to_owned(),
            }
            .into());
        };

        overrides.insert(
            key.to_owned(),
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned())),
        );
    }

    Ok(overrides)
}
