use crate::config_error::ConfigError;
use crate::config_struct;
use crate::implicit_dependencies::ImplicitDependencyEntry;
use crate::project_config::ProjectConfig;
use orbit_common::consts::{CONFIG_WORKSPACE_FILENAME, TSCONFIG_BASE_FILENAME};
use orbit_common::{DiskFs, ReadFs, color};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument, warn};

config_struct!(
    /// Restricts which projects a project carrying `source_tag` may depend on.
    pub struct DepConstraint {
        pub source_tag: String,
        pub only_depend_on_libs_with_tags: Vec<String>,
    }
);

config_struct!(
    pub struct RemoteCacheConfig {
        pub url: String,

        /// Name of an environment variable holding a bearer token.
        pub token_env: Option<String>,
    }
);

config_struct!(
    pub struct NotifierConfig {
        pub webhook_url: Option<String>,
    }
);

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TasksRunnerOptions {
    /// Maximum number of tasks to run concurrently.
    pub parallel: usize,

    /// Workspace relative cache directory. Defaults to `.orbit/cache`.
    pub cache_directory: Option<String>,

    /// Targets whose results may be read from and written to the cache.
    pub cacheable_operations: Vec<String>,

    /// Seconds to wait for running tasks after a cancellation before killing them.
    pub grace_period: u64,

    pub remote_cache: Option<RemoteCacheConfig>,
}

impl Default for TasksRunnerOptions {
    fn default() -> Self {
        Self {
            parallel: 3,
            cache_directory: None,
            cacheable_operations: vec![],
            grace_period: 5,
            remote_cache: None,
        }
    }
}

config_struct!(
    pub struct WorkspaceConfig {
        pub version: u32,

        pub npm_scope: Option<String>,

        pub projects: BTreeMap<String, ProjectConfig>,

        /// Maps workspace files to the projects they implicitly affect.
        pub implicit_dependencies: BTreeMap<String, ImplicitDependencyEntry>,

        /// Module path aliases, merged with `tsconfig.base.json`.
        pub paths: BTreeMap<String, Vec<String>>,

        pub dep_constraints: Vec<DepConstraint>,

        pub tasks_runner_options: TasksRunnerOptions,

        pub notifier: NotifierConfig,
    }
);

config_struct!(
    struct TsConfigCompilerOptions {
        paths: BTreeMap<String, Vec<String>>,
    }
);

config_struct!(
    struct TsConfigBase {
        compiler_options: TsConfigCompilerOptions,
    }
);

fn parse_json<T: DeserializeOwned>(file: &str, contents: &str) -> Result<T, ConfigError> {
    serde_json::from_str(contents).map_err(|error| ConfigError::ParseFailed {
        file: file.to_owned(),
        error: Box::new(error),
    })
}

impl WorkspaceConfig {
    pub fn load(workspace_root: &Path) -> miette::Result<WorkspaceConfig> {
        Self::load_from(&DiskFs::new(workspace_root))
    }

    #[instrument(skip_all)]
    pub fn load_from(fs: &dyn ReadFs) -> miette::Result<WorkspaceConfig> {
        if !fs.exists(CONFIG_WORKSPACE_FILENAME) {
            return Err(ConfigError::MissingWorkspaceConfig {
                file: CONFIG_WORKSPACE_FILENAME.into(),
            }
            .into());
        }

        debug!(
            file = CONFIG_WORKSPACE_FILENAME,
            "Loading workspace configuration"
        );

        let mut config: WorkspaceConfig = parse_json(
            CONFIG_WORKSPACE_FILENAME,
            &fs.read_to_string(CONFIG_WORKSPACE_FILENAME)?,
        )?;

        if fs.exists(TSCONFIG_BASE_FILENAME) {
            match parse_json::<TsConfigBase>(
                TSCONFIG_BASE_FILENAME,
                &fs.read_to_string(TSCONFIG_BASE_FILENAME)?,
            ) {
                Ok(tsconfig) => {
                    for (alias, targets) in tsconfig.compiler_options.paths {
                        config.paths.entry(alias).or_insert(targets);
                    }
                }
                Err(error) => {
                    warn!(
                        "Unable to read path aliases from {}: {}",
                        color::file(TSCONFIG_BASE_FILENAME),
                        color::muted_light(error.to_string()),
                    );
                }
            }
        }

        Ok(config)
    }

    pub fn get_project_names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn is_cacheable(&self, target: &str) -> bool {
        self.tasks_runner_options
            .cacheable_operations
            .iter()
            .any(|op| op == target)
    }
}
