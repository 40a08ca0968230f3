#[cfg(windows)]
pub const BIN_NAME: &str = "orbit.exe";

#[cfg(not(windows))]
pub const BIN_NAME: &str = "orbit";

pub const CONFIG_DIRNAME: &str = ".orbit";

pub const CONFIG_WORKSPACE_FILENAME: &str = "workspace.json";

pub const ROOT_MANIFEST_FILENAME: &str = "package.json";

pub const TSCONFIG_BASE_FILENAME: &str = "tsconfig.base.json";

/// Marker comment that suppresses the import on the following line.
pub const IGNORE_NEXT_LINE_MARKER: &str = "orbit-ignore-next-line";

/// Prefix for nodes that represent external npm packages.
pub const NPM_NODE_PREFIX: &str = "npm:";
