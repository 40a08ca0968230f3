mod config_error;
mod implicit_dependencies;
mod project_config;
mod validate;
mod workspace_config;

pub use config_error::*;
pub use implicit_dependencies::*;
pub use project_config::*;
pub use validate::*;
pub use workspace_config::*;

pub use serde_json::Value as JsonValue;

#[macro_export]
macro_rules! config_struct {
    ($struct:item) => {
        #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
        #[serde(default, rename_all = "camelCase")]
        $struct
    };
}
