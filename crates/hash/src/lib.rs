mod file_data;
mod hasher;

pub use file_data::*;
pub use hasher::*;

#[macro_export]
macro_rules! hash_content {
    ($impl:item) => {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        $impl
    };
}
