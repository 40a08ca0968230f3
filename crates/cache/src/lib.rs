mod cache_engine;
mod cache_error;
mod cache_mode;
mod http_remote_cache;
mod remote_cache;
mod task_cache;

pub use cache_engine::*;
pub use cache_error::*;
pub use cache_mode::*;
pub use http_remote_cache::*;
pub use remote_cache::*;
pub use task_cache::*;
