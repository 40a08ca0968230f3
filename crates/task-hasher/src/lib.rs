mod task_hash;
mod task_hasher;

pub use task_hash::*;
pub use task_hasher::*;
