mod target;
mod task;
mod task_error;

pub use target::*;
pub use task::*;
pub use task_error::*;
