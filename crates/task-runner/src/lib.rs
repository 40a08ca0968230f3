pub mod command_builder;
pub mod command_executor;
pub mod output_archiver;
pub mod output_hydrater;
mod run_state;
mod task_runner;
mod task_runner_error;

pub use run_state::*;
pub use task_runner::*;
pub use task_runner_error::*;
