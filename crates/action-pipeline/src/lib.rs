mod action_pipeline;
mod action_pipeline_error;
mod event_emitter;
mod run_summary;
pub mod subscribers;
mod task_graph;
mod task_plans;

pub use action_pipeline::*;
pub use action_pipeline_error::*;
pub use event_emitter::*;
pub use run_summary::*;
pub use task_graph::*;
pub use task_plans::*;
