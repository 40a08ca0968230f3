mod import_scanner;
mod project_graph;
mod project_graph_builder;
mod project_graph_cache;
mod project_graph_error;
mod target_project_locator;

pub use import_scanner::*;
pub use project_graph::*;
pub use project_graph_builder::*;
pub use project_graph_cache::*;
pub use project_graph_error::*;
pub use target_project_locator::*;
