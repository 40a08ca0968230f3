mod project_graph;
mod sandbox;
mod workspace_mocker;

pub use project_graph::*;
pub use sandbox::*;
pub use starbase_sandbox::{predicates, pretty_assertions};
pub use workspace_mocker::*;
