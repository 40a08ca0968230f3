mod circular;
mod constraints;
mod module_boundaries;
mod project_constraints_error;
mod reachability;

pub use circular::*;
pub use constraints::*;
pub use module_boundaries::*;
pub use project_constraints_error::*;
pub use reachability::*;
