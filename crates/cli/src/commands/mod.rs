pub mod affected;
pub mod graph;
pub mod lint;
pub mod run;

pub const HEADING_AFFECTED: &str = "Affected by changes";
pub const HEADING_SELECTION: &str = "Project selection";
