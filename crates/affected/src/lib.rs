mod affected;
mod affected_tracker;
mod json_diff;
mod locators;
mod touched_file;

pub use affected::*;
pub use affected_tracker::*;
pub use json_diff::*;
pub use locators::*;
pub use touched_file::*;
