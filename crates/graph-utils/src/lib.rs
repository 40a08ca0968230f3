mod graph_formats;
mod graph_traits;

pub use graph_formats::*;
pub use graph_traits::*;
