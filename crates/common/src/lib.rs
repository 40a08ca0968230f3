pub mod consts;
mod env;
pub mod path;
mod read_fs;

pub use env::*;
pub use read_fs::*;
pub use starbase_styles::*;
