//! Handler module declarations and re-exports

pub mod file;
pub mod query;
pub mod stitch;

pub use file::*;
pub use query::*;
pub use stitch::*;
