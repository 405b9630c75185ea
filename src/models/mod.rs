pub mod artifacts;
pub mod data;

pub use artifacts::*;
pub use data::*;
