//! Utility modules

pub mod display;
pub mod memory_source;
pub mod validation;

pub use display::*;
pub use memory_source::*;
pub use validation::*;
