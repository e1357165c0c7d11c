//! Entity type definitions

pub mod compensation;

pub use compensation::{Direction, ToolCompensation};
