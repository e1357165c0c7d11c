//! tcomp: tool compensation entry
//!
//! Records numeric tool offset adjustments made on numbered manufacturing
//! machines. A [`form::CompensationDialog`] validates the entered fields,
//! offers the signatures read from a signatures table and hands each
//! submitted [`entities::ToolCompensation`] to its caller.

pub mod cli;
pub mod core;
pub mod entities;
pub mod form;
pub mod logging;
pub mod schema;
