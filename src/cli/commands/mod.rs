//! Command implementations

pub mod completions;
pub mod config;
pub mod init;
pub mod new;
pub mod signatures;
pub mod validate;
