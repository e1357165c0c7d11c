//! Core module - fundamental types and collaborators

pub mod config;
pub mod identity;
pub mod orders;
pub mod project;
pub mod signatures;

pub use config::Config;
pub use identity::{IdParseError, RecordId};
pub use orders::LastOrderLookup;
pub use project::{Project, ProjectError};
pub use signatures::{load_signatures, SignatureError, SignatureSource, SqliteSignatureSource};
