//! Signature list loading
//!
//! Signatures are the names an operator may sign a compensation record with.
//! They live in a table owned by another system; this module only reads it.
//! A failed read is logged and yields an empty list so the caller can keep
//! going without a selectable signature.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// A read-only source of signature names
pub trait SignatureSource {
    /// Fetch every name currently in the source
    fn fetch_names(&self) -> Result<Vec<String>, SignatureError>;
}

/// Signature names held in memory
impl SignatureSource for Vec<String> {
    fn fetch_names(&self) -> Result<Vec<String>, SignatureError> {
        Ok(self.clone())
    }
}

/// Reads `name` values from a table in a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSignatureSource {
    path: PathBuf,
    table: String,
}

impl SqliteSignatureSource {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl SignatureSource for SqliteSignatureSource {
    fn fetch_names(&self) -> Result<Vec<String>, SignatureError> {
        if !is_plain_identifier(&self.table) {
            return Err(SignatureError::InvalidTable(self.table.clone()));
        }

        // Read-only open never creates the file
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SignatureError::Open {
            path: self.path.clone(),
            source: e,
        })?;

        let sql = format!("SELECT name FROM \"{}\"", self.table);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

        let mut names = Vec::new();
        for row in rows {
            if let Some(name) = row? {
                names.push(name);
            }
        }
        Ok(names)
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Fetch the signature list once, degrading to an empty list on failure
pub fn load_signatures(source: &dyn SignatureSource) -> Vec<String> {
    match source.fetch_names() {
        Ok(names) => {
            tracing::debug!(count = names.len(), "loaded signatures");
            names
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch signatures");
            Vec::new()
        }
    }
}

/// Errors raised while reading the signatures table
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("cannot open signature database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid signatures table name: '{0}'")]
    InvalidTable(String),

    #[error("signature query failed: {0}")]
    Query(#[from] rusqlite::Error),
}
