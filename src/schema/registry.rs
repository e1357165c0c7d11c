//! Record schema lookup: embedded default, optionally overridden per project

use rust_embed::Embed;
use std::borrow::Cow;

use crate::core::project::Project;

/// File name of the compensation record schema
pub const RECORD_SCHEMA: &str = "tcomp.schema.json";

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Holds the JSON Schema text used to validate records
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    record: Cow<'static, str>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let record = EmbeddedSchemas::get(RECORD_SCHEMA)
            .map(|file| match file.data {
                Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
                Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
            })
            .unwrap_or(Cow::Borrowed("{}"));
        Self { record }
    }
}

impl SchemaRegistry {
    /// Use `.tcomp/schema/tcomp.schema.json` when the project provides one
    pub fn for_project(project: Option<&Project>) -> Self {
        let override_path = project.map(|p| p.config_dir().join("schema").join(RECORD_SCHEMA));
        if let Some(path) = override_path.filter(|p| p.exists()) {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::debug!(path = %path.display(), "using project record schema");
                    return Self {
                        record: Cow::Owned(text),
                    };
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not read project schema, using built-in");
                }
            }
        }
        Self::default()
    }

    /// The record schema as JSON text
    pub fn record_schema(&self) -> &str {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schema_is_json() {
        let registry = SchemaRegistry::default();
        let value: serde_json::Value = serde_json::from_str(registry.record_schema()).unwrap();
        assert_eq!(value["title"], "Tool compensation");
    }

    #[test]
    fn test_project_override() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let dir = project.config_dir().join("schema");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(RECORD_SCHEMA), r#"{"title": "custom"}"#).unwrap();

        let registry = SchemaRegistry::for_project(Some(&project));
        assert!(registry.record_schema().contains("custom"));
    }
}
