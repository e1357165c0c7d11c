//! Record validation against the JSON Schema, with source spans

use jsonschema::{error::ValidationErrorKind, validator_for, ValidationError as JsonSchemaError};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::schema::registry::SchemaRegistry;

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed: {summary}")]
#[diagnostic(code(tcomp::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// Compiled record schema
pub struct Validator {
    compiled: Option<jsonschema::Validator>,
}

impl Validator {
    /// Compile the registry's record schema
    ///
    /// A schema that fails to compile is logged and validation then only
    /// checks that the file parses.
    pub fn new(registry: &SchemaRegistry) -> Self {
        let compiled = match serde_json::from_str::<JsonValue>(registry.record_schema()) {
            Ok(schema) => match validator_for(&schema) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::error!(error = %e, "record schema does not compile");
                    None
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "record schema is not valid JSON");
                None
            }
        };
        Self { compiled }
    }

    /// Validate YAML (or JSON) record content, reporting every violation
    pub fn validate(&self, content: &str, filename: &str) -> Result<(), ValidationError> {
        let yaml_value: serde_yml::Value = match serde_yml::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let span = find_error_span(content, e.location());
                let violation = SchemaViolation::new(
                    format!("YAML parse error: {}", e),
                    "invalid YAML".to_string(),
                    span,
                    Some("Check YAML syntax - proper indentation, colons, quotes".to_string()),
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let json_value: JsonValue = match serde_json::to_value(&yaml_value) {
            Ok(v) => v,
            Err(e) => {
                let violation = SchemaViolation::new(
                    format!("Failed to convert YAML to JSON: {}", e),
                    "conversion error".to_string(),
                    (0, content.len()).into(),
                    None,
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let Some(schema) = &self.compiled else {
            return Ok(());
        };

        let violations: Vec<SchemaViolation> = schema
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&SchemaRegistry::default())
    }
}

fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);
    let span = find_path_span(content, &path);

    SchemaViolation::new(message, hint, span, help)
}

fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", prop_str, path)
        }
        ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        ValidationErrorKind::Enum { options } => {
            format!("Invalid value at {}: must be one of: {}", path, format_enum_options(options))
        }
        ValidationErrorKind::Pattern { pattern } => {
            format!("Value at {} doesn't match pattern: {}", path, pattern)
        }
        ValidationErrorKind::MinLength { .. } => {
            format!("Value at {} must not be empty", path)
        }
        ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        ValidationErrorKind::AnyOf { .. } => {
            format!(
                "At least one of coordinate_system, tool or number must be set at {}",
                path
            )
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "required field missing",
        ValidationErrorKind::Type { .. } => "wrong type",
        ValidationErrorKind::Enum { .. } => "invalid value",
        ValidationErrorKind::Pattern { .. } => "pattern mismatch",
        ValidationErrorKind::MinLength { .. } => "empty",
        ValidationErrorKind::AnyOf { .. } => "no coordinate system, tool or number",
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field",
        _ => "validation error",
    }
    .to_string()
}

fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field to your file", prop_str))
        }
        ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        ValidationErrorKind::Pattern { pattern } => {
            if pattern.contains("TCMP-") {
                Some("ID format: TCMP-[26-character ULID], e.g., TCMP-01HC2JB7SMQX7RS1Y0GFKBHPTD".to_string())
            } else {
                Some("Values are quoted signed decimals, e.g. value: \"+0.15\"".to_string())
            }
        }
        ValidationErrorKind::Type { kind } => Some(format!(
            "Expected value of type: {:?} (quote numbers that are meant as text)",
            kind
        )),
        ValidationErrorKind::AnyOf { .. } => {
            Some("Add coordinate_system, tool or number to identify what was compensated".to_string())
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' field or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown fields or check spelling".to_string())
            }
        }
        _ => None,
    }
}

/// Find the span (byte offset, length) for a YAML parse error location
fn find_error_span(content: &str, location: Option<serde_yml::Location>) -> SourceSpan {
    if let Some(loc) = location {
        let line = loc.line().saturating_sub(1);
        let column = loc.column().saturating_sub(1);

        let mut offset = 0;
        for (i, line_content) in content.lines().enumerate() {
            if i == line {
                offset += column;
                break;
            }
            offset += line_content.len() + 1;
        }

        let rest_of_content = &content[offset.min(content.len())..];
        let len = rest_of_content
            .find('\n')
            .unwrap_or(rest_of_content.len())
            .max(1);

        (offset.min(content.len()), len).into()
    } else {
        first_line_span(content)
    }
}

/// Find the span for a JSON path (e.g. "/value") in YAML content
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let key = json_path.split('/').filter(|s| !s.is_empty()).last();
    key.and_then(|k| find_key_span(content, k))
        .unwrap_or_else(|| first_line_span(content))
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find a top-level `key:` line, or `"key":` in JSON content
fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let yaml_pattern = format!("{}:", key);
    let json_pattern = format!("\"{}\"", key);

    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with(&yaml_pattern) || trimmed.starts_with(&json_pattern) {
            let key_start = offset + (line.len() - trimmed.len());
            return Some((key_start, trimmed.len()).into());
        }
        offset += line.len() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
id: TCMP-01HC2JB7SMQX7RS1Y0GFKBHPTD
machine: 3
manufacturing_order: MO-100
tool: T12
direction: Z
value: "+0.15"
signature: MK
created: "2024-01-01T00:00:00Z"
"#;

    #[test]
    fn test_valid_record() {
        let validator = Validator::default();
        let result = validator.validate(VALID, "ok.tcomp.yaml");
        assert!(result.is_ok(), "valid record should pass: {:?}", result);
    }

    #[test]
    fn test_valid_json_record() {
        let validator = Validator::default();
        let json = r#"{
  "id": "TCMP-01HC2JB7SMQX7RS1Y0GFKBHPTD",
  "machine": 1,
  "manufacturing_order": "MO-1",
  "number": "4",
  "direction": "L",
  "value": "-0.020",
  "signature": "JD",
  "created": "2024-01-01T00:00:00Z"
}"#;
        assert!(validator.validate(json, "ok.tcomp.json").is_ok());
    }

    #[test]
    fn test_missing_target_fields() {
        let validator = Validator::default();
        let yaml = VALID.replace("tool: T12\n", "");
        let err = validator.validate(&yaml, "bad.tcomp.yaml").unwrap_err();
        assert!(err
            .violations()
            .iter()
            .any(|v| v.message().contains("coordinate_system, tool or number")));
    }

    #[test]
    fn test_bad_value_and_direction() {
        let validator = Validator::default();
        let yaml = VALID
            .replace("value: \"+0.15\"", "value: abc")
            .replace("direction: Z", "direction: Q");
        let err = validator.validate(&yaml, "bad.tcomp.yaml").unwrap_err();
        assert_eq!(err.violation_count(), 2);
    }

    #[test]
    fn test_missing_required_fields() {
        let validator = Validator::default();
        let err = validator
            .validate("machine: 3\ntool: T1\n", "bad.tcomp.yaml")
            .unwrap_err();
        assert!(err.violation_count() >= 5);
    }

    #[test]
    fn test_unknown_field() {
        let validator = Validator::default();
        let yaml = format!("{}operator: someone\n", VALID);
        let err = validator.validate(&yaml, "bad.tcomp.yaml").unwrap_err();
        assert!(err
            .violations()
            .iter()
            .any(|v| v.message().contains("operator")));
    }

    #[test]
    fn test_yaml_parse_error() {
        let validator = Validator::default();
        let err = validator
            .validate("machine: [unclosed\n", "broken.tcomp.yaml")
            .unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().starts_with("YAML parse error"));
    }

    #[test]
    fn test_find_key_span() {
        let content = "a: 1\nvalue: x\n";
        let span = find_key_span(content, "value").unwrap();
        assert_eq!(span.offset(), 5);
    }
}
