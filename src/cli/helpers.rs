//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::signatures::SqliteSignatureSource;
use crate::core::Config;
use crate::entities::compensation::ToolCompensation;

/// Locate the project: `--project` must point inside one, otherwise it is
/// discovered from the current directory when present
pub fn open_project(global: &GlobalOpts) -> Result<Option<Project>> {
    match &global.project {
        Some(path) => Project::discover_from(path)
            .map(Some)
            .map_err(|e| miette::miette!("{}", e)),
        None => Ok(Project::discover().ok()),
    }
}

/// Signature source described by the configuration
pub fn signature_source(config: &Config, project: Option<&Project>) -> SqliteSignatureSource {
    SqliteSignatureSource::new(config.signatures_db(project), config.signatures_table())
}

/// Render a record in the requested format (`Auto` must already be resolved)
pub fn render_record(record: &ToolCompensation, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(record)
            .map(|s| s + "\n")
            .into_diagnostic(),
        OutputFormat::Id => Ok(format!("{}\n", record.id)),
        OutputFormat::Md => Ok(record_table(record)),
        OutputFormat::Yaml | OutputFormat::Auto => serde_yml::to_string(record).into_diagnostic(),
    }
}

fn record_table(record: &ToolCompensation) -> String {
    let optional = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["ID".to_string(), record.id.to_string()]);
    builder.push_record(["Machine".to_string(), record.machine.to_string()]);
    builder.push_record(["Manufacturing order".to_string(), record.manufacturing_order.clone()]);
    builder.push_record(["Coordinate system".to_string(), optional(&record.coordinate_system)]);
    builder.push_record(["Tool".to_string(), optional(&record.tool)]);
    builder.push_record(["Number".to_string(), optional(&record.number)]);
    builder.push_record(["Direction".to_string(), record.direction.to_string()]);
    builder.push_record(["Value".to_string(), record.value.clone()]);
    builder.push_record(["Comment".to_string(), optional(&record.comment)]);
    builder.push_record(["Signature".to_string(), record.signature.clone()]);
    builder.push_record(["Created".to_string(), record.created.to_rfc3339()]);

    let mut out = builder.build().with(Style::markdown()).to_string();
    out.push('\n');
    out
}

/// Render the signature list
pub fn render_signatures(names: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(names)
            .map(|s| s + "\n")
            .into_diagnostic(),
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Signature"]);
            for name in names {
                builder.push_record([name.as_str()]);
            }
            Ok(builder.build().with(Style::markdown()).to_string() + "\n")
        }
        _ => Ok(names.iter().map(|n| format!("{}\n", n)).collect()),
    }
}
