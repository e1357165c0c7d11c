//! `tcomp validate` command - Validate record files against the schema

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::project::PROJECT_DIR;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

/// Suffixes picked up when walking a directory
const RECORD_SUFFIXES: &[&str] = &[".tcomp.yaml", ".tcomp.yml", ".tcomp.json"];

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (default: project root or current directory)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let validator = Validator::new(&SchemaRegistry::for_project(project.as_ref()));

    let roots: Vec<PathBuf> = if args.paths.is_empty() {
        match &project {
            Some(p) => vec![p.root().to_path_buf()],
            None => vec![PathBuf::from(".")],
        }
    } else {
        args.paths.clone()
    };
    let files = expand_paths(&roots);

    let mut stats = ValidationStats::default();

    if !global.quiet {
        println!(
            "{} Validating {} file(s)...\n",
            style("→").blue(),
            files.len()
        );
    }

    for path in &files {
        stats.files_checked += 1;

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if !args.summary {
                    println!("{} {} - {}", style("✗").red(), path.display(), e);
                }
                stats.files_failed += 1;
                stats.total_errors += 1;
                if !args.keep_going {
                    break;
                }
                continue;
            }
        };

        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        match validator.validate(&content, &filename) {
            Ok(()) => {
                stats.files_passed += 1;
                if !args.summary {
                    println!("{} {}", style("✓").green(), path.display());
                }
            }
            Err(e) => {
                stats.files_failed += 1;
                stats.total_errors += e.violation_count();

                if !args.summary {
                    println!(
                        "{} {} - {} error(s)",
                        style("✗").red(),
                        path.display(),
                        e.violation_count()
                    );
                    println!("{:?}", miette::Report::new(e));
                }

                if !args.keep_going {
                    break;
                }
            }
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());

    if stats.files_failed > 0 {
        Err(miette::miette!(
            "Validation failed: {} file(s) with errors",
            stats.files_failed
        ))
    } else {
        Ok(())
    }
}

/// Explicit files are taken as-is; directories are walked for record files
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .into_iter()
                    .filter_entry(|e| e.file_name() != PROJECT_DIR)
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| is_record_file(e.path()))
                    .map(|e| e.path().to_path_buf()),
            );
        } else {
            // Missing paths surface as read errors
            files.push(path.clone());
        }
    }
    files.sort();
    files
}

fn is_record_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    RECORD_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
