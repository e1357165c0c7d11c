//! `tcomp new` command - Record a tool compensation
//!
//! Mounts a compensation dialog for the machine, fills it from flags or
//! interactive prompts and submits it. The submitted record is written to
//! stdout; storing it is left to whatever consumes that output.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_project, render_record, signature_source};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::entities::compensation::ToolCompensation;
use crate::form::{CompensationDialog, CompensationPrompt, DialogTarget, FormField, SubmitError};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Machine number
    #[arg(long, short = 'm')]
    pub machine: u32,

    /// Manufacturing order (default: the machine's last known order)
    #[arg(long, short = 'o')]
    pub order: Option<String>,

    /// Coordinate system (e.g. G54)
    #[arg(long, short = 'c')]
    pub coordinate_system: Option<String>,

    /// Tool identifier
    #[arg(long, short = 't')]
    pub tool: Option<String>,

    /// Offset or tool number
    #[arg(long, short = 'n')]
    pub number: Option<String>,

    /// Compensation direction (X, Y, Z, R, L)
    #[arg(long, short = 'd')]
    pub direction: Option<String>,

    /// Compensation value, e.g. +0.15
    #[arg(long, allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Free-text comment
    #[arg(long)]
    pub comment: Option<String>,

    /// Signature (must be listed in the signatures table)
    #[arg(long, short = 's')]
    pub signature: Option<String>,

    /// Prompt for fields interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(project.as_ref());
    let source = signature_source(&config, project.as_ref());

    let mut dialog = CompensationDialog::mount(&source);

    let mut target = DialogTarget::new(args.machine);
    if let Some(order) = &args.order {
        target = target.with_default_order(order.clone());
    }
    dialog.open(target, &config);

    apply_flags(&mut dialog, &args)?;

    let record = if args.interactive {
        submit_interactive(&mut dialog, args.machine)?
    } else {
        let mut submitted = None;
        dialog.submit(|record| submitted = Some(record))?;
        submitted
    };

    let record = record.ok_or_else(|| miette::miette!("No record was submitted"))?;
    let format = global.format.resolve(config.default_format.as_deref());
    print!("{}", render_record(&record, format)?);

    if !global.quiet {
        eprintln!(
            "{} Recorded compensation {} on machine {}",
            style("✓").green(),
            style(&record.id).cyan(),
            style(record.machine).bold()
        );
    }

    Ok(())
}

fn apply_flags(dialog: &mut CompensationDialog, args: &NewArgs) -> Result<()> {
    let text_fields = [
        (FormField::CoordinateSystem, &args.coordinate_system),
        (FormField::Tool, &args.tool),
        (FormField::Number, &args.number),
        (FormField::Direction, &args.direction),
        (FormField::Value, &args.value),
        (FormField::Comment, &args.comment),
    ];
    for (field, value) in text_fields {
        if let Some(value) = value {
            dialog.set(field, value.clone()).into_diagnostic()?;
        }
    }

    if let Some(signature) = &args.signature {
        dialog.select_signature(signature)?;
    }
    Ok(())
}

/// Prompt until the dialog accepts a submission
fn submit_interactive(
    dialog: &mut CompensationDialog,
    machine: u32,
) -> Result<Option<ToolCompensation>> {
    let prompt = CompensationPrompt::new();
    prompt.header(machine);

    loop {
        prompt.fill(dialog)?;

        let mut submitted = None;
        match dialog.submit(|record| submitted = Some(record)) {
            Ok(_) => return Ok(submitted),
            Err(SubmitError::Invalid(errors)) => prompt.show_errors(&errors),
            Err(e) => return Err(e.into()),
        }
    }
}
