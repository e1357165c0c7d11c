//! Interactive terminal prompts for the compensation dialog

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::entities::compensation::Direction;
use crate::form::dialog::CompensationDialog;
use crate::form::validation::{is_valid_value, FormErrors, FormField};

/// Prompts the user for every editable field of a dialog
pub struct CompensationPrompt {
    theme: ColorfulTheme,
}

impl Default for CompensationPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl CompensationPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Print a dialog header for the target machine
    pub fn header(&self, machine: u32) {
        eprintln!();
        eprintln!(
            "{} Tool compensation for machine {}",
            style("◆").cyan(),
            style(machine).bold()
        );
        eprintln!("{}", style("─".repeat(50)).dim());
    }

    /// Show the errors of a rejected submission next to their fields
    pub fn show_errors(&self, errors: &FormErrors) {
        eprintln!();
        for error in errors.iter() {
            eprintln!(
                "  {} {}: {}",
                style("✗").red(),
                style(error.field.label()).bold(),
                style(&error.message).red()
            );
        }
        eprintln!();
    }

    /// Prompt for each field, offering the dialog's current values as defaults
    pub fn fill(&self, dialog: &mut CompensationDialog) -> Result<()> {
        if dialog.signatures().is_empty() {
            return Err(miette::miette!(
                help = "Check signatures_db / signatures_table in the tcomp config",
                "No signatures are available, the record cannot be signed"
            ));
        }

        let order = self.text(dialog, FormField::ManufacturingOrder, true)?;
        dialog.set(FormField::ManufacturingOrder, order).into_diagnostic()?;

        for field in [FormField::CoordinateSystem, FormField::Tool, FormField::Number] {
            let value = self.text(dialog, field, false)?;
            dialog.set(field, value).into_diagnostic()?;
        }

        let directions = Direction::all();
        let current = dialog.values().direction.parse::<Direction>().ok();
        let default_idx = current
            .and_then(|d| directions.iter().position(|x| *x == d))
            .unwrap_or(0);
        let idx = Select::with_theme(&self.theme)
            .with_prompt(FormField::Direction.label())
            .items(directions)
            .default(default_idx)
            .interact()
            .into_diagnostic()?;
        dialog
            .set(FormField::Direction, directions[idx].as_str())
            .into_diagnostic()?;

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(FormField::Value.label())
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                if is_valid_value(input.trim()) {
                    Ok(())
                } else {
                    Err("enter a number such as +0.15 or -0.02")
                }
            });
        let current_value = dialog.values().value.clone();
        if !current_value.is_empty() {
            input = input.default(current_value);
        }
        let value = input.interact_text().into_diagnostic()?;
        dialog.set(FormField::Value, value).into_diagnostic()?;

        let comment = self.text(dialog, FormField::Comment, false)?;
        dialog.set(FormField::Comment, comment).into_diagnostic()?;

        let names = dialog.signatures().to_vec();
        let default_idx = names
            .iter()
            .position(|n| *n == dialog.values().signature)
            .unwrap_or(0);
        let idx = Select::with_theme(&self.theme)
            .with_prompt(FormField::Signature.label())
            .items(&names)
            .default(default_idx)
            .interact()
            .into_diagnostic()?;
        dialog.select_signature(&names[idx]).into_diagnostic()?;

        Ok(())
    }

    fn text(&self, dialog: &CompensationDialog, field: FormField, required: bool) -> Result<String> {
        let current = dialog.values().get(field).to_string();
        let prompt = if required {
            field.label().to_string()
        } else {
            format!("{} {}", field.label(), style("(optional)").dim())
        };

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(!required);
        if !current.is_empty() {
            input = input.default(current);
        }
        input.interact_text().into_diagnostic()
    }
}
