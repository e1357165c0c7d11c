//! The compensation entry dialog
//!
//! Holds the open/closed state, the target machine, the editable field
//! values and the signature list fetched when the dialog is mounted.
//! Submitting validates the fields, hands a fresh [`ToolCompensation`] to
//! the caller and then clears everything except the manufacturing order.

use chrono::Utc;
use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::RecordId;
use crate::core::orders::LastOrderLookup;
use crate::core::signatures::{load_signatures, SignatureSource};
use crate::entities::compensation::ToolCompensation;
use crate::form::validation::{validate, FieldError, FormErrors, FormField, FormValues};

/// Which machine the dialog records for, and an optional order to pre-fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTarget {
    pub machine: u32,
    pub default_order: Option<String>,
}

impl DialogTarget {
    pub fn new(machine: u32) -> Self {
        Self {
            machine,
            default_order: None,
        }
    }

    pub fn with_default_order(mut self, order: impl Into<String>) -> Self {
        self.default_order = Some(order.into());
        self
    }

    /// The explicit default if set, otherwise the machine's last order
    fn initial_order(&self, lookup: &dyn LastOrderLookup) -> String {
        self.default_order
            .as_deref()
            .map(str::trim)
            .filter(|order| !order.is_empty())
            .map(String::from)
            .or_else(|| lookup.last_order(self.machine))
            .unwrap_or_default()
    }
}

/// Reasons a submission is refused
#[derive(Debug, Error, Diagnostic)]
pub enum SubmitError {
    #[error("the compensation dialog is not open")]
    #[diagnostic(code(tcomp::form::closed))]
    Closed,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] FormErrors),
}

/// State of one compensation entry dialog
#[derive(Debug)]
pub struct CompensationDialog {
    open: bool,
    target: Option<DialogTarget>,
    values: FormValues,
    signatures: Vec<String>,
    errors: Option<FormErrors>,
}

impl CompensationDialog {
    /// Mount the dialog, reading the signature list once
    ///
    /// A failed read leaves the list empty; it is never retried for the
    /// lifetime of the dialog.
    pub fn mount(source: &dyn SignatureSource) -> Self {
        Self {
            open: false,
            target: None,
            values: FormValues::default(),
            signatures: load_signatures(source),
            errors: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn target(&self) -> Option<&DialogTarget> {
        self.target.as_ref()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Signatures the user may choose from
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    /// Errors from the last rejected submission, cleared by a successful one
    pub fn errors(&self) -> Option<&FormErrors> {
        self.errors.as_ref()
    }

    /// Open the dialog for a target
    pub fn open(&mut self, target: DialogTarget, lookup: &dyn LastOrderLookup) {
        self.set_target(target, lookup);
        self.open = true;
    }

    /// Close without submitting; edited values are kept
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Point the dialog at a machine/default order
    ///
    /// The order field is re-populated only when the target actually
    /// changes, so reopening for the same machine keeps what was typed.
    pub fn set_target(&mut self, target: DialogTarget, lookup: &dyn LastOrderLookup) {
        if self.target.as_ref() == Some(&target) {
            return;
        }
        self.values.manufacturing_order = target.initial_order(lookup);
        tracing::debug!(
            machine = target.machine,
            order = %self.values.manufacturing_order,
            "compensation dialog retargeted"
        );
        self.target = Some(target);
    }

    /// Set a free-text field
    ///
    /// The signature is not free text; use [`select_signature`](Self::select_signature).
    pub fn set(&mut self, field: FormField, value: impl Into<String>) -> Result<(), FieldError> {
        if field == FormField::Signature {
            return self.select_signature(&value.into());
        }
        self.values.set(field, value);
        Ok(())
    }

    /// Choose a signature from the fetched list
    pub fn select_signature(&mut self, name: &str) -> Result<(), FieldError> {
        let name = name.trim();
        if !self.signatures.iter().any(|s| s == name) {
            let message = if self.signatures.is_empty() {
                "No signatures are available".to_string()
            } else {
                format!("'{}' is not a known signature", name)
            };
            return Err(FieldError::new(FormField::Signature, message));
        }
        self.values.signature = name.to_string();
        Ok(())
    }

    /// Validate and emit a record to `on_submit`
    ///
    /// On success the callback owns the record, every field except the
    /// manufacturing order is cleared and the dialog closes.
    pub fn submit<F>(&mut self, on_submit: F) -> Result<RecordId, SubmitError>
    where
        F: FnOnce(ToolCompensation),
    {
        let machine = match (&self.target, self.open) {
            (Some(target), true) => target.machine,
            _ => return Err(SubmitError::Closed),
        };

        let valid = match validate(&self.values) {
            Ok(valid) => valid,
            Err(errors) => {
                self.errors = Some(errors.clone());
                return Err(SubmitError::Invalid(errors));
            }
        };

        let id = RecordId::new();
        let record = ToolCompensation {
            id,
            machine,
            manufacturing_order: valid.manufacturing_order,
            coordinate_system: valid.coordinate_system,
            tool: valid.tool,
            number: valid.number,
            direction: valid.direction,
            value: valid.value,
            comment: valid.comment,
            signature: valid.signature,
            created: Utc::now(),
        };

        tracing::info!(
            id = %id,
            machine,
            order = %record.manufacturing_order,
            direction = %record.direction,
            value = %record.value,
            "tool compensation submitted"
        );
        on_submit(record);

        self.values.reset_keep_order();
        self.errors = None;
        self.open = false;
        Ok(id)
    }
}
