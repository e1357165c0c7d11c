//! Compensation entry form - dialog state, validation and terminal prompts

pub mod dialog;
pub mod prompt;
pub mod validation;

pub use dialog::{CompensationDialog, DialogTarget, SubmitError};
pub use prompt::CompensationPrompt;
pub use validation::{
    is_valid_value, validate, FieldError, FormErrors, FormField, FormValues, ValidForm,
};
