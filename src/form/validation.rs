//! Field-level validation of the compensation form

use miette::Diagnostic;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::entities::compensation::Direction;

/// Accepted shape of the compensation value: optional sign, optional
/// decimal point, at least one trailing ASCII digit
pub const VALUE_PATTERN: &str = r"^[+-]?[0-9]*\.?[0-9]+$";

/// Editable fields of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    ManufacturingOrder,
    CoordinateSystem,
    Tool,
    Number,
    Direction,
    Value,
    Comment,
    Signature,
}

impl FormField {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FormField::ManufacturingOrder => "Manufacturing order",
            FormField::CoordinateSystem => "Coordinate system",
            FormField::Tool => "Tool",
            FormField::Number => "Number",
            FormField::Direction => "Direction",
            FormField::Value => "Value",
            FormField::Comment => "Comment",
            FormField::Signature => "Signature",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every field error found in one validation pass
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("form has {} invalid field(s)", .errors.len())]
#[diagnostic(
    code(tcomp::form::invalid),
    help("Correct the listed fields and submit again")
)]
pub struct FormErrors {
    #[related]
    errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First error reported for a field
    pub fn get(&self, field: FormField) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn has(&self, field: FormField) -> bool {
        self.get(field).is_some()
    }
}

/// Raw field values as entered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub manufacturing_order: String,
    pub coordinate_system: String,
    pub tool: String,
    pub number: String,
    pub direction: String,
    pub value: String,
    pub comment: String,
    pub signature: String,
}

impl FormValues {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::ManufacturingOrder => &self.manufacturing_order,
            FormField::CoordinateSystem => &self.coordinate_system,
            FormField::Tool => &self.tool,
            FormField::Number => &self.number,
            FormField::Direction => &self.direction,
            FormField::Value => &self.value,
            FormField::Comment => &self.comment,
            FormField::Signature => &self.signature,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::ManufacturingOrder => self.manufacturing_order = value,
            FormField::CoordinateSystem => self.coordinate_system = value,
            FormField::Tool => self.tool = value,
            FormField::Number => self.number = value,
            FormField::Direction => self.direction = value,
            FormField::Value => self.value = value,
            FormField::Comment => self.comment = value,
            FormField::Signature => self.signature = value,
        }
    }

    /// Clear every field except the manufacturing order
    pub fn reset_keep_order(&mut self) {
        *self = FormValues {
            manufacturing_order: std::mem::take(&mut self.manufacturing_order),
            ..FormValues::default()
        };
    }
}

/// Form values that passed validation, trimmed and typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm {
    pub manufacturing_order: String,
    pub coordinate_system: Option<String>,
    pub tool: Option<String>,
    pub number: Option<String>,
    pub direction: Direction,
    pub value: String,
    pub comment: Option<String>,
    pub signature: String,
}

/// Check whether a string is an acceptable compensation value
pub fn is_valid_value(value: &str) -> bool {
    static VALUE_RE: OnceLock<Option<Regex>> = OnceLock::new();
    VALUE_RE
        .get_or_init(|| Regex::new(VALUE_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

fn optional(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Validate all fields, collecting every error
pub fn validate(values: &FormValues) -> Result<ValidForm, FormErrors> {
    let mut errors = Vec::new();

    let manufacturing_order = values.manufacturing_order.trim();
    if manufacturing_order.is_empty() {
        errors.push(FieldError::new(
            FormField::ManufacturingOrder,
            "Manufacturing order is required",
        ));
    }

    let coordinate_system = optional(&values.coordinate_system);
    let tool = optional(&values.tool);
    let number = optional(&values.number);
    if coordinate_system.is_none() && tool.is_none() && number.is_none() {
        errors.push(FieldError::new(
            FormField::CoordinateSystem,
            "Provide at least one of coordinate system, tool or number",
        ));
    }

    let direction = match values.direction.trim() {
        "" => {
            errors.push(FieldError::new(FormField::Direction, "Direction is required"));
            None
        }
        d => match d.parse::<Direction>() {
            Ok(dir) => Some(dir),
            Err(_) => {
                errors.push(FieldError::new(
                    FormField::Direction,
                    "Direction must be one of X, Y, Z, R, L",
                ));
                None
            }
        },
    };

    let value = values.value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(FormField::Value, "Value is required"));
    } else if !is_valid_value(value) {
        errors.push(FieldError::new(
            FormField::Value,
            "Value must be a number with optional sign and decimal point (e.g. +0.15)",
        ));
    }

    let signature = values.signature.trim();
    if signature.is_empty() {
        errors.push(FieldError::new(FormField::Signature, "Signature is required"));
    }

    match direction {
        Some(direction) if errors.is_empty() => Ok(ValidForm {
            manufacturing_order: manufacturing_order.to_string(),
            coordinate_system,
            tool,
            number,
            direction,
            value: value.to_string(),
            comment: optional(&values.comment),
            signature: signature.to_string(),
        }),
        _ => Err(FormErrors { errors }),
    }
}
