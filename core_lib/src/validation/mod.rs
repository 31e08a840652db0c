//! Form validation: static schemas, per-field rules and field-level errors

pub mod rules;

pub use rules::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Field name to human-readable message, one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors = FieldErrors::new();

        for (field, errors) in errors.field_errors() {
            if let Some(error) = errors.first() {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Validation failed for field '{}'", field),
                };
                field_errors.insert(field.to_string(), message);
            }
        }

        field_errors
    }
}

/// A form whose raw input can be checked against a fixed schema and turned
/// into its normalized, accepted record.
pub trait FormSchema {
    type Valid;

    fn validate_form(&self) -> Result<Self::Valid, FieldErrors>;
}

/// Records a rule outcome under `field`. Every field is checked, so callers
/// see all violations at once.
pub fn collect(errors: &mut ValidationErrors, field: &'static str, outcome: Result<(), ValidationError>) {
    if let Err(error) = outcome {
        errors.add(field, error);
    }
}

pub fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Trimmed view of a raw field; a missing field reads as empty.
pub fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

/// Trimmed owned value, `None` when missing or blank.
pub fn non_blank(value: &Option<String>) -> Option<String> {
    let trimmed = text(value);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
