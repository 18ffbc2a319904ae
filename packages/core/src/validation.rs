// ABOUTME: Field-level validation for template create and update inputs
// ABOUTME: Token-grammar validation of the format string lives in kiln-numbering

use crate::types::{TemplateCreateInput, TemplateUpdateInput};

/// Validation errors for template data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates template data for creation
pub fn validate_template_data(data: &TemplateCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.company_id.trim().is_empty() {
        errors.push(ValidationError::new("company_id", "Company id is required"));
    }

    if data.format.trim().is_empty() {
        errors.push(ValidationError::new("format", "Format string is required"));
    }

    if let Some(last_number) = data.last_number {
        if last_number < 0 {
            errors.push(ValidationError::new(
                "last_number",
                "Sequence seed cannot be negative",
            ));
        }
    }

    errors
}

/// Validates template update data
pub fn validate_template_update(data: &TemplateUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(ref format) = data.format {
        if format.trim().is_empty() {
            errors.push(ValidationError::new(
                "format",
                "Format string cannot be empty",
            ));
        }
    }

    if let Some(last_number) = data.last_number {
        if last_number < 0 {
            errors.push(ValidationError::new(
                "last_number",
                "Sequence value cannot be negative",
            ));
        }
    }

    errors
}
