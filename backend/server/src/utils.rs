use std::ops::RangeInclusive;

use serde::Serialize;

use crate::models::{NewThought, ValidThought};

pub const MESSAGE_LENGTH: RangeInclusive<usize> = 5..=140;
pub const NAME_LENGTH: RangeInclusive<usize> = 1..=20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trims and bounds-checks a thought before it reaches the store.
///
/// Every failing field is reported, not just the first.
pub fn validate_thought(payload: NewThought) -> Result<ValidThought, Vec<FieldError>> {
    let mut errors = Vec::new();

    let message = check_field("message", payload.message, MESSAGE_LENGTH, &mut errors);
    let name = check_field("name", payload.name, NAME_LENGTH, &mut errors);

    match (message, name) {
        (Some(message), Some(name)) if errors.is_empty() => Ok(ValidThought { message, name }),
        _ => Err(errors),
    }
}

fn check_field(
    field: &'static str,
    value: Option<String>,
    bounds: RangeInclusive<usize>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let Some(value) = value else {
        errors.push(FieldError::new(field, format!("{field} is required")));
        return None;
    };

    let trimmed = value.trim();
    let length = trimmed.chars().count();

    if length == 0 {
        errors.push(FieldError::new(field, format!("{field} is required")));
        return None;
    }

    if length < *bounds.start() {
        errors.push(FieldError::new(
            field,
            format!(
                "{field} must be at least {} characters, got {length}",
                bounds.start()
            ),
        ));
        return None;
    }

    if length > *bounds.end() {
        errors.push(FieldError::new(
            field,
            format!(
                "{field} must be at most {} characters, got {length}",
                bounds.end()
            ),
        ));
        return None;
    }

    Some(trimmed.to_string())
}

pub fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
