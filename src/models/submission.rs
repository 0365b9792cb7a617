use std::str::FromStr;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::EventMode;

// Declarative schema for the ten scalar form fields. Every constraint is
// checked independently so a failed validation reports all violated
// fields at once, keyed per field. The list fields (tags, agenda) and
// the image are application-level state and are checked by the draft,
// not here.
#[derive(Debug, Clone, Default, Validate)]
pub struct EventSubmission {
    #[validate(length(min = 5, max = 100, message = "Title must be at least 5 characters"))]
    pub title: String,

    #[validate(length(min = 2, message = "Organizer name is too short"))]
    pub organizer: String,

    #[validate(length(min = 10, max = 500, message = "Overview should be at least 10 characters"))]
    pub overview: String,

    #[validate(length(min = 20, max = 1000, message = "Description should be more detailed"))]
    pub description: String,

    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,

    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,

    #[validate(custom(function = validate_mode))]
    pub mode: String,

    #[validate(length(min = 2, message = "Venue is required"))]
    pub venue: String,

    #[validate(length(min = 2, message = "Location is required"))]
    pub location: String,

    #[validate(length(min = 2, message = "Target audience is required"))]
    pub audience: String,
}

fn validate_mode(mode: &str) -> Result<(), ValidationError> {
    if EventMode::from_str(mode).is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("mode");
    err.message = Some("Mode must be online, offline or hybrid".into());
    Err(err)
}

// Flattens per-field violations into one deterministic human-readable
// string, e.g. "title: Title must be at least 5 characters"
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    let parts: Vec<String> = fields
        .into_iter()
        .map(|(field, errs)| {
            let detail: Vec<String> = errs
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            if detail.is_empty() {
                field.to_string()
            } else {
                format!("{}: {}", field, detail.join(", "))
            }
        })
        .collect();

    parts.join("; ")
}
