//! Input validation helpers
//!
//! Field rules live on the DTOs as `validator` derives; this module turns
//! rule failures into a structured list of field/message pairs instead of a
//! panic or an opaque string, so the HTTP layer can echo them back verbatim.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::AppResult;

/// A single failed field rule
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected validation failures for one input shape
#[derive(Debug, Clone)]
pub struct ValidationFailure(Vec<FieldError>);

impl ValidationFailure {
    /// A failure for a single field, for rules checked outside the derive
    pub fn single(field: &str, message: &str) -> Self {
        ValidationFailure(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.0
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationFailure {}

impl From<validator::ValidationErrors> for ValidationFailure {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        for (field, kinds) in errors.field_errors() {
            for error in kinds {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed rule '{}'", error.code));
                fields.push(FieldError {
                    field: field.to_string(),
                    message,
                });
            }
        }
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationFailure(fields)
    }
}

/// Run the derive-based rules of a DTO, mapping failures to `AppError::Validation`
pub fn validate<T: Validate>(dto: &T) -> AppResult<()> {
    dto.validate().map_err(ValidationFailure::from)?;
    Ok(())
}

/// Rule: a date of birth must lie strictly in the past
pub fn date_in_past(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < Utc::now().date_naive() {
        Ok(())
    } else {
        let mut error = ValidationError::new("date_in_past");
        error.message = Some("date must be in the past".into());
        Err(error)
    }
}

/// Rule: a return deadline must lie strictly in the future
pub fn date_in_future(date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *date > Utc::now() {
        Ok(())
    } else {
        let mut error = ValidationError::new("date_in_future");
        error.message = Some("date must be in the future".into());
        Err(error)
    }
}
