//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::date_in_past;

/// Author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub country: String,
}

impl Author {
    /// Full name as used for uniqueness checks and author-name filtering
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 30, message = "First name must be 1 to 30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1 to 30 characters"))]
    pub last_name: String,
    #[validate(custom(function = date_in_past))]
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

impl CreateAuthor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Update author request (submitted as a multipart form)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(range(min = 1, message = "Id must be greater than 0"))]
    pub id: i32,
    #[validate(length(min = 1, max = 30, message = "First name must be 1 to 30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1 to 30 characters"))]
    pub last_name: String,
    #[validate(custom(function = date_in_past))]
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

impl UpdateAuthor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
