//! Rental (active loan) types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Rental joined with book and author data for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalDetails {
    pub book_id: i32,
    pub title: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub author_name: String,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub return_by: Option<DateTime<Utc>>,
}
