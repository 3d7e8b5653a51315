//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validation::date_in_future;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub author_id: i32,
    pub is_borrowed: bool,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub return_by: Option<DateTime<Utc>>,
}

/// Book joined with its author, for detail views and filtered listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookWithAuthor {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub author_id: i32,
    pub author_name: String,
    pub is_borrowed: bool,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub return_by: Option<DateTime<Utc>>,
}

/// Create book request (multipart form fields, image handled separately)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 20, message = "ISBN must be 1 to 20 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(max = 30, message = "Genre must not exceed 30 characters"))]
    pub genre: Option<String>,
    #[validate(length(max = 400, message = "Description must not exceed 400 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Author id must be greater than 0"))]
    pub author_id: i32,
}

/// Update book request (multipart form fields, image handled separately)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(range(min = 1, message = "Id must be greater than 0"))]
    pub id: i32,
    #[validate(length(min = 1, max = 20, message = "ISBN must be 1 to 20 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(max = 30, message = "Genre must not exceed 30 characters"))]
    pub genre: Option<String>,
    #[validate(length(max = 400, message = "Description must not exceed 400 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Author id must be greater than 0"))]
    pub author_id: i32,
}

/// Filter parameters for book listings. All filters combine with AND.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BookFilter {
    /// Substring match on title
    pub title: Option<String>,
    /// Exact match on genre
    pub genre: Option<String>,
    /// Full author name, resolved to an author id before filtering
    pub author_name: Option<String>,
}

/// Borrow request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BorrowBookRequest {
    #[validate(range(min = 1, message = "Book id must be greater than 0"))]
    pub book_id: i32,
    #[validate(custom(function = date_in_future))]
    pub return_by: DateTime<Utc>,
}

/// An image attached to a multipart book form
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub data: Vec<u8>,
}
