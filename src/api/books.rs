//! Book catalog and borrowing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookWithAuthor, BorrowBookRequest, CreateBook, UpdateBook},
    models::rental::RentalDetails,
};

use super::{forms, AuthenticatedUser, PaginationQuery};

/// Image upload result
#[derive(Serialize, ToSchema)]
pub struct UploadImageResponse {
    /// Public path of the stored image
    pub image_path: String,
}

/// List books page by page
#[utoipa::path(
    get,
    path = "/books/paginated",
    tag = "books",
    security(("bearer_auth" = [])),
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of books", body = crate::repository::BookPage),
        (status = 400, description = "Invalid page parameters"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books_paginated(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<PaginationQuery>,
) -> AppResult<Json<crate::repository::Page<Book>>> {
    let page = state
        .services
        .books
        .get_page(query.page_index(), query.page_size())
        .await?;
    Ok(Json(page))
}

/// List books with optional filters
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookFilter),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookWithAuthor>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(filter): Query<BookFilter>,
) -> AppResult<Json<Vec<BookWithAuthor>>> {
    let books = state.services.books.list_filtered(&filter).await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookWithAuthor),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookWithAuthor>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Get book details by ISBN
#[utoipa::path(
    get,
    path = "/books/isbn/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book details", body = BookWithAuthor),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_by_isbn(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookWithAuthor>> {
    let book = state.services.books.get_by_isbn(&isbn).await?;
    Ok(Json(book))
}

/// Create a new book (multipart form with optional cover image)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "ISBN already taken")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;

    let form = forms::read_form(multipart).await?;
    let book = CreateBook {
        isbn: form.required("isbn")?,
        title: form.required("title")?,
        genre: form.optional("genre"),
        description: form.optional("description"),
        author_id: form.parse("author_id")?,
    };

    let created = state.services.books.create(book, form.image).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing book (multipart form with optional cover image)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Book or author not found"),
        (status = 409, description = "ISBN already taken")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;

    let form = forms::read_form(multipart).await?;
    let book = UpdateBook {
        id,
        isbn: form.required("isbn")?,
        title: form.required("title")?,
        genre: form.optional("genre"),
        description: form.optional("description"),
        author_id: form.parse("author_id")?,
    };

    let updated = state.services.books.update(book, form.image).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow a book as the authenticated user
#[utoipa::path(
    post,
    path = "/books/borrow",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BorrowBookRequest,
    responses(
        (status = 200, description = "Book borrowed", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowBookRequest>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .borrow(claims.user_id, &request)
        .await?;
    Ok(Json(book))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/return/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Book),
        (status = 404, description = "No active rental for this book")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.return_book(claims.user_id, id).await?;
    Ok(Json(book))
}

/// List the active rentals of the authenticated user
#[utoipa::path(
    get,
    path = "/books/user/rentals",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active rentals", body = Vec<RentalDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn user_rentals(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RentalDetails>>> {
    let rentals = state.services.books.user_rentals(claims.user_id).await?;
    Ok(Json(rentals))
}

/// Attach a cover image to a book
#[utoipa::path(
    post,
    path = "/books/{id}/upload-image",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Missing or oversized image"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn upload_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<UploadImageResponse>> {
    claims.require_admin()?;

    let form = forms::read_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| AppError::BadRequest("Image file is required".to_string()))?;

    let image_path = state.services.books.upload_image(id, image).await?;
    Ok(Json(UploadImageResponse { image_path }))
}
