//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod rentals;
pub mod users;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Pool, Postgres};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::validation::ValidationFailure;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated pagination request. Page indices start at 1.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page_index: i64,
    page_size: i64,
}

impl PageRequest {
    /// Rejects out-of-range indices and sizes instead of clamping them
    pub fn new(page_index: i64, page_size: i64) -> AppResult<Self> {
        if page_index < 1 {
            return Err(ValidationFailure::single(
                "page_index",
                "Page index must be greater than 0",
            )
            .into());
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(ValidationFailure::single(
                "page_size",
                "Page size must be between 1 and 100",
            )
            .into());
        }
        Ok(Self {
            page_index,
            page_size,
        })
    }

    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page_index - 1) * self.page_size
    }

    /// Total page count for a row count: ceil(count / size)
    pub fn total_pages(&self, count: i64) -> i64 {
        (count + self.page_size - 1) / self.page_size
    }
}

/// One page of results plus paging metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(
    AuthorPage = Page<crate::models::author::Author>,
    BookPage = Page<crate::models::book::Book>
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, count: i64) -> Self {
        let total_pages = request.total_pages(count);
        Self {
            items,
            page_index: request.page_index(),
            total_pages,
            has_previous_page: request.page_index() > 1,
            has_next_page: request.page_index() < total_pages,
        }
    }
}

/// Generic CRUD + pagination capability implemented by each entity repository
#[async_trait]
pub trait EntityRepository<T> {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<T>>;
    async fn list(&self) -> AppResult<Vec<T>>;
    /// Returns false when no row matched the id
    async fn delete_by_id(&self, id: i32) -> AppResult<bool>;
    async fn get_page(&self, request: &PageRequest) -> AppResult<Page<T>>;
}

/// Shared ordered LIMIT/OFFSET pagination over a whole table.
/// `table` is always a compile-time constant owned by the calling repository.
pub(crate) async fn fetch_page<T>(
    pool: &Pool<Postgres>,
    table: &str,
    request: &PageRequest,
) -> AppResult<Page<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let items = sqlx::query_as::<_, T>(&format!(
        "SELECT * FROM {} ORDER BY id LIMIT $1 OFFSET $2",
        table
    ))
    .bind(request.limit())
    .bind(request.offset())
    .fetch_all(pool)
    .await?;

    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;

    Ok(Page::new(items, request, count))
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub rentals: rentals::RentalsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            rentals: rentals::RentalsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_page_parameters() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(-3, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());
        assert!(PageRequest::new(1, 1).is_ok());
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest::new(3, 10).unwrap();
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::new(1, 10).unwrap();
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(10), 1);
        assert_eq!(request.total_pages(11), 2);
        assert_eq!(request.total_pages(95), 10);
    }

    #[test]
    fn page_metadata() {
        let request = PageRequest::new(2, 5).unwrap();
        let page = Page::new(vec![1i32, 2, 3, 4, 5], &request, 12);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous_page);
        assert!(page.has_next_page);

        let last = PageRequest::new(3, 5).unwrap();
        let page = Page::new(vec![1i32, 2], &last, 12);
        assert!(!page.has_next_page);
    }
}
