//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, BookWithAuthor, CreateBook, UpdateBook},
    repository::{fetch_page, EntityRepository, Page, PageRequest},
};

const WITH_AUTHOR: &str = r#"
    SELECT b.id, b.isbn, b.title, b.genre, b.description, b.image_path,
           b.author_id, a.first_name || ' ' || a.last_name AS author_name,
           b.is_borrowed, b.borrowed_at, b.return_by
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id_with_author(&self, id: i32) -> AppResult<Option<BookWithAuthor>> {
        let book =
            sqlx::query_as::<_, BookWithAuthor>(&format!("{} WHERE b.id = $1", WITH_AUTHOR))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(book)
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<BookWithAuthor>> {
        let book =
            sqlx::query_as::<_, BookWithAuthor>(&format!("{} WHERE b.isbn = $1", WITH_AUTHOR))
                .bind(isbn)
                .fetch_optional(&self.pool)
                .await?;

        Ok(book)
    }

    /// Optional filters combined with AND: title substring, genre exact,
    /// author id exact. A None filter matches everything.
    pub async fn list_filtered(
        &self,
        title: Option<&str>,
        genre: Option<&str>,
        author_id: Option<i32>,
    ) -> AppResult<Vec<BookWithAuthor>> {
        let books = sqlx::query_as::<_, BookWithAuthor>(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR b.title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR b.genre = $2)
              AND ($3::int IS NULL OR b.author_id = $3)
            ORDER BY b.id
            "#,
            WITH_AUTHOR
        ))
        .bind(title)
        .bind(genre)
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let books =
            sqlx::query_as::<_, Book>("SELECT * FROM books WHERE author_id = $1 ORDER BY id")
                .bind(author_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(books)
    }

    pub async fn create(&self, book: &CreateBook, image_path: Option<&str>) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, genre, description, image_path, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(image_path)
        .bind(book.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Updates descriptive fields; borrow state columns are owned by the
    /// rentals repository and left untouched here.
    pub async fn update(&self, book: &UpdateBook, image_path: Option<&str>) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET isbn = $1, title = $2, genre = $3, description = $4,
                image_path = COALESCE($5, image_path), author_id = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(image_path)
        .bind(book.author_id)
        .bind(book.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn set_image_path(&self, id: i32, image_path: &str) -> AppResult<()> {
        sqlx::query("UPDATE books SET image_path = $1 WHERE id = $2")
            .bind(image_path)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl EntityRepository<Book> for BooksRepository {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_page(&self, request: &PageRequest) -> AppResult<Page<Book>> {
        fetch_page(&self.pool, "books", request).await
    }
}
