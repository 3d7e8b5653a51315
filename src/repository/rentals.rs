//! Rentals repository for database operations
//!
//! The borrow and return flows each touch two tables (the rental record and
//! the denormalized borrow state on the book), so both run inside a single
//! transaction with the book row locked first.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, rental::RentalDetails},
};

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All active rentals for a user, joined with book and author data
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(
            r#"
            SELECT b.id AS book_id, b.title, b.genre, b.description,
                   a.first_name || ' ' || a.last_name AS author_name,
                   b.borrowed_at, b.return_by
            FROM rentals r
            JOIN books b ON b.id = r.book_id
            JOIN authors a ON a.id = b.author_id
            WHERE r.user_id = $1
            ORDER BY b.borrowed_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Borrow a book: creates the rental record and flips the borrow state
    /// on the book in one transaction. The row lock serializes concurrent
    /// borrow attempts on the same book.
    pub async fn borrow(
        &self,
        user_id: i32,
        book_id: i32,
        return_by: DateTime<Utc>,
    ) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book.is_borrowed {
            return Err(AppError::Conflict("Book is already borrowed".to_string()));
        }

        sqlx::query("INSERT INTO rentals (user_id, book_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET is_borrowed = TRUE, borrowed_at = $1, return_by = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(return_by)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Return a book: removes the user's rental record and clears the borrow
    /// state on the book in one transaction.
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM rentals WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "No active rental found for this book".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET is_borrowed = FALSE, borrowed_at = NULL, return_by = NULL
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }
}
