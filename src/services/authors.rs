//! Author management service

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::Book,
    },
    repository::{EntityRepository, Page, PageRequest, Repository},
    validation,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_page(&self, page_index: i64, page_size: i64) -> AppResult<Page<Author>> {
        let request = PageRequest::new(page_index, page_size)?;
        self.repository.authors.get_page(&request).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.repository
            .authors
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Create an author. The full name must be unique (exact match).
    pub async fn create(&self, author: CreateAuthor) -> AppResult<Author> {
        validation::validate(&author)?;

        if let Some(existing) = self
            .repository
            .authors
            .get_by_name(&author.full_name())
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Author {} already exists",
                existing.full_name()
            )));
        }

        self.repository.authors.create(&author).await
    }

    /// Update an author. When the rename changes the full name, the new name
    /// must not collide with another author.
    pub async fn update(&self, author: UpdateAuthor) -> AppResult<Author> {
        validation::validate(&author)?;

        let existing = self.get_by_id(author.id).await?;

        if existing.full_name() != author.full_name()
            && self
                .repository
                .authors
                .get_by_name(&author.full_name())
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Author {} already exists",
                author.full_name()
            )));
        }

        self.repository.authors.update(&author).await
    }

    /// Delete an author. Fails while any book still references it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        let books = self.repository.books.list_by_author(id).await?;
        if !books.is_empty() {
            return Err(AppError::Conflict(
                "Cannot delete an author who still has books".to_string(),
            ));
        }

        self.repository.authors.delete_by_id(id).await?;

        Ok(())
    }

    pub async fn books_by_author(&self, id: i32) -> AppResult<Vec<Book>> {
        self.get_by_id(id).await?;
        self.repository.books.list_by_author(id).await
    }
}
