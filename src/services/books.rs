//! Book management service: catalog CRUD, filtering, borrow/return

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{
            Book, BookFilter, BookWithAuthor, BorrowBookRequest, CreateBook, UpdateBook,
            UploadedImage,
        },
        rental::RentalDetails,
    },
    repository::{EntityRepository, Page, PageRequest, Repository},
    services::images::ImageService,
    validation,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    images: ImageService,
}

impl BooksService {
    pub fn new(repository: Repository, images: ImageService) -> Self {
        Self { repository, images }
    }

    pub async fn get_page(&self, page_index: i64, page_size: i64) -> AppResult<Page<Book>> {
        let request = PageRequest::new(page_index, page_size)?;
        self.repository.books.get_page(&request).await
    }

    /// Filtered listing. The author name is resolved to an id first; an
    /// unknown author short-circuits to an empty result.
    pub async fn list_filtered(&self, filter: &BookFilter) -> AppResult<Vec<BookWithAuthor>> {
        let author_id = match filter.author_name.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(name) => match self.repository.authors.get_by_name(name).await? {
                Some(author) => Some(author.id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        self.repository
            .books
            .list_filtered(
                filter.title.as_deref().filter(|s| !s.trim().is_empty()),
                filter.genre.as_deref().filter(|s| !s.trim().is_empty()),
                author_id,
            )
            .await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BookWithAuthor> {
        self.repository
            .books
            .get_by_id_with_author(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<BookWithAuthor> {
        self.repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    /// Create a book. The author must exist and the ISBN must be free.
    pub async fn create(
        &self,
        book: CreateBook,
        image: Option<UploadedImage>,
    ) -> AppResult<Book> {
        validation::validate(&book)?;

        if self
            .repository
            .authors
            .get_by_id(book.author_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                book.author_id
            )));
        }

        if self.repository.books.get_by_isbn(&book.isbn).await?.is_some() {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists".to_string(),
            ));
        }

        let image_path = match image {
            Some(ref image) => Some(self.images.save(image).await?),
            None => None,
        };

        self.repository.books.create(&book, image_path.as_deref()).await
    }

    /// Update a book. The ISBN is re-checked only when it changes; a replaced
    /// cover image deletes the previous file.
    pub async fn update(
        &self,
        book: UpdateBook,
        image: Option<UploadedImage>,
    ) -> AppResult<Book> {
        validation::validate(&book)?;

        let existing = self
            .repository
            .books
            .get_by_id(book.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book.id)))?;

        if self
            .repository
            .authors
            .get_by_id(book.author_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                book.author_id
            )));
        }

        if book.isbn != existing.isbn
            && self.repository.books.get_by_isbn(&book.isbn).await?.is_some()
        {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists".to_string(),
            ));
        }

        let image_path = match image {
            Some(ref image) => Some(self.images.save(image).await?),
            None => None,
        };

        let updated = self.repository.books.update(&book, image_path.as_deref()).await?;

        // Drop the replaced file only once the row points at the new one
        if image_path.is_some() {
            if let Some(ref old) = existing.image_path {
                self.images.delete(old).await;
            }
        }

        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let book = self
            .repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        self.repository.books.delete_by_id(id).await?;

        if let Some(ref image_path) = book.image_path {
            self.images.delete(image_path).await;
        }

        Ok(())
    }

    /// Attach a new cover image to an existing book
    pub async fn upload_image(&self, id: i32, image: UploadedImage) -> AppResult<String> {
        let book = self
            .repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let image_path = self.images.save(&image).await?;
        self.repository.books.set_image_path(id, &image_path).await?;

        if let Some(ref old) = book.image_path {
            self.images.delete(old).await;
        }

        Ok(image_path)
    }

    /// Borrow a book for the authenticated user
    pub async fn borrow(&self, user_id: i32, request: &BorrowBookRequest) -> AppResult<Book> {
        validation::validate(request)?;

        self.repository
            .rentals
            .borrow(user_id, request.book_id, request.return_by)
            .await
    }

    /// Return a book previously borrowed by the authenticated user
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<Book> {
        self.repository.rentals.return_book(user_id, book_id).await
    }

    /// Active rentals of the authenticated user, with book and author data
    pub async fn user_rentals(&self, user_id: i32) -> AppResult<Vec<RentalDetails>> {
        self.repository.rentals.list_for_user(user_id).await
    }
}
