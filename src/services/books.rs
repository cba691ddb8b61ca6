//! Book listing management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookCondition, BookDetails, BookFields, BookQuery, BookSummary},
    repository::Repository,
    services::uploads::{UploadService, UploadedFile},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    uploads: UploadService,
}

impl BooksService {
    pub fn new(repository: Repository, uploads: UploadService) -> Self {
        Self { repository, uploads }
    }

    /// Browse available listings, optionally filtered
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let condition = match query.condition.as_deref() {
            Some(s) if !s.is_empty() => Some(
                s.parse::<BookCondition>()
                    .map_err(|_| AppError::validation("condition", "Invalid condition"))?,
            ),
            _ => None,
        };

        self.repository
            .books
            .list_available(query.title.as_deref(), query.author.as_deref(), condition)
            .await
    }

    /// Get one listing with owner contact details
    pub async fn get(&self, id: i32) -> AppResult<BookDetails> {
        self.repository
            .books
            .get_details(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Create a listing owned by the caller, storing the image if provided
    pub async fn create(
        &self,
        owner_id: i32,
        fields: BookFields,
        image: Option<UploadedFile>,
    ) -> AppResult<BookDetails> {
        fields.validate()?;

        let image_path = match image {
            Some(file) => Some(self.uploads.store("image", &file).await?),
            None => None,
        };

        let book = self
            .repository
            .books
            .create(owner_id, &fields, image_path.as_deref())
            .await?;

        tracing::info!("User {} listed book {} ({})", owner_id, book.id, book.title);

        self.repository
            .books
            .get_details(book.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created book vanished".to_string()))
    }

    /// All of the caller's own listings, any status
    pub async fn list_mine(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_owner(owner_id).await
    }

    /// Ownership-scoped update. A non-owner gets the same not-found as a
    /// missing record so listing existence is not leaked.
    pub async fn update(
        &self,
        id: i32,
        owner_id: i32,
        fields: BookFields,
        image: Option<UploadedFile>,
    ) -> AppResult<BookDetails> {
        fields.validate()?;

        let image_path = match image {
            Some(file) => Some(self.uploads.store("image", &file).await?),
            None => None,
        };

        let book = self
            .repository
            .books
            .update_owned(id, owner_id, &fields, image_path.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        self.repository
            .books
            .get_details(book.id)
            .await?
            .ok_or_else(|| AppError::Internal("Updated book vanished".to_string()))
    }

    /// Ownership-scoped delete, same masking as update
    pub async fn delete(&self, id: i32, owner_id: i32) -> AppResult<()> {
        let deleted = self.repository.books.delete_owned(id, owner_id).await?;
        if !deleted {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }
}
