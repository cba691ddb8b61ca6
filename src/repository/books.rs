//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, BookCondition, BookDetails, BookFields, BookSummary},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List available listings, optionally narrowed by title/author substring
    /// and exact condition. Newest first, owner name inlined.
    pub async fn list_available(
        &self,
        title: Option<&str>,
        author: Option<&str>,
        condition: Option<BookCondition>,
    ) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.author, b.condition, b.description, b.image_path,
                   b.owner_id, u.name AS owner_name, b.status, b.created_at, b.updated_at
            FROM books b
            JOIN users u ON u.id = b.owner_id
            WHERE b.status = 'available'
              AND ($1::text IS NULL OR b.title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR b.author ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR b.condition = $3)
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(condition.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get one listing with owner name and contact
    pub async fn get_details(&self, id: i32) -> AppResult<Option<BookDetails>> {
        let book = sqlx::query_as::<_, BookDetails>(
            r#"
            SELECT b.id, b.title, b.author, b.condition, b.description, b.image_path,
                   b.owner_id, u.name AS owner_name, u.email AS owner_email,
                   b.status, b.created_at, b.updated_at
            FROM books b
            JOIN users u ON u.id = b.owner_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    /// Get the raw listing row (no joins)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, condition, description, image_path,
                   owner_id, status, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    /// Insert a new listing owned by `owner_id`, status defaults to available
    pub async fn create(
        &self,
        owner_id: i32,
        fields: &BookFields,
        image_path: Option<&str>,
    ) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, condition, description, image_path, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, author, condition, description, image_path,
                      owner_id, status, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(fields.condition)
        .bind(&fields.description)
        .bind(image_path)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// All listings owned by a user, any status, newest first
    pub async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, condition, description, image_path,
                   owner_id, status, created_at, updated_at
            FROM books
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Ownership-scoped update. Returns None when no (id, owner) row matches,
    /// which the caller surfaces as not-found. Description and image path are
    /// only replaced when new values are supplied; an omitted field keeps its
    /// stored value.
    pub async fn update_owned(
        &self,
        id: i32,
        owner_id: i32,
        fields: &BookFields,
        image_path: Option<&str>,
    ) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, condition = $3,
                description = COALESCE($4, description),
                image_path = COALESCE($5, image_path), updated_at = NOW()
            WHERE id = $6 AND owner_id = $7
            RETURNING id, title, author, condition, description, image_path,
                      owner_id, status, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(fields.condition)
        .bind(&fields.description)
        .bind(image_path)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    /// Ownership-scoped delete. Returns false when no (id, owner) row matches.
    pub async fn delete_owned(&self, id: i32, owner_id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
