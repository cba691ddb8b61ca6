//! Exchange requests repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{
        book::{BookCondition, BookStatus},
        request::{BookRequest, RequestBook, RequestDetails, RequestStatus},
        user::UserPublic,
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.message, r.status, r.created_at, r.updated_at,
           b.id AS book_id, b.title, b.author, b.condition, b.image_path,
           b.owner_id, b.status AS book_status, o.name AS owner_name,
           u.id AS requester_id, u.name AS requester_name, u.email AS requester_email
    FROM book_requests r
    JOIN books b ON b.id = r.book_id
    JOIN users o ON o.id = b.owner_id
    JOIN users u ON u.id = r.requester_id
"#;

fn details_from_row(row: &sqlx::postgres::PgRow) -> RequestDetails {
    RequestDetails {
        id: row.get("id"),
        message: row.get("message"),
        status: row.get::<RequestStatus, _>("status"),
        book: RequestBook {
            id: row.get("book_id"),
            title: row.get("title"),
            author: row.get("author"),
            condition: row.get::<BookCondition, _>("condition"),
            image_path: row.get("image_path"),
            owner_id: row.get("owner_id"),
            owner_name: row.get("owner_name"),
            status: row.get::<BookStatus, _>("book_status"),
        },
        requester: UserPublic {
            id: row.get("requester_id"),
            name: row.get("requester_name"),
            email: Some(row.get("requester_email")),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get raw request row by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<BookRequest>> {
        let request = sqlx::query_as::<_, BookRequest>(
            r#"
            SELECT id, book_id, requester_id, message, status, created_at, updated_at
            FROM book_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    /// Get request with book and requester inlined
    pub async fn get_details(&self, id: i32) -> AppResult<Option<RequestDetails>> {
        let row = sqlx::query(&format!("{} WHERE r.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(details_from_row))
    }

    /// Whether any request exists for (book, requester), regardless of status
    pub async fn exists_for(&self, book_id: i32, requester_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_requests WHERE book_id = $1 AND requester_id = $2)",
        )
        .bind(book_id)
        .bind(requester_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new request in pending state
    pub async fn create(
        &self,
        book_id: i32,
        requester_id: i32,
        message: &str,
    ) -> AppResult<BookRequest> {
        let request = sqlx::query_as::<_, BookRequest>(
            r#"
            INSERT INTO book_requests (book_id, requester_id, message)
            VALUES ($1, $2, $3)
            RETURNING id, book_id, requester_id, message, status, created_at, updated_at
            "#,
        )
        .bind(book_id)
        .bind(requester_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    /// Requests against the listings of `owner_id`, newest first
    pub async fn list_received(&self, owner_id: i32) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE b.owner_id = $1 ORDER BY r.created_at DESC",
            DETAILS_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Requests created by `requester_id`, newest first
    pub async fn list_sent(&self, requester_id: i32) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE r.requester_id = $1 ORDER BY r.created_at DESC",
            DETAILS_SELECT
        ))
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Record the owner's decision. When the decision is an acceptance, the
    /// referenced book is marked unavailable in the same transaction so a
    /// crash cannot leave an accepted request against an available listing.
    pub async fn decide(
        &self,
        request_id: i32,
        book_id: i32,
        status: RequestStatus,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE book_requests SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status)
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        if status == RequestStatus::Accepted {
            sqlx::query("UPDATE books SET status = 'unavailable', updated_at = NOW() WHERE id = $1")
                .bind(book_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a request, but only while it is still pending and only for its
    /// requester. Returns false when no such row matches.
    pub async fn delete_pending(&self, id: i32, requester_id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM book_requests WHERE id = $1 AND requester_id = $2 AND status = 'pending'",
        )
        .bind(id)
        .bind(requester_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
