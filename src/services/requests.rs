//! Exchange request lifecycle service.
//!
//! Requests start pending and are decided exactly once by the listing owner.
//! Accepting a request also takes the listing off the market; both writes
//! happen in one database transaction (see the repository).

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookStatus,
        request::{CreateRequest, RequestDetails, RequestStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new pending request against an available listing.
    /// Re-requesting a book is blocked even after a decline: one request per
    /// (book, requester) pair, ever.
    pub async fn create(
        &self,
        requester_id: i32,
        payload: CreateRequest,
    ) -> AppResult<RequestDetails> {
        payload.validate()?;

        let book = self
            .repository
            .books
            .get_by_id(payload.book_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Book not available".to_string()))?;

        // Own-listing and duplicate checks come before the availability
        // check: both apply regardless of the listing's current status.
        if book.owner_id == requester_id {
            return Err(AppError::BadRequest("Cannot request your own book".to_string()));
        }

        if self
            .repository
            .requests
            .exists_for(payload.book_id, requester_id)
            .await?
        {
            return Err(AppError::Conflict("Request already exists".to_string()));
        }

        if book.status != BookStatus::Available {
            return Err(AppError::BadRequest("Book not available".to_string()));
        }

        let request = self
            .repository
            .requests
            .create(payload.book_id, requester_id, payload.message.trim())
            .await?;

        tracing::info!(
            "User {} requested book {} (request {})",
            requester_id,
            payload.book_id,
            request.id
        );

        self.repository
            .requests
            .get_details(request.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created request vanished".to_string()))
    }

    /// Accept or decline a pending request. Only the owner of the requested
    /// book may decide, and only once.
    pub async fn decide(
        &self,
        request_id: i32,
        decider_id: i32,
        new_status: RequestStatus,
    ) -> AppResult<RequestDetails> {
        if !new_status.is_terminal() {
            return Err(AppError::validation(
                "status",
                "Status must be either accepted or declined",
            ));
        }

        let request = self
            .repository
            .requests
            .get_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        let book = self
            .repository
            .books
            .get_by_id(request.book_id)
            .await?
            .ok_or_else(|| AppError::Internal("Request references a missing book".to_string()))?;

        if book.owner_id != decider_id {
            return Err(AppError::Authorization(
                "Not authorized to decide this request".to_string(),
            ));
        }

        if !request.status.can_transition_to(new_status) {
            return Err(AppError::Conflict(
                "Request has already been processed".to_string(),
            ));
        }

        self.repository
            .requests
            .decide(request_id, request.book_id, new_status)
            .await?;

        tracing::info!(
            "User {} {} request {} for book {}",
            decider_id,
            new_status,
            request_id,
            request.book_id
        );

        self.repository
            .requests
            .get_details(request_id)
            .await?
            .ok_or_else(|| AppError::Internal("Decided request vanished".to_string()))
    }

    /// Cancel (delete) a pending request. Only the requester may cancel, and
    /// only while the request is still pending; everything else is reported
    /// as not-found.
    pub async fn cancel(&self, request_id: i32, requester_id: i32) -> AppResult<()> {
        let deleted = self
            .repository
            .requests
            .delete_pending(request_id, requester_id)
            .await?;
        if !deleted {
            return Err(AppError::NotFound(
                "Request not found or cannot be cancelled".to_string(),
            ));
        }
        Ok(())
    }

    /// Requests received against the caller's listings
    pub async fn list_received(&self, owner_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_received(owner_id).await
    }

    /// Requests the caller has sent
    pub async fn list_sent(&self, requester_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_sent(requester_id).await
    }

    /// Get one request, visible only to the requester or the book's owner
    pub async fn get(&self, request_id: i32, caller_id: i32) -> AppResult<RequestDetails> {
        let details = self
            .repository
            .requests
            .get_details(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        if details.requester.id != caller_id && details.book.owner_id != caller_id {
            return Err(AppError::Authorization(
                "Not authorized to view this request".to_string(),
            ));
        }

        Ok(details)
    }
}
