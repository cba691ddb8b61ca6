//! Exchange request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::request::{CreateRequest, RequestDetails, UpdateRequestStatus},
};

use super::{books::MessageResponse, AuthenticatedUser};

/// Mutation response: the affected request plus a human-readable message
#[derive(Serialize, ToSchema)]
pub struct RequestResponse {
    pub message: String,
    pub request: RequestDetails,
}

/// Request a book from another user
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request sent", body = RequestResponse),
        (status = 400, description = "Book unavailable or own listing"),
        (status = 409, description = "Request already exists for this book")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestResponse>)> {
    let request = state
        .services
        .requests
        .create(claims.user_id, payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RequestResponse {
            message: "Request sent successfully".to_string(),
            request,
        }),
    ))
}

/// Requests received against the caller's listings
#[utoipa::path(
    get,
    path = "/requests/received",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Received requests, newest first", body = Vec<RequestDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn received_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state.services.requests.list_received(claims.user_id).await?;
    Ok(Json(requests))
}

/// Requests the caller has sent
#[utoipa::path(
    get,
    path = "/requests/sent",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sent requests, newest first", body = Vec<RequestDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn sent_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state.services.requests.list_sent(claims.user_id).await?;
    Ok(Json(requests))
}

/// Get one request (requester or listing owner only)
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = RequestDetails),
        (status = 403, description = "Caller is neither requester nor owner"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RequestDetails>> {
    let request = state.services.requests.get(id, claims.user_id).await?;
    Ok(Json(request))
}

/// Accept or decline a pending request (listing owner only)
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Request decided", body = RequestResponse),
        (status = 403, description = "Caller does not own the listing"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already processed")
    )
)]
pub async fn update_request_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRequestStatus>,
) -> AppResult<Json<RequestResponse>> {
    let request = state
        .services
        .requests
        .decide(id, claims.user_id, payload.status)
        .await?;

    Ok(Json(RequestResponse {
        message: "Request updated successfully".to_string(),
        request,
    }))
}

/// Cancel a pending request (requester only)
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request cancelled", body = MessageResponse),
        (status = 404, description = "Request not found or not cancellable")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.requests.cancel(id, claims.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Request cancelled successfully".to_string(),
    }))
}
