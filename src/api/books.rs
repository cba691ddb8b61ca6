//! Book listing endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookFields, BookQuery, BookSummary},
    services::uploads::UploadedFile,
};

use super::{AuthenticatedUser, MaybeUser};

/// Mutation response: the affected listing plus a human-readable message
#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub message: String,
    pub book: BookDetails,
}

/// Plain confirmation message
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Collect listing fields and the optional image from a multipart form.
/// Unknown fields are drained and ignored.
async fn parse_book_form(mut multipart: Multipart) -> AppResult<(BookFields, Option<UploadedFile>)> {
    let mut title = String::new();
    let mut author = String::new();
    let mut condition = String::new();
    let mut description: Option<String> = None;
    let mut image: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = field.text().await?.trim().to_string(),
            "author" => author = field.text().await?.trim().to_string(),
            "condition" => condition = field.text().await?.trim().to_string(),
            "description" => {
                let text = field.text().await?;
                let text = text.trim();
                if !text.is_empty() {
                    description = Some(text.to_string());
                }
            }
            "image" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                image = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {
                field.bytes().await?;
            }
        }
    }

    let condition = condition
        .parse()
        .map_err(|_| AppError::validation("condition", "Invalid condition"))?;

    Ok((
        BookFields {
            title,
            author,
            condition,
            description,
        },
        image,
    ))
}

/// List all available listings
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Available listings, newest first", body = Vec<BookSummary>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    _maybe_user: MaybeUser,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.books.search(&BookQuery::default()).await?;
    Ok(Json(books))
}

/// Search available listings
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching listings, newest first", body = Vec<BookSummary>),
        (status = 400, description = "Invalid condition filter")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    _maybe_user: MaybeUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.books.search(&query).await?;
    Ok(Json(books))
}

/// Get one listing with owner contact details
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Listing details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    _maybe_user: MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Create a new listing (multipart form with optional image)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Listing created", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let (fields, image) = parse_book_form(multipart).await?;
    let book = state
        .services
        .books
        .create(claims.user_id, fields, image)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            message: "Book posted successfully".to_string(),
            book,
        }),
    ))
}

/// List the caller's own listings, any status
#[utoipa::path(
    get,
    path = "/books/my/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's listings, newest first", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_mine(claims.user_id).await?;
    Ok(Json(books))
}

/// Update an owned listing (multipart form; image replaced only when supplied)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Listing updated", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found or not owned by caller")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<BookResponse>> {
    let (fields, image) = parse_book_form(multipart).await?;
    let book = state
        .services
        .books
        .update(id, claims.user_id, fields, image)
        .await?;

    Ok(Json(BookResponse {
        message: "Book updated successfully".to_string(),
        book,
    }))
}

/// Delete an owned listing
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Listing deleted", body = MessageResponse),
        (status = 404, description = "Book not found or not owned by caller")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete(id, claims.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
