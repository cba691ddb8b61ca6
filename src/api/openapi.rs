//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, requests};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookSwap API",
        version = "0.1.0",
        description = "Peer-to-peer book exchange REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::profile,
        // Books
        books::list_books,
        books::search_books,
        books::get_book,
        books::create_book,
        books::my_books,
        books::update_book,
        books::delete_book,
        // Requests
        requests::create_request,
        requests::received_requests,
        requests::sent_requests,
        requests::get_request,
        requests::update_request_status,
        requests::delete_request,
    ),
    components(
        schemas(
            // Auth
            auth::AuthResponse,
            crate::models::user::User,
            crate::models::user::UserPublic,
            crate::models::user::RegisterUser,
            crate::models::user::LoginUser,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetails,
            crate::models::book::BookCondition,
            crate::models::book::BookStatus,
            crate::models::book::BookQuery,
            books::BookResponse,
            books::MessageResponse,
            // Requests
            crate::models::request::RequestBook,
            crate::models::request::RequestDetails,
            crate::models::request::RequestStatus,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequestStatus,
            requests::RequestResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::FieldError,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Book listing management"),
        (name = "requests", description = "Exchange request lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
