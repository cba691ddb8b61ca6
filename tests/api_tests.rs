//! API integration tests
//!
//! These run against a live server with a clean database:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Register a fresh user and return their bearer token
async fn register_user(client: &Client, tag: &str) -> String {
    let email = format!(
        "{}-{}@example.com",
        tag,
        chrono_free_timestamp()
    );
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": tag,
            "email": email,
            "password": "secret-password"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Nanosecond-ish uniqueness without pulling extra dev-dependencies
fn chrono_free_timestamp() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// Post a book listing as multipart form, returning its ID
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("author", "Test Author")
        .text("condition", "good")
        .text("description", "A test listing");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    body["book"]["id"].as_i64().expect("No book id in response")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let email = format!("login-{}@example.com", chrono_free_timestamp());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Login Tester",
            "email": email,
            "password": "secret-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");

    // Wrong password is rejected
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_rejected() {
    let client = Client::new();
    let email = format!("dup-{}@example.com", chrono_free_timestamp());
    let payload = json!({
        "name": "Dup Tester",
        "email": email,
        "password": "secret-password"
    });

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_browse_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_auth() {
    let client = Client::new();
    let form = reqwest::multipart::Form::new()
        .text("title", "Unauthorized")
        .text("author", "Nobody")
        .text("condition", "good");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_book_validation() {
    let client = Client::new();
    let token = register_user(&client, "validation").await;

    // Empty title and bogus condition
    let form = reqwest::multipart::Form::new()
        .text("title", "")
        .text("author", "Someone")
        .text("condition", "mint");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["errors"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_update_foreign_book_is_not_found() {
    let client = Client::new();
    let owner = register_user(&client, "owner-mask").await;
    let other = register_user(&client, "other-mask").await;
    let book_id = create_book(&client, &owner, "Masked Book").await;

    let form = reqwest::multipart::Form::new()
        .text("title", "Hijacked")
        .text("author", "Mallory")
        .text("condition", "poor");

    // Not the owner: masked as 404, not 403
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", other))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_update_without_description_keeps_it() {
    let client = Client::new();
    let token = register_user(&client, "partial-update").await;
    let book_id = create_book(&client, &token, "Described Book").await;

    // Only title/author/condition in the form; description stays untouched
    let form = reqwest::multipart::Form::new()
        .text("title", "Described Book, 2nd ed.")
        .text("author", "Test Author")
        .text("condition", "fair");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["title"], "Described Book, 2nd ed.");
    assert_eq!(body["book"]["condition"], "fair");
    assert_eq!(body["book"]["description"], "A test listing");
}

#[tokio::test]
#[ignore]
async fn test_exchange_lifecycle() {
    let client = Client::new();
    let owner = register_user(&client, "lifecycle-owner").await;
    let requester = register_user(&client, "lifecycle-requester").await;
    let book_id = create_book(&client, &owner, "Lifecycle Book").await;

    // Requesting your own book fails
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "book_id": book_id, "message": "me please" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Requester sends a request
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", requester))
        .json(&json!({ "book_id": book_id, "message": "I'd love this book" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["request"]["id"].as_i64().unwrap();
    assert_eq!(body["request"]["status"], "pending");

    // Requester cannot decide their own request
    let response = client
        .put(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", requester))
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Owner accepts
    let response = client
        .put(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["request"]["status"], "accepted");
    assert_eq!(body["request"]["book"]["status"], "unavailable");

    // The book no longer appears as available
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "unavailable");

    // Second decision attempt fails: already processed
    let response = client
        .put(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "status": "declined" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Re-requesting the same book is a conflict even after processing
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", requester))
        .json(&json!({ "book_id": book_id, "message": "again?" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Accepted request can no longer be cancelled by the requester
    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", requester))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_cancel_pending_request() {
    let client = Client::new();
    let owner = register_user(&client, "cancel-owner").await;
    let requester = register_user(&client, "cancel-requester").await;
    let stranger = register_user(&client, "cancel-stranger").await;
    let book_id = create_book(&client, &owner, "Cancellable Book").await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", requester))
        .json(&json!({ "book_id": book_id, "message": "tentative" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["request"]["id"].as_i64().unwrap();

    // A stranger cannot see the request
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", stranger))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Only the requester can cancel it
    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", stranger))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", requester))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_image_upload_rules() {
    let client = Client::new();
    let token = register_user(&client, "uploader").await;

    // A small PNG is accepted and its public path recorded
    let png = vec![0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    let form = reqwest::multipart::Form::new()
        .text("title", "Illustrated Book")
        .text("author", "Painter")
        .text("condition", "excellent")
        .part(
            "image",
            reqwest::multipart::Part::bytes(png)
                .file_name("cover.png")
                .mime_str("image/png")
                .unwrap(),
        );

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let image_path = body["book"]["image_path"].as_str().expect("No image path");
    assert!(image_path.starts_with("/uploads/books/"));

    // A PDF under the image field is rejected
    let form = reqwest::multipart::Form::new()
        .text("title", "Paper Book")
        .text("author", "Clerk")
        .text("condition", "good")
        .part(
            "image",
            reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("scan.pdf")
                .mime_str("application/pdf")
                .unwrap(),
        );

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}
