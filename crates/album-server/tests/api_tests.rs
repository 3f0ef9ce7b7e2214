use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use album_db::run_migrations;
use album_server::{create_router, AppState};

/// Create a test app over a fresh in-memory database. A single connection
/// keeps every request on the same database.
async fn create_test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    create_router(AppState::new(pool))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    acting_user: Option<i64>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = acting_user {
        builder = builder.header("x-user-id", id.to_string());
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn user_body(name: &str, email: &str) -> Value {
    json!({ "name": name, "email": email, "password": "12345678" })
}

/// Register a user and return its id.
async fn register(app: &Router, name: &str, email: &str) -> i64 {
    let response = send(
        app,
        Method::POST,
        "/users",
        None,
        Some(user_body(name, email)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Collect one copy of a sticker number for a user.
async fn collect(app: &Router, user_id: i64, number: i64) -> Value {
    let response = send(
        app,
        Method::POST,
        &format!("/users/{user_id}/stickers"),
        None,
        Some(json!({ "number": number })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_endpoint() {
    let app = create_test_app().await;

    let response = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn register_returns_user_without_password() {
    let app = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(user_body("A", "a@x.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "A");
    assert_eq!(json["email"], "a@x.com");
    assert!(json.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = create_test_app().await;
    register(&app, "A", "a@x.com").await;

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(user_body("B", "a@x.com")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_rejects_missing_password() {
    let app = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "name": "A", "email": "a@x.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "name": "A", "email": "a@x.com", "password": "123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Password too short"));
}

#[tokio::test]
async fn get_unknown_user_is_not_found() {
    let app = create_test_app().await;

    let response = send(&app, Method::GET, "/users/99", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_users_excludes_the_requester() {
    let app = create_test_app().await;
    let a = register(&app, "A", "a@x.com").await;
    register(&app, "B", "b@x.com").await;

    let response = send(&app, Method::GET, "/users", Some(a), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let listed = json.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["email"], "b@x.com");
}

#[tokio::test]
async fn list_users_requires_identity() {
    let app = create_test_app().await;

    let response = send(&app, Method::GET, "/users", None, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_is_self_service_only() {
    let app = create_test_app().await;
    let a = register(&app, "A", "a@x.com").await;
    let b = register(&app, "B", "b@x.com").await;

    // Someone else cannot edit A's profile.
    let response = send(
        &app,
        Method::PUT,
        &format!("/users/{a}"),
        Some(b),
        Some(json!({ "name": "Mallory" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A can edit their own.
    let response = send(
        &app,
        Method::PUT,
        &format!("/users/{a}"),
        Some(a),
        Some(json!({ "name": "A2" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "A2");
}

#[tokio::test]
async fn delete_forbids_self_deletion() {
    let app = create_test_app().await;
    let a = register(&app, "A", "a@x.com").await;
    let b = register(&app, "B", "b@x.com").await;

    let response = send(&app, Method::DELETE, &format!("/users/{a}"), Some(a), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, Method::DELETE, &format!("/users/{a}"), Some(b), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, Method::GET, &format!("/users/{a}"), None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn catalog_entry_lifecycle() {
    let app = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/stickers",
        None,
        Some(json!({ "number": 10, "name": "Player 10", "team": "Brazil" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, Method::GET, "/stickers/10", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["team"], "Brazil");

    // Same number again is rejected.
    let response = send(
        &app,
        Method::POST,
        "/stickers",
        None,
        Some(json!({ "number": 10, "name": "Other", "team": "Other" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_lookup_of_unknown_number_is_not_found() {
    let app = create_test_app().await;

    let response = send(&app, Method::GET, "/stickers/42", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_entry_missing_team_is_rejected() {
    let app = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/stickers",
        None,
        Some(json!({ "number": 10, "name": "Player 10" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Collecting
// ============================================================================

#[tokio::test]
async fn collecting_creates_catalog_entry_and_row() {
    let app = create_test_app().await;
    let user = register(&app, "A", "a@x.com").await;

    let owned = collect(&app, user, 7).await;
    assert_eq!(owned["amount"], 1);
    assert_eq!(owned["user_id"], user);
    assert_eq!(owned["sticker"]["number"], 7);

    // The catalog row was auto-created, number only.
    let response = send(&app, Method::GET, "/stickers/7", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let sticker = body_json(response).await;
    assert_eq!(sticker["number"], 7);
    assert_eq!(sticker["name"], Value::Null);
}

#[tokio::test]
async fn collecting_twice_increments_one_row() {
    let app = create_test_app().await;
    let user = register(&app, "A", "a@x.com").await;

    collect(&app, user, 7).await;
    let owned = collect(&app, user, 7).await;
    assert_eq!(owned["amount"], 2);

    let response = send(
        &app,
        Method::GET,
        &format!("/users/{user}/stickers"),
        None,
        None,
    )
    .await;
    let album = body_json(response).await;
    assert_eq!(album.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn collecting_for_unknown_user_is_not_found() {
    let app = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/users/99/stickers",
        None,
        Some(json!({ "number": 7 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn returning_last_copy_removes_the_row() {
    let app = create_test_app().await;
    let user = register(&app, "A", "a@x.com").await;
    collect(&app, user, 7).await;

    let response = send(
        &app,
        Method::DELETE,
        &format!("/users/{user}/stickers/7"),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::GET,
        &format!("/users/{user}/stickers/7"),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn returning_one_of_two_copies_decrements() {
    let app = create_test_app().await;
    let user = register(&app, "A", "a@x.com").await;
    collect(&app, user, 7).await;
    collect(&app, user, 7).await;

    let response = send(
        &app,
        Method::DELETE,
        &format!("/users/{user}/stickers/7"),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::GET,
        &format!("/users/{user}/stickers/7"),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["amount"], 1);
}

#[tokio::test]
async fn returning_an_unowned_sticker_is_not_found() {
    let app = create_test_app().await;
    let user = register(&app, "A", "a@x.com").await;

    let response = send(
        &app,
        Method::DELETE,
        &format!("/users/{user}/stickers/7"),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn album_is_sorted_by_catalog_number() {
    let app = create_test_app().await;
    let user = register(&app, "A", "a@x.com").await;
    collect(&app, user, 3).await;
    collect(&app, user, 1).await;
    collect(&app, user, 2).await;

    let response = send(
        &app,
        Method::GET,
        &format!("/users/{user}/stickers"),
        None,
        None,
    )
    .await;
    let album = body_json(response).await;
    let numbers: Vec<i64> = album
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["sticker"]["number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn duplicates_exclude_single_copies() {
    let app = create_test_app().await;
    let user = register(&app, "A", "a@x.com").await;
    collect(&app, user, 1).await;
    collect(&app, user, 2).await;
    collect(&app, user, 2).await;

    let response = send(
        &app,
        Method::GET,
        &format!("/users/{user}/duplicates"),
        None,
        None,
    )
    .await;
    let duplicates = body_json(response).await;
    let listed = duplicates.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["sticker"]["number"], 2);
    assert_eq!(listed[0]["amount"], 2);
}

// ============================================================================
// Notifications & exchanges
// ============================================================================

#[tokio::test]
async fn notification_lifecycle() {
    let app = create_test_app().await;
    let a = register(&app, "A", "a@x.com").await;
    let b = register(&app, "B", "b@x.com").await;

    let response = send(
        &app,
        Method::POST,
        "/notifications",
        None,
        Some(json!({ "from": a, "to": b })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let notification = body_json(response).await;
    assert_eq!(notification["from"], a);
    assert_eq!(notification["to"], b);

    // Only the recipient sees it in their inbox.
    let response = send(
        &app,
        Method::GET,
        &format!("/users/{b}/notifications"),
        None,
        None,
    )
    .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        Method::GET,
        &format!("/users/{a}/notifications"),
        None,
        None,
    )
    .await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn notification_to_self_is_rejected() {
    let app = create_test_app().await;
    let a = register(&app, "A", "a@x.com").await;

    let response = send(
        &app,
        Method::POST,
        "/notifications",
        None,
        Some(json!({ "from": a, "to": a })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exchange_requires_an_existing_notification() {
    let app = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/notifications/9/exchanges",
        None,
        Some(json!({ "sticker_number": 7, "user_id": 1 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exchange_thread_lists_offers_in_order() {
    let app = create_test_app().await;
    let a = register(&app, "A", "a@x.com").await;
    let b = register(&app, "B", "b@x.com").await;

    let response = send(
        &app,
        Method::POST,
        "/notifications",
        None,
        Some(json!({ "from": a, "to": b })),
    )
    .await;
    let notification_id = body_json(response).await["id"].as_i64().unwrap();

    for number in [7, 9] {
        let response = send(
            &app,
            Method::POST,
            &format!("/notifications/{notification_id}/exchanges"),
            None,
            Some(json!({ "sticker_number": number, "user_id": a })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(
        &app,
        Method::GET,
        &format!("/notifications/{notification_id}/exchanges"),
        None,
        None,
    )
    .await;
    let thread = body_json(response).await;
    let numbers: Vec<i64> = thread
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["sticker_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![7, 9]);
}

#[tokio::test]
async fn exchange_missing_sticker_number_is_rejected() {
    let app = create_test_app().await;
    let a = register(&app, "A", "a@x.com").await;
    let b = register(&app, "B", "b@x.com").await;

    let response = send(
        &app,
        Method::POST,
        "/notifications",
        None,
        Some(json!({ "from": a, "to": b })),
    )
    .await;
    let notification_id = body_json(response).await["id"].as_i64().unwrap();

    let response = send(
        &app,
        Method::POST,
        &format!("/notifications/{notification_id}/exchanges"),
        None,
        Some(json!({ "user_id": a })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
