//! Handler tests for the Users domain against the in-memory repository.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> Router {
    handlers::router(UserService::new(InMemoryUserRepository::new()))
}

async fn create(app: &Router, email: &str, name: &str) -> User {
    let request = Request::builder()
        .method("POST")
        .uri("/admin/users")
        .header("content-type", "application/json")
        .body(Body::from(json!({"email": email, "name": name}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_and_list_users() {
    let app = app();
    let ann = create(&app, "ann@example.com", "Ann").await;
    create(&app, "bob@example.com", "Bob").await;

    let request = Request::builder()
        .uri("/admin/users")
        .body(Body::empty())
        .unwrap();
    let users: Vec<User> = json_body(app.clone().oneshot(request).await.unwrap().into_body()).await;
    assert_eq!(users.len(), 2);

    let request = Request::builder()
        .uri(format!("/admin/users?ids={}&from=0&size=10", ann.id))
        .body(Body::empty())
        .unwrap();
    let users: Vec<User> = json_body(app.oneshot(request).await.unwrap().into_body()).await;
    assert_eq!(users, vec![ann]);
}

#[tokio::test]
async fn test_duplicate_email_is_409() {
    let app = app();
    create(&app, "ann@example.com", "Ann").await;

    let request = Request::builder()
        .method("POST")
        .uri("/admin/users")
        .header("content-type", "application/json")
        .body(Body::from(json!({"email": "ann@example.com", "name": "Ann 2"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_email_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/admin/users")
        .header("content-type", "application/json")
        .body(Body::from(json!({"email": "ann", "name": "Ann"}).to_string()))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delete_user_twice() {
    let app = app();
    let ann = create(&app, "ann@example.com", "Ann").await;

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/admin/users/{}", ann.id))
            .body(Body::empty())
            .unwrap()
    };

    let first = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    let second = app.oneshot(delete()).await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_ids_query_is_400() {
    let request = Request::builder()
        .uri("/admin/users?ids=banana")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
