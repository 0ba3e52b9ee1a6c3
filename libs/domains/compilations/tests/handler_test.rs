//! Handler tests for the Compilations domain.
//!
//! Event summaries come from a fixed lookup so the router can be driven
//! without the events stack.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use domain_categories::Category;
use domain_compilations::*;
use domain_events::{EventLookup, EventResult, EventShortDto};
use domain_users::UserShortDto;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct KnownEvents(Vec<EventShortDto>);

#[async_trait]
impl EventLookup for KnownEvents {
    async fn short_events(&self, ids: Vec<Uuid>) -> EventResult<Vec<EventShortDto>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.0.iter().find(|e| e.id == *id).cloned())
            .collect())
    }
}

fn short_event(title: &str) -> EventShortDto {
    EventShortDto {
        id: Uuid::now_v7(),
        title: title.into(),
        annotation: "A long enough annotation for listing".into(),
        category: Category {
            id: Uuid::now_v7(),
            name: "Concerts".into(),
        },
        initiator: UserShortDto {
            id: Uuid::now_v7(),
            name: "Alice".into(),
        },
        event_date: NaiveDate::from_ymd_opt(2099, 6, 15)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap(),
        paid: false,
        confirmed_requests: 0,
        views: 0,
    }
}

fn app(events: Vec<EventShortDto>) -> Router {
    let service = CompilationService::new(
        InMemoryCompilationRepository::new(),
        Arc::new(KnownEvents(events)),
    );
    handlers::router(service)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_create_keeps_event_order() {
    let (first, second) = (short_event("First"), short_event("Second"));
    let app = app(vec![first.clone(), second.clone()]);

    let (status, body) = send(
        &app,
        "POST",
        "/admin/compilations",
        Some(json!({"title": "Weekend", "events": [second.id, first.id]})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pinned"], false);
    assert_eq!(body["events"][0]["title"], "Second");
    assert_eq!(body["events"][1]["title"], "First");
    assert_eq!(body["events"][0]["eventDate"], "2099-06-15 18:30:00");
}

#[tokio::test]
async fn test_create_with_unknown_event_is_404() {
    let app = app(vec![]);
    let (status, body) = send(
        &app,
        "POST",
        "/admin/compilations",
        Some(json!({"title": "Weekend", "events": [Uuid::now_v7()]})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_blank_title_is_400() {
    let app = app(vec![]);
    let (status, _) = send(&app, "POST", "/admin/compilations", Some(json!({"title": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_updates_only_given_fields() {
    let event = short_event("Jazz");
    let app = app(vec![event.clone()]);

    let (_, created) = send(
        &app,
        "POST",
        "/admin/compilations",
        Some(json!({"title": "Weekend", "events": [event.id]})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/admin/compilations/{}", id),
        Some(json!({"pinned": true})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["pinned"], true);
    assert_eq!(updated["title"], "Weekend");
    assert_eq!(updated["events"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_filters_pinned_and_pages() {
    let app = app(vec![]);
    for (title, pinned) in [("One", true), ("Two", false), ("Three", true)] {
        send(
            &app,
            "POST",
            "/admin/compilations",
            Some(json!({"title": title, "pinned": pinned})),
        )
        .await;
    }

    let (status, pinned) = send(&app, "GET", "/compilations?pinned=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pinned.as_array().unwrap().len(), 2);

    let (_, page) = send(&app, "GET", "/compilations?from=0&size=1", None).await;
    assert_eq!(page.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/compilations?size=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_then_get_is_404() {
    let app = app(vec![]);
    let (_, created) = send(
        &app,
        "POST",
        "/admin/compilations",
        Some(json!({"title": "Gone soon"})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/admin/compilations/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/compilations/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/admin/compilations/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let app = app(vec![]);
    let (status, _) = send(&app, "GET", "/compilations/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
