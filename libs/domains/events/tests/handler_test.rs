//! Handler tests for the Events domain.
//!
//! The full event flow runs against in-memory repositories: create, publish,
//! request, moderate, view and rate.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_categories::{
    CategoryRepository, CategoryService, InMemoryCategoryRepository, NewCategory,
};
use domain_events::*;
use domain_stats::{NewEndpointHit, StatsClient, StatsQuery, StatsResult, ViewStats};
use domain_users::{InMemoryUserRepository, NewUserRequest, UserRepository};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct NoopStats;

#[async_trait]
impl StatsClient for NoopStats {
    async fn send_hit(&self, _hit: NewEndpointHit) -> StatsResult<()> {
        Ok(())
    }

    async fn get_stats(&self, _query: StatsQuery) -> StatsResult<Vec<ViewStats>> {
        Ok(Vec::new())
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

struct TestApp {
    router: Router,
    categories: InMemoryCategoryRepository,
    users: InMemoryUserRepository,
}

impl TestApp {
    fn new() -> Self {
        let categories = InMemoryCategoryRepository::new();
        let users = InMemoryUserRepository::new();
        let service = EventService::new(
            InMemoryEventRepository::new(),
            Arc::new(categories.clone()),
            Arc::new(users.clone()),
            Arc::new(NoopStats),
        );
        let category_service =
            CategoryService::new(categories.clone()).with_usage(service.category_usage());

        let router = handlers::router(service)
            .merge(domain_categories::handlers::router(category_service));

        Self {
            router,
            categories,
            users,
        }
    }

    async fn user(&self, name: &str) -> Uuid {
        self.users
            .create(NewUserRequest {
                email: format!("{}@example.com", name.to_lowercase()),
                name: name.into(),
            })
            .await
            .unwrap()
            .id
    }

    async fn category(&self) -> Uuid {
        self.categories
            .create(NewCategory {
                name: "Concerts".into(),
            })
            .await
            .unwrap()
            .id
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_event(&self, user_id: Uuid, category_id: Uuid, limit: i32) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                &format!("/users/{}/events", user_id),
                Some(new_event(category_id, limit)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().parse().unwrap()
    }

    async fn publish(&self, event_id: Uuid) {
        let (status, body) = self
            .send(
                "PATCH",
                &format!("/admin/events/{}", event_id),
                Some(json!({"stateAction": "PUBLISH_EVENT"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }
}

fn new_event(category_id: Uuid, limit: i32) -> Value {
    json!({
        "annotation": "An evening of jazz in the park with friends",
        "category": category_id,
        "description": "Bring a blanket, some snacks and enjoy the music",
        "eventDate": "2099-06-15 18:30:00",
        "location": {"lat": 55.75, "lon": 37.61},
        "participantLimit": limit,
        "title": "Jazz night"
    })
}

#[tokio::test]
async fn test_create_event_returns_pending_full_dto() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;

    let (status, body) = app
        .send("POST", &format!("/users/{}/events", user), Some(new_event(category, 0)))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"], "PENDING");
    assert_eq!(body["initiator"]["name"], "Alice");
    assert_eq!(body["category"]["name"], "Concerts");
    assert_eq!(body["eventDate"], "2099-06-15 18:30:00");
    assert_eq!(body["requestModeration"], true);
    assert_eq!(body["paid"], false);
    assert!(body["publishedOn"].is_null());
}

#[tokio::test]
async fn test_create_event_rejects_bad_dates() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;

    for date in ["2000-01-01 00:00:00", "15.06.2099 18:30"] {
        let mut body = new_event(category, 0);
        body["eventDate"] = json!(date);
        let (status, _) = app
            .send("POST", &format!("/users/{}/events", user), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "date {}", date);
    }
}

#[tokio::test]
async fn test_create_event_for_unknown_user_is_404() {
    let app = TestApp::new();
    let category = app.category().await;

    let (status, body) = app
        .send("POST", &format!("/users/{}/events", Uuid::now_v7()), Some(new_event(category, 0)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_short_annotation_is_400() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let mut body = new_event(category, 0);
    body["annotation"] = json!("too short");

    let (status, body) = app
        .send("POST", &format!("/users/{}/events", user), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_publish_twice_is_409() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let event_id = app.create_event(user, category, 0).await;
    app.publish(event_id).await;

    let (status, _) = app
        .send(
            "PATCH",
            &format!("/admin/events/{}", event_id),
            Some(json!({"stateAction": "PUBLISH_EVENT"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_owner_cannot_edit_published_event() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let event_id = app.create_event(user, category, 0).await;
    app.publish(event_id).await;

    let (status, _) = app
        .send(
            "PATCH",
            &format!("/users/{}/events/{}", user, event_id),
            Some(json!({"title": "New title"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_owner_cancels_and_resubmits() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let event_id = app.create_event(user, category, 0).await;
    let uri = format!("/users/{}/events/{}", user, event_id);

    let (status, body) = app
        .send("PATCH", &uri, Some(json!({"stateAction": "CANCEL_REVIEW", "title": "Jazz evening"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "CANCELED");
    assert_eq!(body["title"], "Jazz evening");

    let (_, body) = app
        .send("PATCH", &uri, Some(json!({"stateAction": "SEND_TO_REVIEW"})))
        .await;
    assert_eq!(body["state"], "PENDING");
}

#[tokio::test]
async fn test_participation_and_moderation_flow() {
    let app = TestApp::new();
    let owner = app.user("Owner").await;
    let first = app.user("First").await;
    let second = app.user("Second").await;
    let third = app.user("Third").await;
    let category = app.category().await;
    let event_id = app.create_event(owner, category, 1).await;

    // not yet published
    let (status, _) = app
        .send("POST", &format!("/users/{}/requests?eventId={}", first, event_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.publish(event_id).await;

    let mut request_ids = Vec::new();
    for user in [first, second] {
        let (status, body) = app
            .send("POST", &format!("/users/{}/requests?eventId={}", user, event_id), None)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "PENDING");
        request_ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, _) = app
        .send("POST", &format!("/users/{}/requests?eventId={}", owner, event_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "initiator cannot join");

    let (status, body) = app
        .send(
            "PATCH",
            &format!("/users/{}/events/{}/requests", owner, event_id),
            Some(json!({"requestIds": request_ids, "status": "CONFIRMED"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confirmedRequests"].as_array().unwrap().len(), 1);
    assert_eq!(body["confirmedRequests"][0]["id"], request_ids[0]);
    assert_eq!(body["rejectedRequests"][0]["id"], request_ids[1]);
    assert_eq!(body["rejectedRequests"][0]["status"], "REJECTED");

    let (status, _) = app
        .send("POST", &format!("/users/{}/requests?eventId={}", third, event_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "limit reached");

    let (_, event) = app.send("GET", &format!("/events/{}", event_id), None).await;
    assert_eq!(event["confirmedRequests"], 1);
}

#[tokio::test]
async fn test_moderating_non_pending_request_is_400() {
    let app = TestApp::new();
    let owner = app.user("Owner").await;
    let guest = app.user("Guest").await;
    let category = app.category().await;
    let event_id = app.create_event(owner, category, 5).await;
    app.publish(event_id).await;

    let (_, request) = app
        .send("POST", &format!("/users/{}/requests?eventId={}", guest, event_id), None)
        .await;
    let request_id = request["id"].as_str().unwrap().to_string();
    let uri = format!("/users/{}/events/{}/requests", owner, event_id);

    let (status, _) = app
        .send("PATCH", &uri, Some(json!({"requestIds": [request_id], "status": "REJECTED"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("PATCH", &uri, Some(json!({"requestIds": [request_id], "status": "CONFIRMED"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_request() {
    let app = TestApp::new();
    let owner = app.user("Owner").await;
    let guest = app.user("Guest").await;
    let category = app.category().await;
    let event_id = app.create_event(owner, category, 0).await;
    app.publish(event_id).await;

    let (_, request) = app
        .send("POST", &format!("/users/{}/requests?eventId={}", guest, event_id), None)
        .await;
    assert_eq!(request["status"], "CONFIRMED", "unlimited events confirm at once");
    let request_id = request["id"].as_str().unwrap();

    let (status, _) = app
        .send("PATCH", &format!("/users/{}/requests/{}/cancel", owner, request_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "only the requester may cancel");

    let (status, body) = app
        .send("PATCH", &format!("/users/{}/requests/{}/cancel", guest, request_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELED");

    let (_, requests) = app
        .send("GET", &format!("/users/{}/requests", guest), None)
        .await;
    assert_eq!(requests.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_public_event_counts_views_and_hides_unpublished() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let event_id = app.create_event(user, category, 0).await;

    let (status, _) = app.send("GET", &format!("/events/{}", event_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.publish(event_id).await;
    app.send("GET", &format!("/events/{}", event_id), None).await;
    let (status, body) = app.send("GET", &format!("/events/{}", event_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["views"], 2);
}

#[tokio::test]
async fn test_public_search() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let published = app.create_event(user, category, 0).await;
    app.create_event(user, category, 0).await;
    app.publish(published).await;

    let (status, body) = app
        .send("GET", "/events?text=JAZZ&sort=EVENT_DATE&from=0&size=10", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], published.to_string());

    let (_, body) = app.send("GET", "/events?text=opera", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_public_search_rejects_bad_parameters() {
    let app = TestApp::new();
    for uri in [
        "/events?sort=RATING",
        "/events?size=0",
        "/events?rangeStart=2031-01-01%2000:00:00&rangeEnd=2030-01-01%2000:00:00",
        "/events?rangeStart=yesterday",
    ] {
        let (status, _) = app.send("GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_admin_search_filters_by_state() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let published = app.create_event(user, category, 0).await;
    app.create_event(user, category, 0).await;
    app.publish(published).await;

    let (_, body) = app
        .send("GET", &format!("/admin/events?states=PUBLISHED&users={}", user), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app
        .send("GET", "/admin/events?states=PENDING&states=PUBLISHED", None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app.send("GET", "/admin/events?states=DRAFT", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_events_are_private_to_initiator() {
    let app = TestApp::new();
    let alice = app.user("Alice").await;
    let bob = app.user("Bob").await;
    let category = app.category().await;
    let event_id = app.create_event(alice, category, 0).await;

    let (_, list) = app.send("GET", &format!("/users/{}/events", alice), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send("GET", &format!("/users/{}/events/{}", bob, event_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_marks_feed_event_rating() {
    let app = TestApp::new();
    let owner = app.user("Owner").await;
    let guest = app.user("Guest").await;
    let stranger = app.user("Stranger").await;
    let category = app.category().await;
    let event_id = app.create_event(owner, category, 0).await;
    app.publish(event_id).await;
    app.send("POST", &format!("/users/{}/requests?eventId={}", guest, event_id), None)
        .await;

    let marks_uri = |user: Uuid| format!("/users/{}/events/{}/marks", user, event_id);

    let (status, _) = app
        .send("POST", &marks_uri(stranger), Some(json!({"mark": 3})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "no confirmed participation");

    let (status, _) = app
        .send("POST", &marks_uri(guest), Some(json!({"mark": 11})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, mark) = app
        .send("POST", &marks_uri(guest), Some(json!({"mark": 8, "message": "Great"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mark["mark"], 8);

    let (status, _) = app
        .send("POST", &marks_uri(guest), Some(json!({"mark": 9})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "one mark per user");

    let (_, event) = app.send("GET", &format!("/events/{}", event_id), None).await;
    assert_eq!(event["rating"], 8.0);

    let (_, marks) = app.send("GET", &format!("/events/{}/marks", event_id), None).await;
    assert_eq!(marks.as_array().unwrap().len(), 1);

    let mark_id = mark["id"].as_str().unwrap();
    let (status, _) = app
        .send("DELETE", &format!("/users/{}/marks/{}", stranger, mark_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("DELETE", &format!("/users/{}/marks/{}", guest, mark_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, event) = app.send("GET", &format!("/events/{}", event_id), None).await;
    assert!(event["rating"].is_null());
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    app.create_event(user, category, 0).await;

    let (status, _) = app
        .send("DELETE", &format!("/admin/categories/{}", category), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_path_ids_are_400() {
    let app = TestApp::new();
    let (status, _) = app
        .send("GET", &format!("/users/{}/events/not-a-uuid", Uuid::now_v7()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send("GET", "/events/42", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_without_event_id_is_400() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let (status, _) = app
        .send("POST", &format!("/users/{}/requests", user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_dto_round_trips_through_json() {
    let app = TestApp::new();
    let user = app.user("Alice").await;
    let category = app.category().await;
    let event_id = app.create_event(user, category, 0).await;

    let (_, body) = app
        .send("GET", &format!("/users/{}/events/{}", user, event_id), None)
        .await;
    let dto: EventFullDto = serde_json::from_value(body).unwrap();
    assert_eq!(dto.id, event_id);
    assert_eq!(dto.state, EventState::Pending);
    let _: Vec<EventShortDto> = json_body(
        app.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/users/{}/events", user))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .into_body(),
    )
    .await;
}
