//! PostgreSQL-backed repository tests. Run with `--ignored`; they need Docker.

use axum_helpers::Page;
use domain_compilations::*;
use test_utils::{TestDataBuilder, TestDatabase};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_compilation_keeps_event_order() {
    let db = TestDatabase::new().await;
    let repo = PgCompilationRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_compilation_order");

    let user_id = db.create_test_user(builder.user_id()).await;
    let category_id = db.create_test_category(builder.category_id()).await;
    let first = db.create_test_event(builder.uuid(1), user_id, category_id).await;
    let second = db.create_test_event(builder.uuid(2), user_id, category_id).await;

    let created = repo
        .create(Compilation::new(NewCompilationDto {
            events: vec![second, first],
            pinned: true,
            title: "Weekend".into(),
        }))
        .await
        .unwrap();

    let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.event_ids, vec![second, first]);

    let mut changed = fetched.clone();
    changed.apply(UpdateCompilationRequest {
        events: Some(vec![first]),
        pinned: Some(false),
        ..Default::default()
    });
    repo.save(changed).await.unwrap();

    let pinned = repo.list(Some(true), Page::default()).await.unwrap();
    assert!(pinned.iter().all(|c| c.id != created.id));
    let unpinned = repo.list(Some(false), Page::default()).await.unwrap();
    let stored = unpinned.iter().find(|c| c.id == created.id).unwrap();
    assert_eq!(stored.event_ids, vec![first]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_unknown_event_is_rejected() {
    let db = TestDatabase::new().await;
    let repo = PgCompilationRepository::new(db.connection());

    let err = repo
        .create(Compilation::new(NewCompilationDto {
            events: vec![Uuid::now_v7()],
            pinned: false,
            title: "Ghosts".into(),
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, CompilationError::EventNotFound(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_delete_removes_links() {
    let db = TestDatabase::new().await;
    let repo = PgCompilationRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_compilation_delete");

    let user_id = db.create_test_user(builder.user_id()).await;
    let category_id = db.create_test_category(builder.category_id()).await;
    let event = db.create_test_event(builder.uuid(1), user_id, category_id).await;

    let created = repo
        .create(Compilation::new(NewCompilationDto {
            events: vec![event],
            pinned: false,
            title: "Short lived".into(),
        }))
        .await
        .unwrap();

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert!(!repo.delete(created.id).await.unwrap());
}
