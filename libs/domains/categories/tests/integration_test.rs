//! PostgreSQL-backed repository tests. Run with `--ignored`; they need Docker.

use domain_categories::*;
use test_utils::{TestDataBuilder, TestDatabase};

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_create_and_rename() {
    let db = TestDatabase::new().await;
    let repo = PgCategoryRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_category_rename");

    let created = repo
        .create(NewCategory { name: builder.name("category", "a") })
        .await
        .unwrap();
    let renamed = repo
        .update(created.id, CategoryDto { name: builder.name("category", "b") })
        .await
        .unwrap();

    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.name, builder.name("category", "b"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_duplicate_name_maps_to_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgCategoryRepository::new(db.connection());

    repo.create(NewCategory { name: "Concerts".into() }).await.unwrap();
    let err = repo
        .create(NewCategory { name: "Concerts".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, CategoryError::DuplicateName(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_delete_referenced_category_is_in_use() {
    let db = TestDatabase::new().await;
    let repo = PgCategoryRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_category_in_use");

    let category_id = db.create_test_category(builder.category_id()).await;
    let user_id = db.create_test_user(builder.user_id()).await;
    db.create_test_event(builder.uuid(1), user_id, category_id).await;

    let err = repo.delete(category_id).await.unwrap_err();
    assert!(matches!(err, CategoryError::InUse(id) if id == category_id));
}
