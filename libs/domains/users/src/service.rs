use axum_helpers::Page;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{NewUserRequest, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: NewUserRequest) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    pub async fn list_users(&self, ids: Vec<Uuid>, page: Page) -> UserResult<Vec<User>> {
        self.repository.list(ids, page).await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use mockall::predicate;

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let mut mock_repo = MockUserRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_delete()
            .with(predicate::eq(id))
            .returning(|_| Ok(false));

        let service = UserService::new(mock_repo);
        let err = service.delete_user(id).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_invalid_email_never_reaches_store() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_create().never();

        let service = UserService::new(mock_repo);
        let err = service
            .create_user(NewUserRequest {
                email: "nope".into(),
                name: "Ann".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_passes_ids_through() {
        let mut mock_repo = MockUserRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_list()
            .withf(move |ids, page| ids == &vec![id] && page.size == 5)
            .returning(|_, _| Ok(Vec::new()));

        let service = UserService::new(mock_repo);
        let page = Page::new(Some(0), Some(5)).unwrap();
        assert!(service.list_users(vec![id], page).await.unwrap().is_empty());
    }
}
