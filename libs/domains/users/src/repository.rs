use async_trait::async_trait;
use axum_helpers::Page;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{NewUserRequest, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user, rejecting duplicate emails
    async fn create(&self, input: NewUserRequest) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Users with the given ids, in creation order; missing ids are skipped
    async fn get_by_ids(&self, ids: Vec<Uuid>) -> UserResult<Vec<User>>;

    /// One page of users; restricted to `ids` unless it is empty
    async fn list(&self, ids: Vec<Uuid>, page: Page) -> UserResult<Vec<User>>;

    async fn delete(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: NewUserRequest) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email = input.email.to_lowercase();
        if users.values().any(|u| u.email.to_lowercase() == email) {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let user = User::new(input);
        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_ids(&self, ids: Vec<Uuid>) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut found: Vec<User> = ids.iter().filter_map(|id| users.get(id).cloned()).collect();
        found.sort_by_key(|u| u.id);
        found.dedup_by_key(|u| u.id);
        Ok(found)
    }

    async fn list(&self, ids: Vec<Uuid>, page: Page) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut selected: Vec<User> = users
            .values()
            .filter(|u| ids.is_empty() || ids.contains(&u.id))
            .cloned()
            .collect();
        selected.sort_by_key(|u| u.id);
        Ok(page.apply(selected))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();
        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str) -> NewUserRequest {
        NewUserRequest {
            email: email.to_string(),
            name: "Test User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_ignores_case() {
        let repo = InMemoryUserRepository::new();
        repo.create(request("ann@example.com")).await.unwrap();

        let err = repo.create(request("ANN@example.com")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_list_restricted_to_ids() {
        let repo = InMemoryUserRepository::new();
        let ann = repo.create(request("ann@example.com")).await.unwrap();
        repo.create(request("bob@example.com")).await.unwrap();

        let users = repo.list(vec![ann.id], Page::default()).await.unwrap();
        assert_eq!(users, vec![ann]);

        let all = repo.list(Vec::new(), Page::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let repo = InMemoryUserRepository::new();
        let ann = repo.create(request("ann@example.com")).await.unwrap();

        assert!(repo.delete(ann.id).await.unwrap());
        assert!(!repo.delete(ann.id).await.unwrap());
    }
}
