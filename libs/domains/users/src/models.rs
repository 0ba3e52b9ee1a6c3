use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Unique email address
    pub email: String,
    pub name: String,
}

impl User {
    pub fn new(input: NewUserRequest) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: input.email,
            name: input.name,
        }
    }
}

/// Body of `POST /admin/users`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewUserRequest {
    #[validate(email, length(min = 6, max = 254))]
    pub email: String,
    #[validate(length(min = 2, max = 250))]
    pub name: String,
}

/// Public face of a user embedded in event representations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserShortDto {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for UserShortDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Query of `GET /admin/users`; repeat `ids` to select several users
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// Only these users; all users when empty
    #[serde(default)]
    pub ids: Vec<Uuid>,
    pub from: Option<u64>,
    pub size: Option<u64>,
}
