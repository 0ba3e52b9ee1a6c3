use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A category events are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    /// Unique display name
    pub name: String,
}

impl Category {
    pub fn new(input: NewCategory) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
        }
    }
}

/// Body of `POST /admin/categories`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Body of `PATCH /admin/categories/{cat_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CategoryDto {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}
