use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::marks::Mark;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "marks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub score: i16,
    pub message: Option<String>,
    pub marked_on: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Mark {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            event_id: model.event_id,
            user_id: model.user_id,
            score: model.score,
            message: model.message,
            marked_on: model.marked_on,
        }
    }
}

impl From<Mark> for ActiveModel {
    fn from(mark: Mark) -> Self {
        Self {
            id: Set(mark.id),
            event_id: Set(mark.event_id),
            user_id: Set(mark.user_id),
            score: Set(mark.score),
            message: Set(mark.message),
            marked_on: Set(mark.marked_on),
        }
    }
}
