use sea_orm::entity::prelude::*;

/// Link row; `position` keeps the admin-given order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "compilation_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub compilation_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: Uuid,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
