use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "compilations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub pinned: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_compilation(self, event_ids: Vec<Uuid>) -> crate::models::Compilation {
        crate::models::Compilation {
            id: self.id,
            title: self.title,
            pinned: self.pinned,
            event_ids,
        }
    }
}

impl From<&crate::models::Compilation> for ActiveModel {
    fn from(compilation: &crate::models::Compilation) -> Self {
        Self {
            id: Set(compilation.id),
            title: Set(compilation.title.clone()),
            pinned: Set(compilation.pinned),
        }
    }
}
