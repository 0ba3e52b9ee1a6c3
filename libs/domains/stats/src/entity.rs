use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "endpoint_hits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub app: String,
    pub uri: String,
    pub ip: String,
    pub timestamp: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::EndpointHit {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            app: model.app,
            uri: model.uri,
            ip: model.ip,
            timestamp: model.timestamp,
        }
    }
}

impl From<crate::models::EndpointHit> for ActiveModel {
    fn from(hit: crate::models::EndpointHit) -> Self {
        Self {
            id: Set(hit.id),
            app: Set(hit.app),
            uri: Set(hit.uri),
            ip: Set(hit.ip),
            timestamp: Set(hit.timestamp),
        }
    }
}
