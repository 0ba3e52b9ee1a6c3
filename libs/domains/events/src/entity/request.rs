use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::requests::{ParticipationRequest, RequestStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "participation_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub requester_id: Uuid,
    pub status: RequestStatus,
    pub created: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ParticipationRequest {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            event_id: model.event_id,
            requester_id: model.requester_id,
            status: model.status,
            created: model.created,
        }
    }
}

impl From<ParticipationRequest> for ActiveModel {
    fn from(request: ParticipationRequest) -> Self {
        Self {
            id: Set(request.id),
            event_id: Set(request.event_id),
            requester_id: Set(request.requester_id),
            status: Set(request.status),
            created: Set(request.created),
        }
    }
}
