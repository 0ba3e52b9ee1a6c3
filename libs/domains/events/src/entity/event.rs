use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::{Event, EventState, Location};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: Uuid,
    pub initiator_id: Uuid,
    pub lat: f64,
    pub lon: f64,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub event_date: DateTime,
    pub created_on: DateTime,
    pub published_on: Option<DateTime>,
    pub confirmed_requests: i32,
    pub views: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            annotation: model.annotation,
            description: model.description,
            category_id: model.category_id,
            initiator_id: model.initiator_id,
            location: Location {
                lat: model.lat,
                lon: model.lon,
            },
            paid: model.paid,
            participant_limit: model.participant_limit,
            request_moderation: model.request_moderation,
            state: model.state,
            event_date: model.event_date,
            created_on: model.created_on,
            published_on: model.published_on,
            confirmed_requests: model.confirmed_requests,
            views: model.views,
        }
    }
}

impl From<Event> for ActiveModel {
    fn from(event: Event) -> Self {
        Self {
            id: Set(event.id),
            title: Set(event.title),
            annotation: Set(event.annotation),
            description: Set(event.description),
            category_id: Set(event.category_id),
            initiator_id: Set(event.initiator_id),
            lat: Set(event.location.lat),
            lon: Set(event.location.lon),
            paid: Set(event.paid),
            participant_limit: Set(event.participant_limit),
            request_moderation: Set(event.request_moderation),
            state: Set(event.state),
            event_date: Set(event.event_date),
            created_on: Set(event.created_on),
            published_on: Set(event.published_on),
            confirmed_requests: Set(event.confirmed_requests),
            views: Set(event.views),
        }
    }
}
