use async_trait::async_trait;
use axum_helpers::Page;
use chrono::NaiveDateTime;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::ExprTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entity::{event, mark, request};
use crate::error::{EventError, EventResult};
use crate::filter::EventFilter;
use crate::marks::Mark;
use crate::models::{Event, EventSort};
use crate::moderation::{ModerationOutcome, moderate, order_batch};
use crate::repository::EventRepository;
use crate::requests::{ParticipationRequest, RequestStatus, admit, withdraw};
use crate::update::{Actor, AppliedUpdate, UpdatePatch, apply_update};

/// PostgreSQL implementation of EventRepository.
///
/// Counter updates take a row lock on the event (`SELECT ... FOR UPDATE`)
/// inside a transaction.
#[derive(Clone)]
pub struct PgEventRepository {
    db: DatabaseConnection,
}

impl PgEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn internal(err: DbErr) -> EventError {
    EventError::Internal(format!("Database error: {}", err))
}

fn duplicate_as_illegal(err: DbErr, message: &str) -> EventError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EventError::IllegalOperation(message.to_string())
        }
        _ => internal(err),
    }
}

async fn lock_event<C: ConnectionTrait>(conn: &C, id: Uuid) -> EventResult<Event> {
    event::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(internal)?
        .map(Into::into)
        .ok_or(EventError::EventNotFound(id))
}

async fn store_confirmed<C: ConnectionTrait>(conn: &C, event: &Event) -> EventResult<()> {
    event::Entity::update_many()
        .col_expr(
            event::Column::ConfirmedRequests,
            Expr::value(event.confirmed_requests),
        )
        .filter(event::Column::Id.eq(event.id))
        .exec(conn)
        .await
        .map_err(internal)?;
    Ok(())
}

async fn set_status<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
    status: RequestStatus,
) -> EventResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    request::Entity::update_many()
        .set(request::ActiveModel {
            status: Set(status),
            ..Default::default()
        })
        .filter(request::Column::Id.is_in(ids))
        .exec(conn)
        .await
        .map_err(internal)?;
    Ok(())
}

#[derive(Debug, FromQueryResult)]
struct RatingRow {
    event_id: Uuid,
    rating: f64,
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, input: Event) -> EventResult<Event> {
        let active_model: event::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await.map_err(internal)?;

        tracing::info!(event_id = %model.id, "Created event");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>> {
        let model = event::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(internal)?;
        Ok(model.map(Into::into))
    }

    async fn get_by_ids(&self, ids: Vec<Uuid>) -> EventResult<Vec<Event>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = event::Entity::find()
            .filter(event::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(internal)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn search(
        &self,
        filter: EventFilter,
        sort: Option<EventSort>,
        page: Page,
    ) -> EventResult<Vec<Event>> {
        let query = event::Entity::find().filter(filter.to_condition());
        let query = match sort {
            Some(EventSort::EventDate) => query.order_by_asc(event::Column::EventDate),
            Some(EventSort::Views) => query.order_by_desc(event::Column::Views),
            None => query,
        };

        let models = query
            .order_by_asc(event::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(internal)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_by_initiator(&self, initiator_id: Uuid, page: Page) -> EventResult<Vec<Event>> {
        let models = event::Entity::find()
            .filter(event::Column::InitiatorId.eq(initiator_id))
            .order_by_asc(event::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(internal)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: UpdatePatch,
        actor: Actor,
        now: NaiveDateTime,
    ) -> EventResult<AppliedUpdate> {
        let txn = self.db.begin().await.map_err(internal)?;
        let mut event = lock_event(&txn, id).await?;

        let previous = event.state;
        apply_update(&mut event, patch, actor, now)?;

        let mut active_model: event::ActiveModel = event.into();
        active_model.confirmed_requests = NotSet;
        active_model.views = NotSet;
        active_model.created_on = NotSet;
        active_model.initiator_id = NotSet;

        let model = active_model.update(&txn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => EventError::EventNotFound(id),
            other => internal(other),
        })?;
        txn.commit().await.map_err(internal)?;

        tracing::info!(event_id = %id, state = %model.state, "Updated event");
        Ok(AppliedUpdate {
            previous,
            event: model.into(),
        })
    }

    async fn increment_views(&self, id: Uuid) -> EventResult<Event> {
        let result = event::Entity::update_many()
            .col_expr(event::Column::Views, Expr::col(event::Column::Views).add(1))
            .filter(event::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(internal)?;

        if result.rows_affected == 0 {
            return Err(EventError::EventNotFound(id));
        }
        self.get_by_id(id)
            .await?
            .ok_or(EventError::EventNotFound(id))
    }

    async fn exists_with_category(&self, category_id: Uuid) -> EventResult<bool> {
        let count = event::Entity::find()
            .filter(event::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(internal)?;
        Ok(count > 0)
    }

    async fn list_requests_by_event(&self, event_id: Uuid) -> EventResult<Vec<ParticipationRequest>> {
        let models = request::Entity::find()
            .filter(request::Column::EventId.eq(event_id))
            .order_by_asc(request::Column::Id)
            .all(&self.db)
            .await
            .map_err(internal)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_requests_by_requester(
        &self,
        requester_id: Uuid,
    ) -> EventResult<Vec<ParticipationRequest>> {
        let models = request::Entity::find()
            .filter(request::Column::RequesterId.eq(requester_id))
            .order_by_asc(request::Column::Id)
            .all(&self.db)
            .await
            .map_err(internal)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn add_request(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        now: NaiveDateTime,
    ) -> EventResult<ParticipationRequest> {
        let txn = self.db.begin().await.map_err(internal)?;
        let mut event = lock_event(&txn, event_id).await?;

        let already_requested = request::Entity::find()
            .filter(request::Column::EventId.eq(event_id))
            .filter(request::Column::RequesterId.eq(requester_id))
            .count(&txn)
            .await
            .map_err(internal)?
            > 0;

        let confirmed_before = event.confirmed_requests;
        let participation = admit(&mut event, requester_id, already_requested, now)?;

        let active_model: request::ActiveModel = participation.clone().into();
        active_model
            .insert(&txn)
            .await
            .map_err(|e| duplicate_as_illegal(e, "Participation has already been requested"))?;
        if event.confirmed_requests != confirmed_before {
            store_confirmed(&txn, &event).await?;
        }
        txn.commit().await.map_err(internal)?;

        tracing::info!(request_id = %participation.id, event_id = %event_id, status = %participation.status, "Created participation request");
        Ok(participation)
    }

    async fn cancel_request(
        &self,
        request_id: Uuid,
        requester_id: Uuid,
    ) -> EventResult<ParticipationRequest> {
        let txn = self.db.begin().await.map_err(internal)?;

        // event_id never changes; status is only trusted once the event is locked
        let event_id = request::Entity::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(internal)?
            .map(|model| model.event_id)
            .ok_or(EventError::RequestNotFound(request_id))?;
        let mut event = lock_event(&txn, event_id).await?;

        let mut participation: ParticipationRequest = request::Entity::find_by_id(request_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(internal)?
            .map(Into::into)
            .ok_or(EventError::RequestNotFound(request_id))?;

        let confirmed_before = event.confirmed_requests;
        withdraw(&mut event, &mut participation, requester_id)?;

        set_status(&txn, vec![participation.id], participation.status).await?;
        if event.confirmed_requests != confirmed_before {
            store_confirmed(&txn, &event).await?;
        }
        txn.commit().await.map_err(internal)?;

        tracing::info!(request_id = %request_id, "Canceled participation request");
        Ok(participation)
    }

    async fn moderate_requests(
        &self,
        event_id: Uuid,
        request_ids: Vec<Uuid>,
        status: RequestStatus,
    ) -> EventResult<ModerationOutcome> {
        let txn = self.db.begin().await.map_err(internal)?;
        let mut event = lock_event(&txn, event_id).await?;

        let found: Vec<ParticipationRequest> = if request_ids.is_empty() {
            Vec::new()
        } else {
            request::Entity::find()
                .filter(request::Column::Id.is_in(request_ids.clone()))
                .all(&txn)
                .await
                .map_err(internal)?
                .into_iter()
                .map(Into::into)
                .collect()
        };
        let mut batch = order_batch(&request_ids, found, event_id)?;
        let outcome = moderate(&mut event, &mut batch, status)?;

        set_status(
            &txn,
            outcome.confirmed.iter().map(|r| r.id).collect(),
            RequestStatus::Confirmed,
        )
        .await?;
        set_status(
            &txn,
            outcome.rejected.iter().map(|r| r.id).collect(),
            RequestStatus::Rejected,
        )
        .await?;
        if !outcome.confirmed.is_empty() {
            store_confirmed(&txn, &event).await?;
        }
        txn.commit().await.map_err(internal)?;

        tracing::info!(
            event_id = %event_id,
            confirmed = outcome.confirmed.len(),
            rejected = outcome.rejected.len(),
            "Moderated participation requests"
        );
        Ok(outcome)
    }

    async fn has_confirmed_request(&self, event_id: Uuid, user_id: Uuid) -> EventResult<bool> {
        let count = request::Entity::find()
            .filter(request::Column::EventId.eq(event_id))
            .filter(request::Column::RequesterId.eq(user_id))
            .filter(request::Column::Status.eq(RequestStatus::Confirmed))
            .count(&self.db)
            .await
            .map_err(internal)?;
        Ok(count > 0)
    }

    async fn add_mark(&self, input: Mark) -> EventResult<Mark> {
        let active_model: mark::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await.map_err(|e| {
            duplicate_as_illegal(e, "The event has already been rated by this user")
        })?;

        tracing::info!(mark_id = %model.id, event_id = %model.event_id, "Created mark");
        Ok(model.into())
    }

    async fn get_mark(&self, id: Uuid) -> EventResult<Option<Mark>> {
        let model = mark::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(internal)?;
        Ok(model.map(Into::into))
    }

    async fn find_mark(&self, event_id: Uuid, user_id: Uuid) -> EventResult<Option<Mark>> {
        let model = mark::Entity::find()
            .filter(mark::Column::EventId.eq(event_id))
            .filter(mark::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(internal)?;
        Ok(model.map(Into::into))
    }

    async fn delete_mark(&self, id: Uuid) -> EventResult<bool> {
        let result = mark::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(internal)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_marks(&self, event_id: Uuid, page: Page) -> EventResult<Vec<Mark>> {
        let models = mark::Entity::find()
            .filter(mark::Column::EventId.eq(event_id))
            .order_by_asc(mark::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(internal)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn ratings(&self, event_ids: Vec<Uuid>) -> EventResult<HashMap<Uuid, f64>> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = mark::Entity::find()
            .select_only()
            .column(mark::Column::EventId)
            .column_as(Expr::cust("AVG(score)::float8"), "rating")
            .filter(mark::Column::EventId.is_in(event_ids))
            .group_by(mark::Column::EventId)
            .into_model::<RatingRow>()
            .all(&self.db)
            .await
            .map_err(internal)?;

        Ok(rows.into_iter().map(|r| (r.event_id, r.rating)).collect())
    }
}
